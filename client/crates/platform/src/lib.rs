//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - HTTP client construction (cookie store, timeouts, user agent)
//! - Set-Cookie parsing
//! - Token fingerprints for logs (SHA-256)
//! - Clear-text password handling with zeroization

pub mod client;
pub mod cookie;
pub mod crypto;
pub mod password;
