//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of the auth bridge vocabulary:
//! - The closed error taxonomy and the classified error value
//! - Typed identifiers handed to collaborators (profile store, backend)
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning for every caller of the bridge.

pub mod error {
    pub mod auth_error;
    pub mod kind;
}
pub mod id;
