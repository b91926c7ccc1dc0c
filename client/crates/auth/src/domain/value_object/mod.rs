//! Value Object Module

pub mod email;
pub mod federated_provider;
pub mod sign_in_method;
pub mod user_password;
