//! Entity Module

pub mod auth_state;
pub mod identity_assertion;
pub mod server_session;
pub mod session_token;
