//! Domain Layer
//!
//! Contains entities, value objects, and the provider/gateway traits.

pub mod entity;
pub mod gateway;
pub mod value_object;

// Re-exports
pub use entity::{
    auth_state::AuthState, identity_assertion::IdentityAssertion,
    server_session::ServerSession, session_token::SessionToken,
};
pub use gateway::{IdentityProvider, SessionGateway};
