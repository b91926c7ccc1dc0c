//! Auth Bridge Module
//!
//! Client-side authentication for BingeBoard: wraps the federated identity
//! provider, classifies every provider failure, and trades a fresh identity
//! for a backend cookie session.
//!
//! Clean Architecture structure:
//! - `domain/` - Value objects, entities, provider/gateway traits
//! - `application/` - Use cases, error classification, the bridge facade
//! - `infra/` - Identity Toolkit REST provider, HTTP session gateway,
//!   in-memory stand-ins
//!
//! ## Security Model
//! - Passwords are zeroized on drop and never logged
//! - Session tokens are minted per request, never cloned, and consumed by
//!   the request that uses them; logs carry only a fingerprint
//! - The session endpoint must be https unless explicitly relaxed
//! - Raw provider errors never reach callers; only their code is kept

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;

// Re-exports for convenience
pub use application::{AuthBridge, BridgeConfig, SignInOutcome};
pub use domain::{AuthState, IdentityAssertion, ServerSession};
pub use domain::value_object::federated_provider::FederatedProvider;
pub use error::{ProviderCode, ProviderFailure, ProviderResult};
pub use infra::{
    HttpSessionGateway, IdentityToolkitProvider, InMemoryIdentityProvider,
    InMemorySessionGateway,
};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    auth_error::{AuthError, AuthResult},
    kind::ErrorKind,
};
