//! Infrastructure Layer
//!
//! REST adapters for the identity provider and the backend session
//! endpoint, plus in-memory stand-ins.

pub mod dto;
pub mod http_session;
pub mod identity_toolkit;
pub mod memory;

pub use http_session::HttpSessionGateway;
pub use identity_toolkit::{IdentityToolkitProvider, IdpCredential, PopupFlow, PresetCredential};
pub use memory::{InMemoryIdentityProvider, InMemorySessionGateway, ProviderCall};
