//! Auth State Entity
//!
//! Session state of the bridge.
//!
//! ```text
//! Anonymous ──sign-in──▶ ProviderAuthenticated ──establish──▶ ServerSessionEstablished
//!     ▲                        │                                   │
//!     └──sign-out / expiry─────┴───────────────────────────────────┘
//! ```

use serde::Serialize;

use crate::domain::entity::identity_assertion::IdentityAssertion;

/// Session state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "identity", rename_all = "camelCase")]
pub enum AuthState {
    #[default]
    Anonymous,
    ProviderAuthenticated(IdentityAssertion),
    ServerSessionEstablished(IdentityAssertion),
}

impl AuthState {
    /// Current identity, if any
    pub fn identity(&self) -> Option<&IdentityAssertion> {
        match self {
            Self::Anonymous => None,
            Self::ProviderAuthenticated(identity) | Self::ServerSessionEstablished(identity) => {
                Some(identity)
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::Anonymous)
    }

    pub fn has_server_session(&self) -> bool {
        matches!(self, Self::ServerSessionEstablished(_))
    }

    /// Short name for logs
    pub fn phase(&self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::ProviderAuthenticated(_) => "providerAuthenticated",
            Self::ServerSessionEstablished(_) => "serverSessionEstablished",
        }
    }

    /// State after a server session was established for `identity`
    ///
    /// `None` when `identity` is no longer current (signed out or replaced
    /// while the request was in flight) or nothing changes.
    pub fn server_session_established(&self, identity: &IdentityAssertion) -> Option<AuthState> {
        match self {
            Self::ProviderAuthenticated(current) if current.same_subject(identity) => {
                Some(Self::ServerSessionEstablished(current.clone()))
            }
            _ => None,
        }
    }

    /// State after the provider reported its current identity
    ///
    /// `None` when nothing changes. An identity that matches the current
    /// subject keeps an established server session.
    pub fn provider_changed(&self, identity: Option<&IdentityAssertion>) -> Option<AuthState> {
        match (self, identity) {
            (Self::Anonymous, None) => None,
            (_, None) => Some(Self::Anonymous),
            (Self::ProviderAuthenticated(current) | Self::ServerSessionEstablished(current), Some(next))
                if current.same_subject(next) =>
            {
                None
            }
            (_, Some(next)) => Some(Self::ProviderAuthenticated(next.clone())),
        }
    }
}
