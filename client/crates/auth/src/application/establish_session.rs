//! Establish Server Session Use Case
//!
//! Exchanges a freshly minted session token for a backend cookie session.
//! Safe to retry: each call mints a new token.

use std::sync::Arc;

use kernel::error::auth_error::{AuthError, AuthResult};

use crate::domain::entity::{
    identity_assertion::IdentityAssertion,
    server_session::{ServerSession, SessionRequest, SessionResponse},
};
use crate::domain::gateway::{IdentityProvider, SessionGateway};
use crate::error::log_failure;

/// Establish session use case
pub struct EstablishSessionUseCase<P, G>
where
    P: IdentityProvider,
    G: SessionGateway,
{
    provider: Arc<P>,
    gateway: Arc<G>,
}

impl<P, G> EstablishSessionUseCase<P, G>
where
    P: IdentityProvider,
    G: SessionGateway,
{
    pub fn new(provider: Arc<P>, gateway: Arc<G>) -> Self {
        Self { provider, gateway }
    }

    pub async fn execute(&self, identity: &IdentityAssertion) -> AuthResult<ServerSession> {
        let result = self.exchange(identity).await;
        if let Err(err) = &result {
            log_failure("establish_server_session", err);
        }
        result
    }

    async fn exchange(&self, identity: &IdentityAssertion) -> AuthResult<ServerSession> {
        // The token must belong to the identity whose profile is sent
        let token = self.provider.id_token(identity.subject()).await.map_err(|failure| {
            AuthError::session_establish_failed(None, failure.to_string())
                .with_provider_code(failure.code.as_str())
        })?;

        let token_fp = token.fingerprint();
        tracing::debug!(
            uid = %identity.subject(),
            token_fp = %token_fp,
            expires_at = ?token.expires_at(),
            "Minted session token"
        );
        let request = SessionRequest::from_identity(identity);

        match self.gateway.exchange(token, &request).await {
            SessionResponse::Established { status, cookie_set } => {
                tracing::info!(
                    uid = %identity.subject(),
                    status,
                    cookie_set,
                    token_fp = %token_fp,
                    "Server session established"
                );
                Ok(ServerSession { status, cookie_set })
            }
            SessionResponse::Rejected { status, body } => {
                tracing::debug!(token_fp = %token_fp, status, "Session endpoint rejected token");
                Err(AuthError::session_establish_failed(Some(status), body))
            }
            SessionResponse::Unreachable { reason } => {
                tracing::debug!(token_fp = %token_fp, reason = %reason, "Session endpoint unreachable");
                Err(AuthError::session_establish_failed(None, reason))
            }
        }
    }
}
