//! Sign Out Use Case

use std::sync::Arc;

use kernel::error::auth_error::{AuthError, AuthResult};

use crate::domain::gateway::IdentityProvider;
use crate::error::log_failure;

/// Sign out use case
pub struct SignOutUseCase<P>
where
    P: IdentityProvider,
{
    provider: Arc<P>,
}

impl<P> SignOutUseCase<P>
where
    P: IdentityProvider,
{
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    /// Any provider failure is reported as `signOutFailed`
    pub async fn execute(&self) -> AuthResult<()> {
        self.provider.sign_out().await.map_err(|failure| {
            let err = AuthError::sign_out_failed().with_provider_code(failure.code.as_str());
            log_failure("sign_out", &err);
            err
        })?;

        tracing::info!("Signed out");
        Ok(())
    }
}
