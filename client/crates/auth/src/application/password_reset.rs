//! Password Reset Use Case
//!
//! Asks the identity provider to email a password reset link.

use std::sync::Arc;

use kernel::error::auth_error::AuthResult;

use crate::application::classify::{Operation, classify_failure};
use crate::domain::gateway::IdentityProvider;
use crate::domain::value_object::email::Email;

/// Password reset use case
pub struct PasswordResetUseCase<P>
where
    P: IdentityProvider,
{
    provider: Arc<P>,
}

impl<P> PasswordResetUseCase<P>
where
    P: IdentityProvider,
{
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    pub async fn execute(&self, email: &str) -> AuthResult<()> {
        let email = Email::new(email)?;

        match self.provider.send_password_reset(&email).await {
            Ok(()) => {
                tracing::info!(domain = email.domain(), "Password reset email requested");
                Ok(())
            }
            Err(failure) => Err(classify_failure(
                self.provider.as_ref(),
                Operation::PasswordReset,
                &failure,
                None,
            )
            .await),
        }
    }
}
