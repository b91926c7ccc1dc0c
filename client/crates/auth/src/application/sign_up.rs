//! Sign Up Use Case
//!
//! Creates an email/password account and applies the optional display name.

use std::sync::Arc;

use kernel::error::auth_error::AuthResult;

use crate::application::classify::{Operation, classify_failure};
use crate::domain::entity::identity_assertion::IdentityAssertion;
use crate::domain::gateway::IdentityProvider;
use crate::domain::value_object::{email::Email, user_password::RawPassword};

/// Sign up input
pub struct SignUpInput {
    pub email: String,
    pub password: String,
    /// Applied to the new account when non-empty
    pub display_name: Option<String>,
}

/// Sign up use case
pub struct SignUpUseCase<P>
where
    P: IdentityProvider,
{
    provider: Arc<P>,
}

impl<P> SignUpUseCase<P>
where
    P: IdentityProvider,
{
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<IdentityAssertion> {
        let email = Email::new(input.email)?;
        let password = RawPassword::new(input.password)?;

        let identity = match self.provider.create_user_with_password(&email, &password).await {
            Ok(identity) => identity,
            Err(failure) => {
                return Err(classify_failure(
                    self.provider.as_ref(),
                    Operation::SignUp,
                    &failure,
                    Some(email.as_str()),
                )
                .await);
            }
        };

        tracing::info!(uid = %identity.subject(), "Account created");

        let display_name = input
            .display_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        let Some(display_name) = display_name else {
            return Ok(identity);
        };

        // The account exists at this point; a profile failure does not undo it
        match self.provider.update_display_name(&display_name).await {
            Ok(()) => Ok(identity.with_display_name(display_name)),
            Err(failure) => {
                tracing::warn!(
                    uid = %identity.subject(),
                    code = %failure.code,
                    "Display name update failed"
                );
                Ok(identity)
            }
        }
    }
}
