//! Sign In With Password Use Case
//!
//! Authenticates an email/password account with the identity provider.

use std::sync::Arc;

use kernel::error::auth_error::AuthResult;

use crate::application::classify::{Operation, classify_failure};
use crate::domain::entity::identity_assertion::IdentityAssertion;
use crate::domain::gateway::IdentityProvider;
use crate::domain::value_object::{email::Email, user_password::RawPassword};

/// Sign in input
pub struct SignInWithPasswordInput {
    pub email: String,
    pub password: String,
}

/// Sign in with password use case
pub struct SignInWithPasswordUseCase<P>
where
    P: IdentityProvider,
{
    provider: Arc<P>,
}

impl<P> SignInWithPasswordUseCase<P>
where
    P: IdentityProvider,
{
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    pub async fn execute(&self, input: SignInWithPasswordInput) -> AuthResult<IdentityAssertion> {
        // Preconditions fail before any provider call
        let email = Email::new(input.email)?;
        let password = RawPassword::new(input.password)?;

        match self.provider.sign_in_with_password(&email, &password).await {
            Ok(identity) => {
                tracing::info!(uid = %identity.subject(), "Signed in with password");
                Ok(identity)
            }
            Err(failure) => Err(classify_failure(
                self.provider.as_ref(),
                Operation::PasswordSignIn,
                &failure,
                Some(email.as_str()),
            )
            .await),
        }
    }
}
