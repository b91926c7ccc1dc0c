//! Sign In With Provider Use Case
//!
//! Interactive federated sign-in (Google, Facebook).

use std::sync::Arc;

use kernel::error::auth_error::AuthResult;

use crate::application::classify::{Operation, classify_failure};
use crate::domain::entity::identity_assertion::IdentityAssertion;
use crate::domain::gateway::IdentityProvider;
use crate::domain::value_object::federated_provider::FederatedProvider;

/// Federated sign-in use case
pub struct SignInWithProviderUseCase<P>
where
    P: IdentityProvider,
{
    provider: Arc<P>,
}

impl<P> SignInWithProviderUseCase<P>
where
    P: IdentityProvider,
{
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    pub async fn execute(&self, provider: FederatedProvider) -> AuthResult<IdentityAssertion> {
        match self.provider.sign_in_with_popup(provider).await {
            Ok(identity) => {
                tracing::info!(uid = %identity.subject(), %provider, "Signed in with provider");
                Ok(identity)
            }
            // The conflicting email, when reported, drives the methods lookup
            Err(failure) => Err(classify_failure(
                self.provider.as_ref(),
                Operation::FederatedSignIn(provider),
                &failure,
                failure.email.as_deref(),
            )
            .await),
        }
    }
}
