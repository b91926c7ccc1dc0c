//! Gateway Traits
//!
//! Interfaces to the identity provider and the backend session endpoint.
//! Implementations are in the infrastructure layer.

use kernel::id::SubjectId;
use tokio::sync::watch;

use crate::domain::entity::{
    identity_assertion::IdentityAssertion,
    server_session::{SessionRequest, SessionResponse},
    session_token::SessionToken,
};
use crate::domain::value_object::{
    email::Email, federated_provider::FederatedProvider, sign_in_method::SignInMethod,
    user_password::RawPassword,
};
use crate::error::ProviderResult;

/// Identity provider trait
#[trait_variant::make(IdentityProvider: Send)]
pub trait LocalIdentityProvider {
    /// Interactive federated sign-in
    async fn sign_in_with_popup(&self, provider: FederatedProvider)
    -> ProviderResult<IdentityAssertion>;

    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &RawPassword,
    ) -> ProviderResult<IdentityAssertion>;

    /// Create an account and sign it in
    async fn create_user_with_password(
        &self,
        email: &Email,
        password: &RawPassword,
    ) -> ProviderResult<IdentityAssertion>;

    /// Update the display name of the signed-in user
    async fn update_display_name(&self, display_name: &str) -> ProviderResult<()>;

    async fn send_password_reset(&self, email: &Email) -> ProviderResult<()>;

    /// Sign-in methods registered for an email (empty when unknown)
    async fn fetch_sign_in_methods(&self, email: &str) -> ProviderResult<Vec<SignInMethod>>;

    /// Mint a fresh token for the signed-in user
    ///
    /// Fails with `UserMismatch` when `subject` is not the signed-in user.
    async fn id_token(&self, subject: &SubjectId) -> ProviderResult<SessionToken>;

    async fn sign_out(&self) -> ProviderResult<()>;

    /// Provider-side state changes (`None` when signed out or expired)
    fn subscribe(&self) -> watch::Receiver<Option<IdentityAssertion>>;
}

/// Backend session endpoint trait
#[trait_variant::make(SessionGateway: Send)]
pub trait LocalSessionGateway {
    /// Exchange a token for a cookie session
    ///
    /// The token is consumed by this single request.
    async fn exchange(&self, token: SessionToken, request: &SessionRequest) -> SessionResponse;
}
