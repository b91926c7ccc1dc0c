//! Auth Bridge
//!
//! Facade used by UI collaborators. Runs the use cases and keeps the
//! session state in a `watch` channel.

use std::sync::Arc;

use kernel::error::auth_error::{AuthError, AuthResult};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::application::{
    establish_session::EstablishSessionUseCase,
    password_reset::PasswordResetUseCase,
    sign_in_with_password::{SignInWithPasswordInput, SignInWithPasswordUseCase},
    sign_in_with_provider::SignInWithProviderUseCase,
    sign_out::SignOutUseCase,
    sign_up::{SignUpInput, SignUpUseCase},
};
use crate::domain::entity::{
    auth_state::AuthState, identity_assertion::IdentityAssertion, server_session::ServerSession,
};
use crate::domain::gateway::{IdentityProvider, SessionGateway};
use crate::domain::value_object::federated_provider::FederatedProvider;

/// Result of a sign-in followed by the server session exchange
#[derive(Debug, Clone)]
pub struct SignInOutcome {
    pub identity: IdentityAssertion,
    pub server_session: Option<ServerSession>,
    /// Why the server session is missing; the sign-in itself stands
    pub warning: Option<AuthError>,
}

impl SignInOutcome {
    pub fn is_complete(&self) -> bool {
        self.server_session.is_some()
    }
}

/// Auth bridge
pub struct AuthBridge<P, G>
where
    P: IdentityProvider,
    G: SessionGateway,
{
    provider: Arc<P>,
    state: Arc<watch::Sender<AuthState>>,
    sign_in_with_provider: SignInWithProviderUseCase<P>,
    sign_in_with_password: SignInWithPasswordUseCase<P>,
    sign_up: SignUpUseCase<P>,
    sign_out: SignOutUseCase<P>,
    password_reset: PasswordResetUseCase<P>,
    establish_session: EstablishSessionUseCase<P, G>,
}

impl<P, G> AuthBridge<P, G>
where
    P: IdentityProvider,
    G: SessionGateway,
{
    pub fn new(provider: Arc<P>, gateway: Arc<G>) -> Self {
        let (state, _) = watch::channel(AuthState::Anonymous);

        Self {
            sign_in_with_provider: SignInWithProviderUseCase::new(Arc::clone(&provider)),
            sign_in_with_password: SignInWithPasswordUseCase::new(Arc::clone(&provider)),
            sign_up: SignUpUseCase::new(Arc::clone(&provider)),
            sign_out: SignOutUseCase::new(Arc::clone(&provider)),
            password_reset: PasswordResetUseCase::new(Arc::clone(&provider)),
            establish_session: EstablishSessionUseCase::new(Arc::clone(&provider), gateway),
            state: Arc::new(state),
            provider,
        }
    }

    // ========================================================================
    // Sign-in operations
    // ========================================================================

    /// Interactive federated sign-in
    pub async fn sign_in_with_provider(
        &self,
        provider: FederatedProvider,
    ) -> AuthResult<IdentityAssertion> {
        let identity = self.sign_in_with_provider.execute(provider).await?;
        self.replace_identity(&identity);
        Ok(identity)
    }

    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: impl Into<String>,
    ) -> AuthResult<IdentityAssertion> {
        let input = SignInWithPasswordInput {
            email: email.to_string(),
            password: password.into(),
        };
        let identity = self.sign_in_with_password.execute(input).await?;
        self.replace_identity(&identity);
        Ok(identity)
    }

    pub async fn sign_up_with_password(
        &self,
        email: &str,
        password: impl Into<String>,
        display_name: Option<&str>,
    ) -> AuthResult<IdentityAssertion> {
        let input = SignUpInput {
            email: email.to_string(),
            password: password.into(),
            display_name: display_name.map(str::to_string),
        };
        let identity = self.sign_up.execute(input).await?;
        self.replace_identity(&identity);
        Ok(identity)
    }

    pub async fn send_password_reset(&self, email: &str) -> AuthResult<()> {
        self.password_reset.execute(email).await
    }

    /// Terminate the provider session
    ///
    /// The state is left untouched when sign-out fails.
    pub async fn sign_out(&self) -> AuthResult<()> {
        self.sign_out.execute().await?;
        self.state.send_if_modified(|state| {
            let changed = state.is_authenticated();
            *state = AuthState::Anonymous;
            changed
        });
        Ok(())
    }

    // ========================================================================
    // Server session
    // ========================================================================

    /// Exchange a fresh token for a backend cookie session
    ///
    /// Failure never undoes the provider sign-in. The state only advances
    /// while `identity` is still current.
    pub async fn establish_server_session(
        &self,
        identity: &IdentityAssertion,
    ) -> AuthResult<ServerSession> {
        let session = self.establish_session.execute(identity).await?;
        self.state.send_if_modified(|state| match state.server_session_established(identity) {
            Some(next) => {
                *state = next;
                true
            }
            None => false,
        });
        Ok(session)
    }

    /// Establish the server session after a sign-in, keeping the sign-in
    /// even when the exchange fails
    pub async fn complete_sign_in(&self, identity: IdentityAssertion) -> SignInOutcome {
        match self.establish_server_session(&identity).await {
            Ok(session) => SignInOutcome {
                identity,
                server_session: Some(session),
                warning: None,
            },
            Err(err) => SignInOutcome {
                identity,
                server_session: None,
                warning: Some(err),
            },
        }
    }

    // ========================================================================
    // State
    // ========================================================================

    pub fn current_state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn current_identity(&self) -> Option<IdentityAssertion> {
        self.state.borrow().identity().cloned()
    }

    /// Watch state transitions
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Follow provider-side changes (expiry, sign-in elsewhere)
    ///
    /// The task ends when the provider drops its state channel.
    pub fn spawn_provider_listener(&self) -> JoinHandle<()> {
        let mut changes = self.provider.subscribe();
        let state = Arc::clone(&self.state);

        tokio::spawn(async move {
            loop {
                let current = changes.borrow_and_update().clone();
                apply_provider_change(&state, current.as_ref());

                if changes.changed().await.is_err() {
                    tracing::debug!("Provider state channel closed");
                    break;
                }
            }
        })
    }

    fn replace_identity(&self, identity: &IdentityAssertion) {
        self.state
            .send_replace(AuthState::ProviderAuthenticated(identity.clone()));
    }
}

fn apply_provider_change(state: &watch::Sender<AuthState>, identity: Option<&IdentityAssertion>) {
    state.send_if_modified(|current| match current.provider_changed(identity) {
        Some(next) => {
            tracing::info!(from = current.phase(), to = next.phase(), "Provider state changed");
            *current = next;
            true
        }
        None => false,
    });
}
