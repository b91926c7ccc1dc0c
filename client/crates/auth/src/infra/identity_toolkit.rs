//! Identity Toolkit REST Provider
//!
//! [`IdentityProvider`] backed by the Firebase Auth REST API. The provider
//! session (id token, refresh token, expiry) lives here; the current
//! identity is published through a `watch` channel.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use kernel::id::SubjectId;
use platform::client::ClientError;
use serde::{Serialize, de::DeserializeOwned, de::IgnoredAny};
use tokio::sync::{Mutex, watch};
use zeroize::Zeroizing;

use crate::application::config::BridgeConfig;
use crate::domain::entity::{identity_assertion::IdentityAssertion, session_token::SessionToken};
use crate::domain::gateway::IdentityProvider;
use crate::domain::value_object::{
    email::Email, federated_provider::FederatedProvider, sign_in_method::SignInMethod,
    user_password::RawPassword,
};
use crate::error::{ProviderCode, ProviderFailure, ProviderResult};
use crate::infra::dto::{
    AccountResponse, CreateAuthUriRequest, CreateAuthUriResponse, ErrorEnvelope, OobCodeRequest,
    PasswordRequest, RefreshResponse, SignInWithIdpRequest, UpdateProfileRequest,
};

/// Used when the provider omits `expiresIn`
const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

// ============================================================================
// Popup flow
// ============================================================================

/// Credential returned by a federated OAuth flow
#[derive(Clone)]
pub enum IdpCredential {
    IdToken(String),
    AccessToken(String),
}

impl IdpCredential {
    fn post_body(&self, provider: FederatedProvider) -> String {
        let (name, value) = match self {
            Self::IdToken(token) => ("id_token", token),
            Self::AccessToken(token) => ("access_token", token),
        };
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair(name, value)
            .append_pair("providerId", provider.provider_id())
            .finish()
    }
}

impl fmt::Debug for IdpCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IdToken(_) => f.write_str("IdToken([REDACTED])"),
            Self::AccessToken(_) => f.write_str("AccessToken([REDACTED])"),
        }
    }
}

/// Interactive federated sign-in (popup window, system browser, ...)
#[trait_variant::make(PopupFlow: Send)]
pub trait LocalPopupFlow {
    /// Run the interactive flow
    ///
    /// Fails with a popup code (`auth/popup-closed-by-user`,
    /// `auth/popup-blocked`, ...) when the user does not complete it.
    async fn authorize(&self, provider: FederatedProvider) -> ProviderResult<IdpCredential>;
}

/// Popup flow answering from credentials obtained ahead of time
///
/// Providers without a credential behave like a closed popup.
#[derive(Debug, Clone, Default)]
pub struct PresetCredential {
    credentials: HashMap<FederatedProvider, IdpCredential>,
}

impl PresetCredential {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, provider: FederatedProvider, credential: IdpCredential) -> Self {
        self.credentials.insert(provider, credential);
        self
    }
}

impl PopupFlow for PresetCredential {
    async fn authorize(&self, provider: FederatedProvider) -> ProviderResult<IdpCredential> {
        self.credentials
            .get(&provider)
            .cloned()
            .ok_or_else(|| ProviderFailure::from_code(ProviderCode::PopupClosedByUser))
    }
}

// ============================================================================
// Provider
// ============================================================================

struct TokenSet {
    identity: IdentityAssertion,
    id_token: Zeroizing<String>,
    refresh_token: Zeroizing<String>,
    expires_at: DateTime<Utc>,
}

/// Firebase Auth REST provider
pub struct IdentityToolkitProvider<F> {
    http: reqwest::Client,
    api_key: String,
    toolkit_url: String,
    secure_token_url: String,
    continue_uri: String,
    refresh_margin: Duration,
    popup: F,
    tokens: Mutex<Option<TokenSet>>,
    changes: watch::Sender<Option<IdentityAssertion>>,
}

impl<F> IdentityToolkitProvider<F> {
    pub fn new(config: &BridgeConfig, popup: F) -> Result<Self, ClientError> {
        let http = config.http.build()?;
        let (changes, _) = watch::channel(None);

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            toolkit_url: config.identity_toolkit_url.trim_end_matches('/').to_string(),
            secure_token_url: config.secure_token_url.clone(),
            continue_uri: config.continue_uri.clone(),
            refresh_margin: Duration::from_std(config.token_refresh_margin)
                .unwrap_or_else(|_| Duration::seconds(60)),
            popup,
            tokens: Mutex::new(None),
            changes,
        })
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/accounts:{}", self.toolkit_url, method)
    }

    /// POST a JSON body to an `accounts:*` method
    async fn call<B, R>(&self, method: &'static str, body: &B) -> ProviderResult<R>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        tracing::debug!(method, "Identity Toolkit request");

        let response = self
            .http
            .post(self.endpoint(method))
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(transport_failure)?;

        let response = ensure_success(response).await?;
        response.json::<R>().await.map_err(decode_failure)
    }

    /// Store the session from an account response and publish the identity
    async fn establish(
        &self,
        account: AccountResponse,
        method: SignInMethod,
    ) -> ProviderResult<IdentityAssertion> {
        let (Some(id_token), Some(refresh_token)) = (account.id_token, account.refresh_token)
        else {
            return Err(ProviderFailure::new(
                ProviderCode::InternalError,
                "response carried no tokens",
            ));
        };

        let subject = SubjectId::parse(account.local_id)
            .map_err(|e| ProviderFailure::new(ProviderCode::InternalError, e.to_string()))?;

        let mut identity = IdentityAssertion::new(subject, method);
        if let Some(email) = account.email {
            identity = identity.with_email(email);
        }
        if let Some(display_name) = account.display_name {
            identity = identity.with_display_name(display_name);
        }
        if let Some(photo_url) = account.photo_url {
            identity = identity.with_photo_url(photo_url);
        }

        let session = TokenSet {
            identity: identity.clone(),
            id_token: Zeroizing::new(id_token),
            refresh_token: Zeroizing::new(refresh_token),
            expires_at: expiry(account.expires_in.as_deref()),
        };

        *self.tokens.lock().await = Some(session);
        self.changes.send_replace(Some(identity.clone()));

        Ok(identity)
    }

    /// Exchange the refresh token for a new id token
    async fn refresh(&self, session: &mut TokenSet) -> ProviderResult<()> {
        tracing::debug!(uid = %session.identity.subject(), "Refreshing id token");

        let response = self
            .http
            .post(self.secure_token_url.as_str())
            .query(&[("key", self.api_key.as_str())])
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", session.refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(transport_failure)?;

        let response = ensure_success(response).await?;
        let refreshed = response
            .json::<RefreshResponse>()
            .await
            .map_err(decode_failure)?;

        session.id_token = Zeroizing::new(refreshed.id_token);
        session.refresh_token = Zeroizing::new(refreshed.refresh_token);
        session.expires_at = expiry(Some(refreshed.expires_in.as_str()));
        Ok(())
    }

    /// Current id token, refreshed near expiry
    ///
    /// With `subject`, refuses to mint for anyone but that user.
    async fn mint(&self, subject: Option<&SubjectId>) -> ProviderResult<SessionToken> {
        let mut guard = self.tokens.lock().await;
        let Some(session) = guard.as_mut() else {
            return Err(ProviderFailure::new(
                ProviderCode::Other("no-current-user".to_string()),
                "no user is signed in",
            ));
        };

        if let Some(subject) = subject {
            if session.identity.subject() != subject {
                return Err(ProviderFailure::new(
                    ProviderCode::UserMismatch,
                    format!("{subject} is not the signed-in user"),
                ));
            }
        }

        if session.expires_at - self.refresh_margin <= Utc::now() {
            if let Err(failure) = self.refresh(session).await {
                if failure.code.ends_session() {
                    tracing::info!(code = %failure.code, "Provider session ended");
                    *guard = None;
                    self.changes.send_replace(None);
                }
                return Err(failure);
            }
        }

        Ok(SessionToken::new(session.id_token.as_str()).with_expires_at(session.expires_at))
    }

    async fn clear_session(&self) {
        *self.tokens.lock().await = None;
        self.changes.send_replace(None);
    }
}

impl<F> IdentityProvider for IdentityToolkitProvider<F>
where
    F: PopupFlow + Sync,
{
    async fn sign_in_with_popup(
        &self,
        provider: FederatedProvider,
    ) -> ProviderResult<IdentityAssertion> {
        let credential = self.popup.authorize(provider).await?;

        let request = SignInWithIdpRequest {
            post_body: credential.post_body(provider),
            request_uri: &self.continue_uri,
            return_secure_token: true,
            return_idp_credential: true,
        };
        let account: AccountResponse = self.call("signInWithIdp", &request).await?;

        if account.need_confirmation {
            let failure = ProviderFailure::new(
                ProviderCode::AccountExistsWithDifferentCredential,
                "account exists with different credential",
            );
            return Err(match account.email {
                Some(email) => failure.with_email(email),
                None => failure,
            });
        }

        let method = account
            .provider_id
            .as_deref()
            .map(SignInMethod::from_provider_id)
            .unwrap_or_else(|| provider.into());
        self.establish(account, method).await
    }

    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &RawPassword,
    ) -> ProviderResult<IdentityAssertion> {
        let request = PasswordRequest {
            email: email.as_str(),
            password: password.expose(),
            return_secure_token: true,
        };
        let account: AccountResponse = self
            .call("signInWithPassword", &request)
            .await
            .map_err(|f| f.with_email(email.as_str()))?;

        self.establish(account, SignInMethod::Password).await
    }

    async fn create_user_with_password(
        &self,
        email: &Email,
        password: &RawPassword,
    ) -> ProviderResult<IdentityAssertion> {
        let request = PasswordRequest {
            email: email.as_str(),
            password: password.expose(),
            return_secure_token: true,
        };
        let account: AccountResponse = self
            .call("signUp", &request)
            .await
            .map_err(|f| f.with_email(email.as_str()))?;

        self.establish(account, SignInMethod::Password).await
    }

    async fn update_display_name(&self, display_name: &str) -> ProviderResult<()> {
        let id_token = self.mint(None).await?.into_bearer();

        let request = UpdateProfileRequest {
            id_token: id_token.as_str(),
            display_name,
            return_secure_token: true,
        };
        let account: AccountResponse = self.call("update", &request).await?;

        let mut guard = self.tokens.lock().await;
        if let Some(session) = guard.as_mut() {
            session.identity = session.identity.clone().with_display_name(display_name);
            if let (Some(id_token), Some(refresh_token)) = (account.id_token, account.refresh_token)
            {
                session.id_token = Zeroizing::new(id_token);
                session.refresh_token = Zeroizing::new(refresh_token);
                session.expires_at = expiry(account.expires_in.as_deref());
            }
            self.changes.send_replace(Some(session.identity.clone()));
        }
        Ok(())
    }

    async fn send_password_reset(&self, email: &Email) -> ProviderResult<()> {
        let request = OobCodeRequest {
            request_type: "PASSWORD_RESET",
            email: email.as_str(),
        };
        let _: IgnoredAny = self.call("sendOobCode", &request).await?;
        Ok(())
    }

    async fn fetch_sign_in_methods(&self, email: &str) -> ProviderResult<Vec<SignInMethod>> {
        let request = CreateAuthUriRequest {
            identifier: email,
            continue_uri: &self.continue_uri,
        };
        let response: CreateAuthUriResponse = self.call("createAuthUri", &request).await?;

        Ok(response
            .signin_methods
            .iter()
            .map(|id| SignInMethod::from_provider_id(id))
            .collect())
    }

    async fn id_token(&self, subject: &SubjectId) -> ProviderResult<SessionToken> {
        self.mint(Some(subject)).await
    }

    async fn sign_out(&self) -> ProviderResult<()> {
        // The REST API keeps no server-side session to revoke
        self.clear_session().await;
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<IdentityAssertion>> {
        self.changes.subscribe()
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Turn a non-2xx response into a provider failure
async fn ensure_success(response: reqwest::Response) -> ProviderResult<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => {
            let (code, detail) = envelope.error.split();
            Err(ProviderFailure::new(ProviderCode::parse(code), detail))
        }
        Err(_) => Err(ProviderFailure::new(
            ProviderCode::InternalError,
            format!("HTTP {status}: {body}"),
        )),
    }
}

fn transport_failure(err: reqwest::Error) -> ProviderFailure {
    ProviderFailure::new(ProviderCode::NetworkRequestFailed, err.to_string())
}

fn decode_failure(err: reqwest::Error) -> ProviderFailure {
    ProviderFailure::new(ProviderCode::InternalError, err.to_string())
}

fn expiry(expires_in: Option<&str>) -> DateTime<Utc> {
    let secs = expires_in
        .and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(DEFAULT_TOKEN_TTL_SECS);
    Utc::now() + Duration::seconds(secs)
}
