//! In-Memory Implementations
//!
//! Deterministic stand-ins for the identity provider and the session
//! endpoint: registered accounts, scripted failures and call counters.
//! Password rejections follow the provider's enumeration protection, so
//! a wrong password and an unknown email look the same.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

use kernel::id::SubjectId;
use tokio::sync::{Mutex, watch};
use uuid::Uuid;

use crate::domain::entity::{
    identity_assertion::IdentityAssertion,
    server_session::{SessionRequest, SessionResponse},
    session_token::SessionToken,
};
use crate::domain::gateway::{IdentityProvider, SessionGateway};
use crate::domain::value_object::{
    email::Email, federated_provider::FederatedProvider, sign_in_method::SignInMethod,
    user_password::RawPassword,
};
use crate::error::{ProviderCode, ProviderFailure, ProviderResult};

/// Provider capability, for scripting failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderCall {
    Popup,
    PasswordSignIn,
    CreateUser,
    UpdateProfile,
    PasswordReset,
    FetchMethods,
    IdToken,
    SignOut,
}

#[derive(Debug, Clone)]
struct Account {
    uid: SubjectId,
    password: Option<String>,
    methods: Vec<SignInMethod>,
    display_name: Option<String>,
}

impl Account {
    fn new(method: SignInMethod) -> Self {
        Self {
            uid: new_uid(),
            password: None,
            methods: vec![method],
            display_name: None,
        }
    }

    fn identity(&self, email: &str, method: SignInMethod) -> IdentityAssertion {
        let identity = IdentityAssertion::new(self.uid.clone(), method).with_email(email);
        match &self.display_name {
            Some(name) => identity.with_display_name(name.clone()),
            None => identity,
        }
    }
}

#[derive(Default)]
struct ProviderState {
    /// Keyed by lowercase email
    accounts: HashMap<String, Account>,
    /// Email each popup signs in as
    popup: HashMap<FederatedProvider, String>,
    current: Option<(String, IdentityAssertion)>,
    failures: HashMap<ProviderCall, VecDeque<ProviderFailure>>,
    fail_lookups: bool,
    minted: u64,
}

/// In-memory identity provider
pub struct InMemoryIdentityProvider {
    state: Mutex<ProviderState>,
    calls: AtomicUsize,
    changes: watch::Sender<Option<IdentityAssertion>>,
}

impl Default for InMemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        let (changes, _) = watch::channel(None);
        Self {
            state: Mutex::new(ProviderState::default()),
            calls: AtomicUsize::new(0),
            changes,
        }
    }

    // ========================================================================
    // Builders
    // ========================================================================

    pub fn with_password_account(mut self, email: &str, password: &str) -> Self {
        let account = self
            .state
            .get_mut()
            .accounts
            .entry(email.to_lowercase())
            .or_insert_with(|| Account::new(SignInMethod::Password));
        account.password = Some(password.to_string());
        if !account.methods.contains(&SignInMethod::Password) {
            account.methods.push(SignInMethod::Password);
        }
        self
    }

    /// Register an account that signs in through `provider` only
    pub fn with_federated_account(mut self, email: &str, provider: FederatedProvider) -> Self {
        let method = SignInMethod::from(provider);
        let account = self
            .state
            .get_mut()
            .accounts
            .entry(email.to_lowercase())
            .or_insert_with(|| Account::new(method.clone()));
        if !account.methods.contains(&method) {
            account.methods.push(method);
        }
        self
    }

    /// Make the `provider` popup sign in as `email`
    pub fn with_popup_account(mut self, provider: FederatedProvider, email: &str) -> Self {
        self.state
            .get_mut()
            .popup
            .insert(provider, email.to_lowercase());
        self
    }

    /// Make every sign-in-methods lookup fail
    pub fn with_failing_lookups(mut self) -> Self {
        self.state.get_mut().fail_lookups = true;
        self
    }

    // ========================================================================
    // Scripting and inspection
    // ========================================================================

    /// Fail the next call of `call` with `failure`
    pub async fn fail_next(&self, call: ProviderCall, failure: ProviderFailure) {
        self.state
            .lock()
            .await
            .failures
            .entry(call)
            .or_default()
            .push_back(failure);
    }

    /// End the provider session as if the token expired
    pub async fn expire_session(&self) {
        self.state.lock().await.current = None;
        self.changes.send_replace(None);
    }

    /// Number of provider calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Count the call and pop a scripted failure, if any
    fn begin(&self, state: &mut ProviderState, call: ProviderCall) -> ProviderResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match state.failures.get_mut(&call).and_then(VecDeque::pop_front) {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }

    fn sign_in_as(
        &self,
        state: &mut ProviderState,
        email: &str,
        method: SignInMethod,
    ) -> ProviderResult<IdentityAssertion> {
        let account = state
            .accounts
            .get(email)
            .ok_or_else(|| ProviderFailure::from_code(ProviderCode::UserNotFound))?;
        let identity = account.identity(email, method);

        state.current = Some((email.to_string(), identity.clone()));
        self.changes.send_replace(Some(identity.clone()));
        Ok(identity)
    }
}

impl IdentityProvider for InMemoryIdentityProvider {
    async fn sign_in_with_popup(
        &self,
        provider: FederatedProvider,
    ) -> ProviderResult<IdentityAssertion> {
        let mut state = self.state.lock().await;
        self.begin(&mut state, ProviderCall::Popup)?;

        let email = state
            .popup
            .get(&provider)
            .cloned()
            .ok_or_else(|| ProviderFailure::from_code(ProviderCode::PopupClosedByUser))?;
        let method = SignInMethod::from(provider);

        let linked = state
            .accounts
            .get(&email)
            .map(|account| account.methods.contains(&method));
        match linked {
            Some(true) => {}
            Some(false) => {
                return Err(ProviderFailure::new(
                    ProviderCode::AccountExistsWithDifferentCredential,
                    "account exists with different credential",
                )
                .with_email(email));
            }
            None => {
                state.accounts.insert(email.clone(), Account::new(method.clone()));
            }
        }

        self.sign_in_as(&mut state, &email, method)
    }

    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &RawPassword,
    ) -> ProviderResult<IdentityAssertion> {
        let mut state = self.state.lock().await;
        self.begin(&mut state, ProviderCall::PasswordSignIn)?;

        let matches = state
            .accounts
            .get(email.as_str())
            .and_then(|account| account.password.as_deref())
            .is_some_and(|stored| stored == password.expose());
        if !matches {
            return Err(
                ProviderFailure::from_code(ProviderCode::InvalidLoginCredentials)
                    .with_email(email.as_str()),
            );
        }

        self.sign_in_as(&mut state, email.as_str(), SignInMethod::Password)
    }

    async fn create_user_with_password(
        &self,
        email: &Email,
        password: &RawPassword,
    ) -> ProviderResult<IdentityAssertion> {
        let mut state = self.state.lock().await;
        self.begin(&mut state, ProviderCall::CreateUser)?;

        if state.accounts.contains_key(email.as_str()) {
            return Err(ProviderFailure::from_code(ProviderCode::EmailAlreadyInUse)
                .with_email(email.as_str()));
        }

        let mut account = Account::new(SignInMethod::Password);
        account.password = Some(password.expose().to_string());
        state.accounts.insert(email.as_str().to_string(), account);

        self.sign_in_as(&mut state, email.as_str(), SignInMethod::Password)
    }

    async fn update_display_name(&self, display_name: &str) -> ProviderResult<()> {
        let mut state = self.state.lock().await;
        self.begin(&mut state, ProviderCall::UpdateProfile)?;

        let Some((email, identity)) = state.current.take() else {
            return Err(no_current_user());
        };
        if let Some(account) = state.accounts.get_mut(&email) {
            account.display_name = Some(display_name.to_string());
        }

        let identity = identity.with_display_name(display_name);
        state.current = Some((email, identity.clone()));
        self.changes.send_replace(Some(identity));
        Ok(())
    }

    async fn send_password_reset(&self, email: &Email) -> ProviderResult<()> {
        let mut state = self.state.lock().await;
        self.begin(&mut state, ProviderCall::PasswordReset)?;

        if !state.accounts.contains_key(email.as_str()) {
            return Err(ProviderFailure::from_code(ProviderCode::UserNotFound));
        }
        Ok(())
    }

    async fn fetch_sign_in_methods(&self, email: &str) -> ProviderResult<Vec<SignInMethod>> {
        let mut state = self.state.lock().await;
        self.begin(&mut state, ProviderCall::FetchMethods)?;

        if state.fail_lookups {
            return Err(ProviderFailure::new(
                ProviderCode::NetworkRequestFailed,
                "lookup unavailable",
            ));
        }

        Ok(state
            .accounts
            .get(&email.to_lowercase())
            .map(|account| account.methods.clone())
            .unwrap_or_default())
    }

    async fn id_token(&self, subject: &SubjectId) -> ProviderResult<SessionToken> {
        let mut state = self.state.lock().await;
        self.begin(&mut state, ProviderCall::IdToken)?;

        let uid = match &state.current {
            Some((_, identity)) if identity.subject() == subject => subject.to_string(),
            Some(_) => {
                return Err(ProviderFailure::new(
                    ProviderCode::UserMismatch,
                    format!("{subject} is not the signed-in user"),
                ));
            }
            None => return Err(no_current_user()),
        };
        state.minted += 1;
        Ok(SessionToken::new(format!("mem-token-{uid}-{}", state.minted)))
    }

    async fn sign_out(&self) -> ProviderResult<()> {
        let mut state = self.state.lock().await;
        self.begin(&mut state, ProviderCall::SignOut)?;

        state.current = None;
        self.changes.send_replace(None);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<IdentityAssertion>> {
        self.changes.subscribe()
    }
}

fn new_uid() -> SubjectId {
    let raw = Uuid::new_v4().simple().to_string();
    SubjectId::parse(raw).unwrap_or_else(|_| unreachable!("uuid is never empty"))
}

fn no_current_user() -> ProviderFailure {
    ProviderFailure::new(
        ProviderCode::Other("no-current-user".to_string()),
        "no user is signed in",
    )
}

// ============================================================================
// Session gateway
// ============================================================================

#[derive(Default)]
struct GatewayState {
    sessions: HashSet<String>,
    scripted: VecDeque<SessionResponse>,
    last_request: Option<SessionRequest>,
    last_token_fp: Option<String>,
}

/// In-memory session endpoint
///
/// Establishing a session twice for one uid keeps a single session.
#[derive(Default)]
pub struct InMemorySessionGateway {
    state: Mutex<GatewayState>,
    exchanges: AtomicUsize,
}

impl InMemorySessionGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the next exchange with `response`
    pub async fn respond_next(&self, response: SessionResponse) {
        self.state.lock().await.scripted.push_back(response);
    }

    pub async fn active_sessions(&self) -> usize {
        self.state.lock().await.sessions.len()
    }

    pub async fn last_request(&self) -> Option<SessionRequest> {
        self.state.lock().await.last_request.clone()
    }

    pub async fn last_token_fingerprint(&self) -> Option<String> {
        self.state.lock().await.last_token_fp.clone()
    }

    pub fn exchange_count(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }
}

impl SessionGateway for InMemorySessionGateway {
    async fn exchange(&self, token: SessionToken, request: &SessionRequest) -> SessionResponse {
        self.exchanges.fetch_add(1, Ordering::SeqCst);

        let mut state = self.state.lock().await;
        state.last_request = Some(request.clone());
        state.last_token_fp = Some(token.fingerprint());
        drop(token);

        if let Some(response) = state.scripted.pop_front() {
            return response;
        }

        state.sessions.insert(request.uid.clone());
        SessionResponse::Established {
            status: 200,
            cookie_set: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(raw: &str) -> Email {
        Email::new(raw).unwrap()
    }

    fn password(raw: &str) -> RawPassword {
        RawPassword::new(raw).unwrap()
    }

    #[tokio::test]
    async fn test_password_accounts() {
        let provider = InMemoryIdentityProvider::new().with_password_account("a@x.com", "secret1");

        let identity = provider
            .sign_in_with_password(&email("a@x.com"), &password("secret1"))
            .await
            .unwrap();
        assert_eq!(identity.email(), Some("a@x.com"));

        let failure = provider
            .sign_in_with_password(&email("a@x.com"), &password("wrong-1"))
            .await
            .unwrap_err();
        assert_eq!(failure.code, ProviderCode::InvalidLoginCredentials);

        let failure = provider
            .sign_in_with_password(&email("ghost@x.com"), &password("secret1"))
            .await
            .unwrap_err();
        assert_eq!(failure.code, ProviderCode::InvalidLoginCredentials);
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_scripted_failure_is_used_once() {
        let provider = InMemoryIdentityProvider::new().with_password_account("a@x.com", "secret1");
        provider
            .fail_next(
                ProviderCall::PasswordSignIn,
                ProviderFailure::from_code(ProviderCode::TooManyRequests),
            )
            .await;

        let first = provider
            .sign_in_with_password(&email("a@x.com"), &password("secret1"))
            .await;
        assert_eq!(first.unwrap_err().code, ProviderCode::TooManyRequests);

        let second = provider
            .sign_in_with_password(&email("a@x.com"), &password("secret1"))
            .await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn test_popup_accounts() {
        let provider = InMemoryIdentityProvider::new()
            .with_password_account("taken@x.com", "secret1")
            .with_popup_account(FederatedProvider::Google, "g@x.com")
            .with_popup_account(FederatedProvider::Facebook, "taken@x.com");

        let identity = provider.sign_in_with_popup(FederatedProvider::Google).await.unwrap();
        assert_eq!(identity.provider(), &SignInMethod::from(FederatedProvider::Google));
        assert_eq!(
            provider.fetch_sign_in_methods("g@x.com").await.unwrap(),
            vec![SignInMethod::from(FederatedProvider::Google)]
        );

        let failure = provider.sign_in_with_popup(FederatedProvider::Facebook).await.unwrap_err();
        assert_eq!(failure.code, ProviderCode::AccountExistsWithDifferentCredential);
        assert_eq!(failure.email.as_deref(), Some("taken@x.com"));
    }

    #[tokio::test]
    async fn test_id_tokens_are_fresh() {
        let provider = InMemoryIdentityProvider::new().with_password_account("a@x.com", "secret1");
        assert!(provider.id_token(&new_uid()).await.is_err());

        let identity = provider
            .sign_in_with_password(&email("a@x.com"), &password("secret1"))
            .await
            .unwrap();
        let first = provider.id_token(identity.subject()).await.unwrap().into_bearer();
        let second = provider.id_token(identity.subject()).await.unwrap().into_bearer();
        assert_ne!(first.as_str(), second.as_str());
        assert!(first.starts_with(&format!("mem-token-{}", identity.subject())));
    }

    #[tokio::test]
    async fn test_id_token_only_for_signed_in_user() {
        let provider = InMemoryIdentityProvider::new()
            .with_password_account("a@x.com", "secret1")
            .with_password_account("b@x.com", "secret1");

        let a = provider
            .sign_in_with_password(&email("a@x.com"), &password("secret1"))
            .await
            .unwrap();
        provider
            .sign_in_with_password(&email("b@x.com"), &password("secret1"))
            .await
            .unwrap();

        let failure = provider.id_token(a.subject()).await.unwrap_err();
        assert_eq!(failure.code, ProviderCode::UserMismatch);
    }

    #[tokio::test]
    async fn test_gateway_is_idempotent_per_uid() {
        let gateway = InMemorySessionGateway::new();
        let request = SessionRequest {
            uid: "u1".to_string(),
            email: None,
            display_name: None,
            photo_url: None,
        };

        for _ in 0..2 {
            let response = gateway.exchange(SessionToken::new("t"), &request).await;
            assert!(matches!(response, SessionResponse::Established { .. }));
        }
        assert_eq!(gateway.active_sessions().await, 1);
        assert_eq!(gateway.exchange_count(), 2);
        assert_eq!(gateway.last_request().await, Some(request));
    }
}
