//! Wire DTOs
//!
//! Request/response bodies of the Identity Toolkit and Secure Token REST
//! APIs and of the backend session endpoint.

use serde::{Deserialize, Serialize};

use crate::domain::entity::server_session::SessionRequest;

// ============================================================================
// Identity Toolkit requests
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest<'a> {
    pub id_token: &'a str,
    pub display_name: &'a str,
    pub return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OobCodeRequest<'a> {
    pub request_type: &'static str,
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuthUriRequest<'a> {
    pub identifier: &'a str,
    pub continue_uri: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInWithIdpRequest<'a> {
    pub post_body: String,
    pub request_uri: &'a str,
    pub return_secure_token: bool,
    pub return_idp_credential: bool,
}

// ============================================================================
// Identity Toolkit responses
// ============================================================================

/// Signed-in user, as returned by `signInWithPassword`, `signUp`,
/// `update` and `signInWithIdp`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub local_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Seconds, as a decimal string
    #[serde(default)]
    pub expires_in: Option<String>,
    /// `signInWithIdp` only
    #[serde(default)]
    pub provider_id: Option<String>,
    /// `signInWithIdp` only: the email belongs to an account with
    /// other credentials
    #[serde(default)]
    pub need_confirmation: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuthUriResponse {
    #[serde(default)]
    pub signin_methods: Vec<String>,
}

/// Secure Token endpoint response (snake_case on the wire)
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: String,
}

impl ErrorBody {
    /// Split `"CODE : detail"` into its parts
    pub fn split(&self) -> (&str, &str) {
        match self.message.split_once(':') {
            Some((code, detail)) => (code.trim(), detail.trim()),
            None => (self.message.trim(), ""),
        }
    }
}

// ============================================================================
// Backend session endpoint
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionBody<'a> {
    pub firebase_token: &'a str,
    pub user: &'a SessionRequest,
}
