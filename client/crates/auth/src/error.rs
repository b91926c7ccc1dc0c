//! Auth Error Types
//!
//! Provider-side failures and their normalization. Identity provider
//! adapters report a [`ProviderFailure`]; the application layer classifies
//! it into the kernel [`AuthError`] before anything reaches the caller.

use std::fmt;

use kernel::error::{auth_error::AuthError, kind::ErrorKind};
use thiserror::Error;

/// Result of a call into an identity provider adapter
pub type ProviderResult<T> = Result<T, ProviderFailure>;

/// Normalized provider failure code
///
/// The SDK-style codes (`auth/user-not-found`) and the REST API codes
/// (`EMAIL_NOT_FOUND`) name the same conditions; both parse into one
/// variant here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProviderCode {
    PopupClosedByUser,
    CancelledPopupRequest,
    UserCancelled,
    PopupBlocked,
    AccountExistsWithDifferentCredential,
    UserNotFound,
    WrongPassword,
    InvalidLoginCredentials,
    UserDisabled,
    TooManyRequests,
    OperationNotAllowed,
    InvalidEmail,
    MissingPassword,
    EmailAlreadyInUse,
    WeakPassword,
    NetworkRequestFailed,
    SessionExpired,
    /// Token requested for a user other than the signed-in one
    UserMismatch,
    InternalError,
    /// Unrecognized code, kept as the provider spelled it
    Other(String),
}

impl ProviderCode {
    /// Parse a raw provider code (SDK or REST spelling)
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let code = raw.strip_prefix("auth/").unwrap_or(raw);
        match code {
            "popup-closed-by-user" => Self::PopupClosedByUser,
            "cancelled-popup-request" => Self::CancelledPopupRequest,
            "user-cancelled" | "USER_CANCELLED" => Self::UserCancelled,
            "popup-blocked" => Self::PopupBlocked,
            "account-exists-with-different-credential" | "NEED_CONFIRMATION" => {
                Self::AccountExistsWithDifferentCredential
            }
            "user-not-found" | "EMAIL_NOT_FOUND" | "USER_NOT_FOUND" => Self::UserNotFound,
            "wrong-password" | "INVALID_PASSWORD" => Self::WrongPassword,
            "invalid-login-credentials" | "invalid-credential" | "INVALID_LOGIN_CREDENTIALS" => {
                Self::InvalidLoginCredentials
            }
            "user-disabled" | "USER_DISABLED" => Self::UserDisabled,
            "too-many-requests" | "TOO_MANY_ATTEMPTS_TRY_LATER" => Self::TooManyRequests,
            "operation-not-allowed" | "OPERATION_NOT_ALLOWED" | "PASSWORD_LOGIN_DISABLED" => {
                Self::OperationNotAllowed
            }
            "invalid-email" | "INVALID_EMAIL" | "MISSING_EMAIL" => Self::InvalidEmail,
            "missing-password" | "MISSING_PASSWORD" => Self::MissingPassword,
            "email-already-in-use" | "EMAIL_EXISTS" => Self::EmailAlreadyInUse,
            "weak-password" | "WEAK_PASSWORD" => Self::WeakPassword,
            "network-request-failed" => Self::NetworkRequestFailed,
            "user-token-expired" | "invalid-user-token" | "TOKEN_EXPIRED"
            | "INVALID_REFRESH_TOKEN" | "INVALID_ID_TOKEN" | "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" => {
                Self::SessionExpired
            }
            "user-mismatch" | "USER_MISMATCH" => Self::UserMismatch,
            "internal-error" => Self::InternalError,
            _ => Self::Other(raw.to_string()),
        }
    }

    /// Canonical SDK-style spelling
    pub fn as_str(&self) -> &str {
        match self {
            Self::PopupClosedByUser => "auth/popup-closed-by-user",
            Self::CancelledPopupRequest => "auth/cancelled-popup-request",
            Self::UserCancelled => "auth/user-cancelled",
            Self::PopupBlocked => "auth/popup-blocked",
            Self::AccountExistsWithDifferentCredential => {
                "auth/account-exists-with-different-credential"
            }
            Self::UserNotFound => "auth/user-not-found",
            Self::WrongPassword => "auth/wrong-password",
            Self::InvalidLoginCredentials => "auth/invalid-login-credentials",
            Self::UserDisabled => "auth/user-disabled",
            Self::TooManyRequests => "auth/too-many-requests",
            Self::OperationNotAllowed => "auth/operation-not-allowed",
            Self::InvalidEmail => "auth/invalid-email",
            Self::MissingPassword => "auth/missing-password",
            Self::EmailAlreadyInUse => "auth/email-already-in-use",
            Self::WeakPassword => "auth/weak-password",
            Self::NetworkRequestFailed => "auth/network-request-failed",
            Self::SessionExpired => "auth/user-token-expired",
            Self::UserMismatch => "auth/user-mismatch",
            Self::InternalError => "auth/internal-error",
            Self::Other(code) => code,
        }
    }

    /// Context-free classification table
    ///
    /// Every variant is listed; unknown codes land in [`ErrorKind::Unknown`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PopupClosedByUser | Self::CancelledPopupRequest | Self::UserCancelled => {
                ErrorKind::Cancelled
            }
            Self::PopupBlocked => ErrorKind::Blocked,
            Self::AccountExistsWithDifferentCredential | Self::EmailAlreadyInUse => {
                ErrorKind::AccountConflict
            }
            Self::UserNotFound => ErrorKind::NotFound,
            Self::WrongPassword => ErrorKind::WrongPassword,
            Self::InvalidLoginCredentials => ErrorKind::InvalidCredentials,
            Self::UserDisabled => ErrorKind::Disabled,
            Self::TooManyRequests => ErrorKind::TooManyAttempts,
            Self::OperationNotAllowed => ErrorKind::Disallowed,
            Self::InvalidEmail | Self::MissingPassword => ErrorKind::InvalidInput,
            Self::WeakPassword => ErrorKind::WeakPassword,
            Self::NetworkRequestFailed
            | Self::SessionExpired
            | Self::UserMismatch
            | Self::InternalError
            | Self::Other(_) => ErrorKind::Unknown,
        }
    }

    /// Whether the provider session is gone after this failure
    pub fn ends_session(&self) -> bool {
        matches!(
            self,
            Self::SessionExpired | Self::UserDisabled | Self::UserNotFound
        )
    }
}

impl fmt::Display for ProviderCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by an identity provider adapter
///
/// Never handed to callers of the bridge: it is classified into an
/// [`AuthError`] at the bridge boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {detail}")]
pub struct ProviderFailure {
    pub code: ProviderCode,
    pub detail: String,
    /// Email the failure concerns, when the provider reports one
    pub email: Option<String>,
}

impl ProviderFailure {
    pub fn new(code: ProviderCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
            email: None,
        }
    }

    /// Failure with no detail beyond its code
    pub fn from_code(code: ProviderCode) -> Self {
        Self::new(code, String::new())
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Log a classified error with the level its kind deserves
pub(crate) fn log_failure(operation: &'static str, err: &AuthError) {
    match err.kind() {
        ErrorKind::SessionEstablishFailed => {
            let status = err.session_failure().and_then(|s| s.status);
            tracing::warn!(operation, ?status, error = %err, "Server session not established");
        }
        ErrorKind::SignOutFailed | ErrorKind::Unknown => {
            tracing::error!(operation, code = err.provider_code(), error = %err, "Auth operation failed");
        }
        ErrorKind::TooManyAttempts | ErrorKind::Disabled => {
            tracing::warn!(operation, code = err.provider_code(), kind = %err.kind(), "Auth operation refused");
        }
        _ => {
            tracing::debug!(operation, code = err.provider_code(), kind = %err.kind(), "Auth operation rejected");
        }
    }
}
