//! Error Kind - Classification of auth failures
//!
//! Defines the closed [`ErrorKind`] taxonomy every provider failure is
//! mapped into.

use serde::Serialize;

/// Closed taxonomy of auth bridge failures
///
/// Every provider-specific failure code ends up as exactly one of these.
/// `Unknown` catches codes the classification table does not know yet.
///
/// ## Examples
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// let kind = ErrorKind::AccountConflict;
/// assert_eq!(kind.code(), "accountConflict");
/// assert!(!kind.is_retryable());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// Malformed email or too-short password, caught before any network call
    InvalidInput,
    /// User dismissed the interactive flow
    Cancelled,
    /// Browser blocked the popup
    Blocked,
    /// No account exists for the given email
    NotFound,
    /// Account exists, credential mismatch
    WrongPassword,
    /// Credential rejected and the disambiguation lookup failed
    InvalidCredentials,
    /// Email registered under a different sign-in method
    AccountConflict,
    /// Account administratively disabled
    Disabled,
    /// Rate-limited by the provider
    TooManyAttempts,
    /// Sign-in method not enabled on the provider side
    Disallowed,
    /// Password fails the provider strength policy
    WeakPassword,
    /// Backend session exchange failed after a successful identity proof
    SessionEstablishFailed,
    /// Provider sign-out call failed
    SignOutFailed,
    /// Provider code with no entry in the classification table
    Unknown,
}

impl ErrorKind {
    /// Every kind, in declaration order
    pub const ALL: [ErrorKind; 14] = [
        ErrorKind::InvalidInput,
        ErrorKind::Cancelled,
        ErrorKind::Blocked,
        ErrorKind::NotFound,
        ErrorKind::WrongPassword,
        ErrorKind::InvalidCredentials,
        ErrorKind::AccountConflict,
        ErrorKind::Disabled,
        ErrorKind::TooManyAttempts,
        ErrorKind::Disallowed,
        ErrorKind::WeakPassword,
        ErrorKind::SessionEstablishFailed,
        ErrorKind::SignOutFailed,
        ErrorKind::Unknown,
    ];

    /// Stable code shared with UI collaborators
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalidInput",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Blocked => "blocked",
            ErrorKind::NotFound => "notFound",
            ErrorKind::WrongPassword => "wrongPassword",
            ErrorKind::InvalidCredentials => "invalidCredentials",
            ErrorKind::AccountConflict => "accountConflict",
            ErrorKind::Disabled => "disabled",
            ErrorKind::TooManyAttempts => "tooManyAttempts",
            ErrorKind::Disallowed => "disallowed",
            ErrorKind::WeakPassword => "weakPassword",
            ErrorKind::SessionEstablishFailed => "sessionEstablishFailed",
            ErrorKind::SignOutFailed => "signOutFailed",
            ErrorKind::Unknown => "unknown",
        }
    }

    /// Default user-facing message when the caller has nothing more specific
    #[inline]
    pub const fn default_message(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "Please check the email and password you entered.",
            ErrorKind::Cancelled => "Sign-in was cancelled.",
            ErrorKind::Blocked => {
                "The sign-in pop-up was blocked by your browser. Please allow pop-ups and try again."
            }
            ErrorKind::NotFound => "No account found with this email address.",
            ErrorKind::WrongPassword => "Incorrect password. Please try again.",
            ErrorKind::InvalidCredentials => "Invalid email or password.",
            ErrorKind::AccountConflict => {
                "An account already exists with this email using a different sign-in method."
            }
            ErrorKind::Disabled => "This account has been disabled.",
            ErrorKind::TooManyAttempts => "Too many attempts. Please try again later.",
            ErrorKind::Disallowed => "This sign-in method is not enabled.",
            ErrorKind::WeakPassword => "Password is too weak. Please choose a stronger password.",
            ErrorKind::SessionEstablishFailed => "Could not establish a session with the server.",
            ErrorKind::SignOutFailed => "Failed to sign out. Please try again.",
            ErrorKind::Unknown => "Something went wrong. Please try again.",
        }
    }

    /// Whether retrying the same call later can succeed
    ///
    /// Input and account-state failures need the user to change something
    /// first; rate limits, server sessions and unknown failures do not.
    #[inline]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::TooManyAttempts
                | ErrorKind::SessionEstablishFailed
                | ErrorKind::SignOutFailed
                | ErrorKind::Unknown
        )
    }

    /// Whether the failure was raised locally before any network call
    #[inline]
    pub const fn is_precondition(&self) -> bool {
        matches!(self, ErrorKind::InvalidInput)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        let mut codes: Vec<&str> = ErrorKind::ALL.iter().map(ErrorKind::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), ErrorKind::ALL.len());
    }

    #[test]
    fn test_serialize_matches_code() {
        for kind in ErrorKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.code()));
        }
    }

    #[test]
    fn test_retryable() {
        assert!(ErrorKind::TooManyAttempts.is_retryable());
        assert!(ErrorKind::SessionEstablishFailed.is_retryable());
        assert!(!ErrorKind::InvalidInput.is_retryable());
        assert!(!ErrorKind::AccountConflict.is_retryable());
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorKind::WrongPassword.to_string(), "wrongPassword");
        assert!(ErrorKind::InvalidInput.is_precondition());
        assert!(!ErrorKind::NotFound.is_precondition());
    }
}
