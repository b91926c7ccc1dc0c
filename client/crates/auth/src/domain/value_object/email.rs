//! Email Value Object
//!
//! Represents an email address that passed the client-side syntax check.
//! The identity provider applies its own, stricter validation.

use kernel::error::auth_error::{AuthError, AuthResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Maximum email length (per RFC 5321)
const EMAIL_MAX_LENGTH: usize = 254;

/// Email address value object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// Create a new email with validation
    ///
    /// Fails with `invalidInput` before any network call.
    pub fn new(email: impl Into<String>) -> AuthResult<Self> {
        let email = email.into().trim().to_lowercase();

        if email.is_empty() {
            return Err(AuthError::invalid_input("Please enter your email address."));
        }

        if email.len() > EMAIL_MAX_LENGTH || !Self::is_valid_format(&email) {
            return Err(AuthError::invalid_input("Please enter a valid email address."));
        }

        Ok(Self(email))
    }

    /// Basic email format validation
    fn is_valid_format(email: &str) -> bool {
        if email.chars().any(char::is_whitespace) {
            return false;
        }

        // Must contain exactly one @ with something on both sides
        match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty() && !domain.is_empty() && !domain.contains('@')
            }
            None => false,
        }
    }

    /// Get the email as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the domain part of the email
    pub fn domain(&self) -> &str {
        self.0.split('@').nth(1).unwrap_or("")
    }
}

impl FromStr for Email {
    type Err = AuthError;

    fn from_str(s: &str) -> AuthResult<Self> {
        Email::new(s)
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
