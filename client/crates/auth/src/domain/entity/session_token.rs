//! Session Token Entity
//!
//! Short-lived bearer credential minted from the current identity for a
//! single server-session request. Never persisted and never cloned.

use chrono::{DateTime, Utc};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Bearer token minted by the identity provider
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SessionToken {
    value: String,
    #[zeroize(skip)]
    expires_at: Option<DateTime<Utc>>,
}

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            expires_at: None,
        }
    }

    pub fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// SHA-256 prefix for log correlation
    pub fn fingerprint(&self) -> String {
        platform::crypto::fingerprint(&self.value)
    }

    /// Consume the token, handing its value to the request that uses it
    pub fn into_bearer(mut self) -> Zeroizing<String> {
        Zeroizing::new(std::mem::take(&mut self.value))
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionToken")
            .field("value", &"[REDACTED]")
            .field("fingerprint", &self.fingerprint())
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redaction() {
        let token = SessionToken::new("eyJhbGciOiJSUzI1NiJ9.secret");
        let debug = format!("{:?}", token);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("secret"));
        assert!(debug.contains(&token.fingerprint()));
    }

    #[test]
    fn test_into_bearer() {
        let token = SessionToken::new("abc");
        let fp = token.fingerprint();
        assert_eq!(fp.len(), 12);
        let bearer = token.into_bearer();
        assert_eq!(bearer.as_str(), "abc");
    }
}
