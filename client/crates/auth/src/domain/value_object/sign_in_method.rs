//! Sign-in Method Value Object
//!
//! A sign-in method registered for an email, as reported by the
//! provider's sign-in-methods lookup.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::domain::value_object::federated_provider::FederatedProvider;

/// Provider id of email/password accounts
pub const PASSWORD_PROVIDER_ID: &str = "password";

/// Registered sign-in method
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SignInMethod {
    Password,
    Federated(FederatedProvider),
    Other(String),
}

impl SignInMethod {
    /// Create from a provider id (`password`, `google.com`, ...)
    pub fn from_provider_id(id: &str) -> Self {
        match id {
            PASSWORD_PROVIDER_ID => Self::Password,
            "google.com" => Self::Federated(FederatedProvider::Google),
            "facebook.com" => Self::Federated(FederatedProvider::Facebook),
            other => Self::Other(other.to_string()),
        }
    }

    pub fn provider_id(&self) -> &str {
        match self {
            Self::Password => PASSWORD_PROVIDER_ID,
            Self::Federated(p) => p.provider_id(),
            Self::Other(id) => id,
        }
    }

    /// Name shown to users
    pub fn label(&self) -> &str {
        match self {
            Self::Password => "Email/Password",
            Self::Federated(p) => p.label(),
            Self::Other(id) => id,
        }
    }

    #[inline]
    pub fn is_password(&self) -> bool {
        matches!(self, Self::Password)
    }
}

impl From<FederatedProvider> for SignInMethod {
    fn from(provider: FederatedProvider) -> Self {
        Self::Federated(provider)
    }
}

impl fmt::Display for SignInMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.provider_id())
    }
}

impl Serialize for SignInMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.provider_id())
    }
}

/// Human-readable list of method labels, e.g. "Google and Facebook"
///
/// Duplicate labels are listed once, in first-seen order.
pub fn describe_methods(methods: &[SignInMethod]) -> String {
    let mut labels: Vec<&str> = Vec::with_capacity(methods.len());
    for method in methods {
        if !labels.contains(&method.label()) {
            labels.push(method.label());
        }
    }

    match labels.as_slice() {
        [] => String::new(),
        [only] => (*only).to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_provider_id() {
        assert_eq!(SignInMethod::from_provider_id("password"), SignInMethod::Password);
        assert_eq!(
            SignInMethod::from_provider_id("google.com"),
            SignInMethod::Federated(FederatedProvider::Google)
        );
        assert_eq!(
            SignInMethod::from_provider_id("apple.com"),
            SignInMethod::Other("apple.com".to_string())
        );
    }

    #[test]
    fn test_labels() {
        assert_eq!(SignInMethod::Password.label(), "Email/Password");
        assert_eq!(SignInMethod::from_provider_id("facebook.com").label(), "Facebook");
        assert_eq!(SignInMethod::from_provider_id("github.com").label(), "github.com");
    }

    #[test]
    fn test_describe_methods() {
        assert_eq!(describe_methods(&[]), "");
        assert_eq!(
            describe_methods(&[SignInMethod::Federated(FederatedProvider::Google)]),
            "Google"
        );
        assert_eq!(
            describe_methods(&[
                SignInMethod::Password,
                FederatedProvider::Google.into(),
                FederatedProvider::Facebook.into(),
                FederatedProvider::Google.into(),
            ]),
            "Email/Password, Google and Facebook"
        );
    }
}
