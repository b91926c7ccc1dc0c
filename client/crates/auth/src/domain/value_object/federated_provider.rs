//! Federated Provider Value Object
//!
//! The identity providers offered through the interactive popup flow.

use derive_more::Display;
use kernel::error::auth_error::AuthError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Federated identity provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum FederatedProvider {
    #[display("google")]
    Google,
    #[display("facebook")]
    Facebook,
}

impl FederatedProvider {
    /// Provider id used by the identity provider API
    #[inline]
    pub const fn provider_id(&self) -> &'static str {
        match self {
            Self::Google => "google.com",
            Self::Facebook => "facebook.com",
        }
    }

    /// Name shown to users
    #[inline]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::Facebook => "Facebook",
        }
    }
}

impl FromStr for FederatedProvider {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" | "google.com" => Ok(Self::Google),
            "facebook" | "facebook.com" => Ok(Self::Facebook),
            other => Err(AuthError::invalid_input(format!(
                "Unsupported sign-in provider: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("google".parse::<FederatedProvider>().unwrap(), FederatedProvider::Google);
        assert_eq!("Facebook".parse::<FederatedProvider>().unwrap(), FederatedProvider::Facebook);
        assert_eq!("google.com".parse::<FederatedProvider>().unwrap(), FederatedProvider::Google);
        assert!("twitter".parse::<FederatedProvider>().is_err());
    }

    #[test]
    fn test_display_and_ids() {
        assert_eq!(FederatedProvider::Google.to_string(), "google");
        assert_eq!(FederatedProvider::Facebook.provider_id(), "facebook.com");
        assert_eq!(FederatedProvider::Facebook.label(), "Facebook");
    }
}
