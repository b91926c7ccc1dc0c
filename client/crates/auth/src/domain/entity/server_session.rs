//! Server Session Entity
//!
//! The backend cookie session obtained by exchanging a session token.

use serde::Serialize;

use crate::domain::entity::identity_assertion::IdentityAssertion;

/// Profile fields sent alongside the token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
}

impl SessionRequest {
    pub fn from_identity(identity: &IdentityAssertion) -> Self {
        Self {
            uid: identity.subject().as_str().to_string(),
            email: identity.email().map(str::to_string),
            display_name: identity.display_name().map(str::to_string),
            photo_url: identity.photo_url().map(str::to_string),
        }
    }
}

/// Established backend session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSession {
    /// HTTP status of the exchange (2xx)
    pub status: u16,
    /// Whether the response set a session cookie
    pub cookie_set: bool,
}

/// Outcome of one session exchange as seen by the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionResponse {
    Established { status: u16, cookie_set: bool },
    Rejected { status: u16, body: String },
    Unreachable { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::sign_in_method::SignInMethod;
    use kernel::id::SubjectId;

    #[test]
    fn test_request_from_identity() {
        let identity = IdentityAssertion::new(
            SubjectId::parse("u1").unwrap(),
            SignInMethod::from_provider_id("google.com"),
        )
        .with_email("a@x.com")
        .with_photo_url("https://x.com/a.png");

        let request = SessionRequest::from_identity(&identity);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["uid"], "u1");
        assert_eq!(json["email"], "a@x.com");
        assert_eq!(json["displayName"], serde_json::Value::Null);
        assert_eq!(json["photoURL"], "https://x.com/a.png");
    }
}
