//! Identity Assertion Entity
//!
//! Proof, produced by the identity provider, that the user authenticated.
//! Immutable once produced; a new sign-in replaces it as a whole.

use chrono::{DateTime, Utc};
use kernel::id::SubjectId;
use serde::Serialize;

use crate::domain::value_object::sign_in_method::SignInMethod;

/// Identity assertion entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityAssertion {
    /// Provider-issued subject id
    subject: SubjectId,
    email: Option<String>,
    display_name: Option<String>,
    /// Avatar URL
    photo_url: Option<String>,
    /// Method the user authenticated with
    provider: SignInMethod,
    issued_at: DateTime<Utc>,
}

impl IdentityAssertion {
    /// Create an assertion issued now
    pub fn new(subject: SubjectId, provider: SignInMethod) -> Self {
        Self {
            subject,
            email: None,
            display_name: None,
            photo_url: None,
            provider,
            issued_at: Utc::now(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the display name; blank names are ignored
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        let display_name = display_name.into();
        self.display_name = (!display_name.trim().is_empty()).then_some(display_name);
        self
    }

    pub fn with_photo_url(mut self, photo_url: impl Into<String>) -> Self {
        self.photo_url = Some(photo_url.into());
        self
    }

    pub fn subject(&self) -> &SubjectId {
        &self.subject
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn photo_url(&self) -> Option<&str> {
        self.photo_url.as_deref()
    }

    pub fn provider(&self) -> &SignInMethod {
        &self.provider
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Key of the user-profile document for this identity
    pub fn profile_key(&self) -> &str {
        self.subject.as_str()
    }

    /// Whether both assertions name the same subject
    pub fn same_subject(&self, other: &IdentityAssertion) -> bool {
        self.subject == other.subject
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(id: &str) -> SubjectId {
        SubjectId::parse(id).unwrap()
    }

    #[test]
    fn test_builder() {
        let identity = IdentityAssertion::new(subject("u1"), SignInMethod::Password)
            .with_email("new@x.com")
            .with_display_name("New User");

        assert_eq!(identity.subject().as_str(), "u1");
        assert_eq!(identity.email(), Some("new@x.com"));
        assert_eq!(identity.display_name(), Some("New User"));
        assert_eq!(identity.photo_url(), None);
        assert_eq!(identity.profile_key(), "u1");
        assert!(identity.issued_at() <= Utc::now());
    }

    #[test]
    fn test_blank_display_name_ignored() {
        let identity =
            IdentityAssertion::new(subject("u1"), SignInMethod::Password).with_display_name("  ");
        assert_eq!(identity.display_name(), None);
    }

    #[test]
    fn test_same_subject() {
        let a = IdentityAssertion::new(subject("u1"), SignInMethod::Password);
        let b = IdentityAssertion::new(subject("u1"), SignInMethod::from_provider_id("google.com"));
        let c = IdentityAssertion::new(subject("u2"), SignInMethod::Password);
        assert!(a.same_subject(&b));
        assert!(!a.same_subject(&c));
    }

    #[test]
    fn test_serialize() {
        let identity = IdentityAssertion::new(subject("u1"), SignInMethod::Password)
            .with_photo_url("https://x.com/a.png");
        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(json["subject"], "u1");
        assert_eq!(json["provider"], "password");
        assert_eq!(json["photoUrl"], "https://x.com/a.png");
    }
}
