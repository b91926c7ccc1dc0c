//! Common ID Types
//!
//! Type-safe wrappers for the opaque identifiers issued by the identity
//! provider. The provider decides the format; the bridge only checks that
//! an id is present.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error when parsing an opaque id
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("identifier must not be empty")]
    Empty,
    #[error("identifier must not contain whitespace")]
    Whitespace,
}

/// Generic typed ID wrapper
///
/// Usage:
/// ```
/// use kernel::id::{Id, markers};
/// type SubjectId = Id<markers::Subject>;
///
/// let id = SubjectId::parse("u1").unwrap();
/// assert_eq!(id.as_str(), "u1");
/// ```
pub struct Id<T> {
    value: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    /// Parse an id issued by the provider
    pub fn parse(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        if value.is_empty() {
            return Err(IdError::Empty);
        }
        if value.chars().any(char::is_whitespace) {
            return Err(IdError::Whitespace);
        }
        Ok(Self {
            value,
            _marker: PhantomData,
        })
    }

    /// Get the underlying string
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Convert to the underlying string
    pub fn into_string(self) -> String {
        self.value
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.value)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T> AsRef<str> for Id<T> {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Id::parse(value).map_err(serde::de::Error::custom)
    }
}

/// Marker types for different ids
pub mod markers {
    /// Marker for identity-provider subject ids (also the profile document key)
    pub struct Subject;
}

/// Type aliases for common IDs
pub type SubjectId = Id<markers::Subject>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_empty_and_whitespace() {
        assert_eq!(SubjectId::parse(""), Err(IdError::Empty));
        assert_eq!(SubjectId::parse("a b"), Err(IdError::Whitespace));
        assert!(SubjectId::parse("kX9pQ2").is_ok());
    }

    #[test]
    fn test_serde_as_plain_string() {
        let id = SubjectId::parse("uid-42").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"uid-42\"");

        let back: SubjectId = serde_json::from_str("\"uid-42\"").unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<SubjectId>("\"\"").is_err());
    }
}
