//! Clear-text Password Handling
//!
//! Passwords only pass through this process on their way to the identity
//! provider, which owns hashing and strength policy. What stays here:
//! - The client-side length precondition
//! - Zeroization of the clear text once the request is built
//! - Redacted debug output
//!
//! No normalization is applied: the provider must receive the exact
//! characters the account was registered with.

use std::fmt;

use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

// ============================================================================
// Constants
// ============================================================================

/// Minimum password length accepted by the identity provider
pub const MIN_PASSWORD_LENGTH: usize = 6;

// ============================================================================
// Error Types
// ============================================================================

/// Password policy violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    /// Password is too short
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// ## Security
/// - Implements `Zeroize` and `ZeroizeOnDrop`
/// - Does not implement `Clone` to prevent accidental copies
/// - Debug output is redacted
///
/// ## Examples
/// ```rust
/// use platform::password::ClearTextPassword;
///
/// let password = ClearTextPassword::new("secret1".to_string()).unwrap();
/// assert_eq!(password.char_count(), 7);
/// assert!(ClearTextPassword::new("abc".to_string()).is_err());
/// ```
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Create a new clear text password, checking the length precondition
    ///
    /// Length is counted in Unicode scalar values, not bytes.
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let char_count = raw.chars().count();
        if char_count < MIN_PASSWORD_LENGTH {
            // `raw` is moved into a zeroizing wrapper so the rejected value is wiped too
            drop(Self(raw));
            return Err(PasswordPolicyError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: char_count,
            });
        }
        Ok(Self(raw))
    }

    /// Clear text for building the provider request
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Length in Unicode scalar values
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}
