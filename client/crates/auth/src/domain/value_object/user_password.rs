//! User Password Value Object
//!
//! Domain wrapper around `platform::password` that turns policy
//! violations into `invalidInput` errors.

use kernel::error::auth_error::{AuthError, AuthResult};
use platform::password::{ClearTextPassword, PasswordPolicyError};
use std::fmt;

/// Raw password from user input
///
/// Memory is zeroized when dropped.
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Create a new raw password, checking the length precondition
    pub fn new(raw: impl Into<String>) -> AuthResult<Self> {
        let clear_text = ClearTextPassword::new(raw.into()).map_err(|e| match e {
            PasswordPolicyError::TooShort { min, .. } => {
                AuthError::invalid_input(format!("Password must be at least {} characters.", min))
                    .with_action("Please choose a longer password")
            }
        })?;

        Ok(Self(clear_text))
    }

    /// Clear text for the provider request
    pub fn expose(&self) -> &str {
        self.0.expose()
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}
