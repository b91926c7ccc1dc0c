//! Error Classification
//!
//! Turns provider failures into classified [`AuthError`]s. Most codes map
//! through [`ProviderCode::kind`]; a few need the sign-in methods registered
//! for the email before they can be told apart.

use kernel::error::{auth_error::AuthError, kind::ErrorKind};

use crate::domain::gateway::IdentityProvider;
use crate::domain::value_object::{
    federated_provider::FederatedProvider,
    sign_in_method::{SignInMethod, describe_methods},
};
use crate::error::{ProviderCode, ProviderFailure, log_failure};

/// Operation a failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    FederatedSignIn(FederatedProvider),
    PasswordSignIn,
    SignUp,
    PasswordReset,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FederatedSignIn(_) => "sign_in_with_provider",
            Self::PasswordSignIn => "sign_in_with_password",
            Self::SignUp => "sign_up_with_password",
            Self::PasswordReset => "send_password_reset",
        }
    }
}

/// Whether classifying `code` for `op` needs the sign-in-methods lookup
pub fn needs_method_lookup(op: Operation, code: &ProviderCode) -> bool {
    match op {
        Operation::PasswordSignIn => matches!(
            code,
            ProviderCode::InvalidLoginCredentials | ProviderCode::WrongPassword
        ),
        Operation::SignUp => matches!(code, ProviderCode::EmailAlreadyInUse),
        Operation::FederatedSignIn(_) => {
            matches!(code, ProviderCode::AccountExistsWithDifferentCredential)
        }
        Operation::PasswordReset => false,
    }
}

/// Run the sign-in-methods lookup
///
/// A failed lookup is logged and reported as `None`; classification then
/// falls back to its generic outcome.
pub async fn lookup_methods<P>(provider: &P, email: &str) -> Option<Vec<SignInMethod>>
where
    P: IdentityProvider,
{
    match provider.fetch_sign_in_methods(email).await {
        Ok(methods) => {
            tracing::debug!(count = methods.len(), "Sign-in methods fetched");
            Some(methods)
        }
        Err(failure) => {
            tracing::warn!(code = %failure.code, "Sign-in methods lookup failed");
            None
        }
    }
}

/// Classify a provider failure, running the lookup when the code needs it
///
/// `email` is the address the failure concerns; without it no lookup runs.
pub async fn classify_failure<P>(
    provider: &P,
    op: Operation,
    failure: &ProviderFailure,
    email: Option<&str>,
) -> AuthError
where
    P: IdentityProvider,
{
    let methods = match email {
        Some(email) if needs_method_lookup(op, &failure.code) => {
            lookup_methods(provider, email).await
        }
        _ => None,
    };

    let err = classify(op, failure, methods.as_deref());
    log_failure(op.name(), &err);
    err
}

/// Classify a provider failure
///
/// `methods` is the lookup result when one was run. The provider code is
/// always attached for diagnostics.
pub fn classify(
    op: Operation,
    failure: &ProviderFailure,
    methods: Option<&[SignInMethod]>,
) -> AuthError {
    let code = &failure.code;

    let err = match (op, code) {
        (
            Operation::PasswordSignIn,
            ProviderCode::InvalidLoginCredentials | ProviderCode::WrongPassword,
        ) => credential_rejection(code, methods),
        (Operation::SignUp, ProviderCode::EmailAlreadyInUse) => sign_up_conflict(methods),
        (Operation::FederatedSignIn(_), ProviderCode::AccountExistsWithDifferentCredential) => {
            federated_conflict(methods)
        }
        (Operation::PasswordSignIn | Operation::PasswordReset, ProviderCode::UserNotFound) => {
            not_found()
        }
        (_, ProviderCode::InvalidEmail) => {
            AuthError::invalid_input("Please enter a valid email address.")
        }
        (_, ProviderCode::TooManyRequests) => AuthError::from_kind(ErrorKind::TooManyAttempts)
            .with_action("Wait a few minutes before trying again"),
        _ => AuthError::from_kind(code.kind()),
    };

    err.with_provider_code(code.as_str())
}

fn not_found() -> AuthError {
    AuthError::not_found("No account found with this email. Please sign up first.")
        .with_action("Create an account")
}

/// Tell a wrong password from an unknown account or another provider
fn credential_rejection(code: &ProviderCode, methods: Option<&[SignInMethod]>) -> AuthError {
    match methods {
        Some([]) => not_found(),
        Some(methods) if methods.iter().any(SignInMethod::is_password) => {
            AuthError::from_kind(ErrorKind::WrongPassword)
                .with_action("Reset your password if you forgot it")
        }
        Some(methods) => {
            let labels = describe_methods(methods);
            AuthError::account_conflict(format!(
                "This email is registered with {labels}. Please sign in with {labels} instead."
            ))
        }
        None if *code == ProviderCode::WrongPassword => {
            AuthError::from_kind(ErrorKind::WrongPassword)
        }
        None => AuthError::from_kind(ErrorKind::InvalidCredentials),
    }
}

fn sign_up_conflict(methods: Option<&[SignInMethod]>) -> AuthError {
    let err = match methods {
        Some(methods) if !methods.is_empty() => AuthError::account_conflict(format!(
            "An account with this email already exists using {}. Please sign in instead.",
            describe_methods(methods)
        )),
        _ => AuthError::account_conflict(
            "An account with this email already exists. Please sign in instead.",
        ),
    };
    err.with_action("Sign in to your existing account")
}

fn federated_conflict(methods: Option<&[SignInMethod]>) -> AuthError {
    match methods {
        Some(methods) if !methods.is_empty() => {
            let labels = describe_methods(methods);
            AuthError::account_conflict(format!(
                "An account already exists with this email using {labels}. Please sign in with {labels} instead."
            ))
        }
        _ => AuthError::from_kind(ErrorKind::AccountConflict),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(code: &str) -> ProviderFailure {
        ProviderFailure::from_code(ProviderCode::parse(code))
    }

    #[test]
    fn test_needs_method_lookup() {
        let invalid = ProviderCode::InvalidLoginCredentials;
        assert!(needs_method_lookup(Operation::PasswordSignIn, &invalid));
        assert!(needs_method_lookup(Operation::PasswordSignIn, &ProviderCode::WrongPassword));
        assert!(!needs_method_lookup(Operation::PasswordSignIn, &ProviderCode::UserDisabled));
        assert!(needs_method_lookup(Operation::SignUp, &ProviderCode::EmailAlreadyInUse));
        assert!(!needs_method_lookup(Operation::PasswordReset, &ProviderCode::UserNotFound));
    }

    #[test]
    fn test_credential_rejection_disambiguation() {
        let f = failure("auth/invalid-login-credentials");
        let op = Operation::PasswordSignIn;

        let none: Vec<SignInMethod> = Vec::new();
        let password = vec![SignInMethod::Password, FederatedProvider::Google.into()];
        let google = vec![SignInMethod::from(FederatedProvider::Google)];

        assert_eq!(classify(op, &f, Some(none.as_slice())).kind(), ErrorKind::NotFound);
        assert_eq!(
            classify(op, &f, Some(password.as_slice())).kind(),
            ErrorKind::WrongPassword
        );

        let err = classify(op, &f, Some(google.as_slice()));
        assert_eq!(err.kind(), ErrorKind::AccountConflict);
        assert!(err.message().contains("Google"));

        assert_eq!(classify(op, &f, None).kind(), ErrorKind::InvalidCredentials);
        assert_eq!(
            classify(op, &failure("auth/wrong-password"), None).kind(),
            ErrorKind::WrongPassword
        );
    }

    #[test]
    fn test_sign_up_conflict_names_methods() {
        let f = failure("auth/email-already-in-use");
        let methods = vec![SignInMethod::Password];
        let err = classify(Operation::SignUp, &f, Some(methods.as_slice()));
        assert_eq!(err.kind(), ErrorKind::AccountConflict);
        assert!(err.message().contains("Email/Password"));

        let generic = classify(Operation::SignUp, &f, None);
        assert_eq!(generic.kind(), ErrorKind::AccountConflict);
        assert!(!generic.message().contains("using"));
    }

    #[test]
    fn test_federated_codes() {
        let op = Operation::FederatedSignIn(FederatedProvider::Google);
        assert_eq!(
            classify(op, &failure("auth/popup-closed-by-user"), None).kind(),
            ErrorKind::Cancelled
        );
        assert_eq!(
            classify(op, &failure("auth/popup-blocked"), None).kind(),
            ErrorKind::Blocked
        );

        let conflict = failure("auth/account-exists-with-different-credential");
        let methods = vec![SignInMethod::from(FederatedProvider::Facebook)];
        let err = classify(op, &conflict, Some(methods.as_slice()));
        assert_eq!(err.kind(), ErrorKind::AccountConflict);
        assert!(err.message().contains("Facebook"));
    }

    #[test]
    fn test_federated_conflict_fallback() {
        let op = Operation::FederatedSignIn(FederatedProvider::Google);
        let conflict = failure("auth/account-exists-with-different-credential");
        let none: Vec<SignInMethod> = Vec::new();

        for methods in [None, Some(none.as_slice())] {
            let err = classify(op, &conflict, methods);
            assert_eq!(err.kind(), ErrorKind::AccountConflict);
            assert_eq!(err.message(), ErrorKind::AccountConflict.default_message());
            assert_eq!(
                err.provider_code(),
                Some("auth/account-exists-with-different-credential")
            );
        }
    }

    #[test]
    fn test_context_free_codes() {
        let cases = [
            (Operation::PasswordSignIn, "auth/user-not-found", ErrorKind::NotFound),
            (Operation::PasswordSignIn, "auth/user-disabled", ErrorKind::Disabled),
            (Operation::PasswordSignIn, "auth/too-many-requests", ErrorKind::TooManyAttempts),
            (Operation::PasswordSignIn, "auth/operation-not-allowed", ErrorKind::Disallowed),
            (Operation::PasswordSignIn, "auth/invalid-email", ErrorKind::InvalidInput),
            (Operation::SignUp, "auth/weak-password", ErrorKind::WeakPassword),
            (Operation::SignUp, "auth/operation-not-allowed", ErrorKind::Disallowed),
            (Operation::PasswordReset, "auth/user-not-found", ErrorKind::NotFound),
            (Operation::PasswordReset, "auth/too-many-requests", ErrorKind::TooManyAttempts),
            (Operation::PasswordReset, "auth/quota-exceeded", ErrorKind::Unknown),
        ];
        for (op, code, kind) in cases {
            assert_eq!(classify(op, &failure(code), None).kind(), kind, "{code}");
        }
    }

    #[test]
    fn test_provider_code_attached() {
        let err = classify(Operation::PasswordReset, &failure("EMAIL_NOT_FOUND"), None);
        assert_eq!(err.provider_code(), Some("auth/user-not-found"));
    }
}
