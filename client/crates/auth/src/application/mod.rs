//! Application Layer
//!
//! Use cases, error classification and the bridge facade.

pub mod bridge;
pub mod classify;
pub mod config;
pub mod establish_session;
pub mod password_reset;
pub mod sign_in_with_password;
pub mod sign_in_with_provider;
pub mod sign_out;
pub mod sign_up;

// Re-exports
pub use bridge::{AuthBridge, SignInOutcome};
pub use config::BridgeConfig;
pub use establish_session::EstablishSessionUseCase;
pub use password_reset::PasswordResetUseCase;
pub use sign_in_with_password::{SignInWithPasswordInput, SignInWithPasswordUseCase};
pub use sign_in_with_provider::SignInWithProviderUseCase;
pub use sign_out::SignOutUseCase;
pub use sign_up::{SignUpInput, SignUpUseCase};
