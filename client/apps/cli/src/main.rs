//! BingeBoard Auth CLI Entry Point
//!
//! Wires environment configuration, logging and the REST adapters into an
//! `AuthBridge` and runs one operation. Uses `anyhow` for startup errors;
//! bridge failures are reported through `kernel::error::AuthError`.

mod args;

use std::process::ExitCode;
use std::sync::Arc;

use auth_bridge::infra::{IdpCredential, PresetCredential};
use auth_bridge::{
    AuthBridge, HttpSessionGateway, IdentityAssertion, IdentityToolkitProvider, SignInOutcome,
};
use clap::Parser;
use kernel::error::auth_error::{AuthError, AuthResult};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::args::{Cli, Command};

type Bridge = AuthBridge<IdentityToolkitProvider<PresetCredential>, HttpSessionGateway>;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bingeboard_auth=info,auth_bridge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.connection.to_config();

    let popup = match &cli.command {
        Command::Federated {
            provider,
            id_token,
            access_token,
        } => {
            let credential = match (id_token, access_token) {
                (Some(token), _) => IdpCredential::IdToken(token.clone()),
                (None, Some(token)) => IdpCredential::AccessToken(token.clone()),
                (None, None) => anyhow::bail!("a provider id token or access token is required"),
            };
            PresetCredential::new().with(*provider, credential)
        }
        _ => PresetCredential::new(),
    };

    let provider = Arc::new(IdentityToolkitProvider::new(&config, popup)?);
    let gateway = Arc::new(HttpSessionGateway::new(&config)?);
    let bridge: Bridge = AuthBridge::new(provider, gateway);

    tracing::debug!(endpoint = %config.session_endpoint, "Auth bridge ready");

    match run(&bridge, cli.command, !cli.no_session).await {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("{}", err.message());
            if let Some(action) = err.action() {
                eprintln!("{action}");
            }
            tracing::debug!(kind = %err.kind(), code = err.provider_code(), "Command failed");
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run(bridge: &Bridge, command: Command, with_session: bool) -> AuthResult<serde_json::Value> {
    let identity = match command {
        Command::SignIn(credentials) => {
            bridge
                .sign_in_with_password(&credentials.email, credentials.password)
                .await?
        }
        Command::SignUp {
            credentials,
            display_name,
        } => {
            bridge
                .sign_up_with_password(
                    &credentials.email,
                    credentials.password,
                    display_name.as_deref(),
                )
                .await?
        }
        Command::Federated { provider, .. } => bridge.sign_in_with_provider(provider).await?,
        Command::ResetPassword { email } => {
            bridge.send_password_reset(&email).await?;
            return Ok(serde_json::json!({ "passwordResetSent": email }));
        }
        Command::SignOut => {
            bridge.sign_out().await?;
            return Ok(serde_json::json!({ "state": bridge.current_state() }));
        }
    };

    if !with_session {
        return Ok(identity_report(&identity, None, None));
    }

    let SignInOutcome {
        identity,
        server_session,
        warning,
    } = bridge.complete_sign_in(identity).await;

    if let Some(warning) = &warning {
        eprintln!("Signed in, but the server session failed: {}", warning.message());
    }

    Ok(identity_report(&identity, server_session, warning.as_ref()))
}

fn identity_report(
    identity: &IdentityAssertion,
    server_session: Option<auth_bridge::ServerSession>,
    warning: Option<&AuthError>,
) -> serde_json::Value {
    serde_json::json!({
        "identity": identity,
        "profileKey": identity.profile_key(),
        "serverSession": server_session,
        "warning": warning.map(AuthError::to_json),
    })
}
