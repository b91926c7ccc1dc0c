//! Command Line Arguments

use std::time::Duration;

use auth_bridge::{BridgeConfig, FederatedProvider};
use clap::{Args, Parser, Subcommand};
use platform::client::is_loopback;
use url::Url;

/// BingeBoard sign-in driver
#[derive(Debug, Parser)]
#[command(name = "bingeboard-auth", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Only sign in with the provider; skip the server session exchange
    #[arg(long, global = true)]
    pub no_session: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct ConnectionArgs {
    /// Identity provider web API key
    #[arg(long, env = "FIREBASE_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Backend session endpoint
    #[arg(
        long,
        env = "BINGEBOARD_SESSION_ENDPOINT",
        default_value = "http://localhost:3000/api/auth/firebase-session"
    )]
    pub session_endpoint: Url,

    /// Auth emulator host (`127.0.0.1:9099`)
    #[arg(long, env = "FIREBASE_AUTH_EMULATOR_URL")]
    pub emulator: Option<String>,

    /// Accept plain-HTTP endpoints (local development)
    #[arg(long, env = "BINGEBOARD_ALLOW_INSECURE_HTTP")]
    pub allow_insecure_http: bool,

    /// Request timeout in seconds
    #[arg(long, env = "BINGEBOARD_HTTP_TIMEOUT", default_value_t = 15)]
    pub timeout: u64,

    /// Redirect URI reported for federated sign-in
    #[arg(long, env = "BINGEBOARD_CONTINUE_URI")]
    pub continue_uri: Option<String>,
}

impl ConnectionArgs {
    pub fn to_config(&self) -> BridgeConfig {
        let mut config = BridgeConfig {
            api_key: self.api_key.clone(),
            ..BridgeConfig::default()
        }
        .with_session_endpoint(self.session_endpoint.clone())
        .with_timeout(Duration::from_secs(self.timeout));

        if let Some(continue_uri) = &self.continue_uri {
            config.continue_uri = continue_uri.clone();
        }
        // Plain http is fine for a backend on this machine
        if self.allow_insecure_http || is_loopback(&self.session_endpoint) {
            config = config.allow_insecure();
        }
        if let Some(host) = &self.emulator {
            config = config.with_emulator(host);
        }
        config
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in with email and password
    SignIn(Credentials),

    /// Create an email/password account
    SignUp {
        #[command(flatten)]
        credentials: Credentials,

        /// Display name for the new account
        #[arg(long)]
        display_name: Option<String>,
    },

    /// Sign in with a federated provider credential
    Federated {
        /// `google` or `facebook`
        #[arg(long)]
        provider: FederatedProvider,

        /// OAuth id token from the provider
        #[arg(long, conflicts_with = "access_token", required_unless_present = "access_token")]
        id_token: Option<String>,

        /// OAuth access token from the provider
        #[arg(long)]
        access_token: Option<String>,
    },

    /// Send a password reset email
    ResetPassword {
        #[arg(long)]
        email: String,
    },

    /// End the provider session
    SignOut,
}

#[derive(Debug, Args)]
pub struct Credentials {
    #[arg(long)]
    pub email: String,

    #[arg(long, env = "BINGEBOARD_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth_bridge::infra::PresetCredential;
    use auth_bridge::{HttpSessionGateway, IdentityToolkitProvider};
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_federated() {
        let cli = Cli::try_parse_from([
            "bingeboard-auth",
            "--api-key",
            "k",
            "federated",
            "--provider",
            "google",
            "--id-token",
            "jwt",
        ])
        .unwrap();

        match cli.command {
            Command::Federated { provider, id_token, access_token } => {
                assert_eq!(provider, FederatedProvider::Google);
                assert_eq!(id_token.as_deref(), Some("jwt"));
                assert!(access_token.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_config_from_args() {
        let cli = Cli::try_parse_from([
            "bingeboard-auth",
            "--api-key",
            "k",
            "--emulator",
            "127.0.0.1:9099",
            "sign-out",
        ])
        .unwrap();

        let config = cli.connection.to_config();
        assert_eq!(config.api_key, "k");
        assert!(config.allow_insecure_http);
        assert!(config.identity_toolkit_url.starts_with("http://127.0.0.1:9099/"));
    }

    #[test]
    fn test_default_endpoint_builds_gateway() {
        let cli = Cli::try_parse_from(["bingeboard-auth", "--api-key", "k", "sign-out"]).unwrap();

        let config = cli.connection.to_config();
        assert!(config.allow_insecure_http);
        assert!(HttpSessionGateway::new(&config).is_ok());
        assert!(IdentityToolkitProvider::new(&config, PresetCredential::new()).is_ok());
    }

    #[test]
    fn test_remote_http_endpoint_is_refused() {
        let cli = Cli::try_parse_from([
            "bingeboard-auth",
            "--api-key",
            "k",
            "--session-endpoint",
            "http://api.bingeboard.app/api/auth/firebase-session",
            "sign-out",
        ])
        .unwrap();

        let config = cli.connection.to_config();
        assert!(!config.allow_insecure_http);
        assert!(HttpSessionGateway::new(&config).is_err());
    }
}
