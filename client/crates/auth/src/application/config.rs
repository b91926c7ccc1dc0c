//! Application Configuration
//!
//! Configuration for the auth bridge and its REST adapters.

use std::time::Duration;

use platform::client::HttpClientConfig;
use url::Url;

/// Path of the backend session endpoint
pub const SESSION_PATH: &str = "api/auth/firebase-session";

const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const SECURE_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1/token";
const DEFAULT_API_BASE: &str = "http://localhost:3000/";

/// Auth bridge configuration
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Backend session endpoint
    pub session_endpoint: Url,
    /// Identity provider web API key
    pub api_key: String,
    /// Identity Toolkit base URL (without trailing slash)
    pub identity_toolkit_url: String,
    /// Secure Token endpoint
    pub secure_token_url: String,
    /// Redirect URI reported to the provider for federated sign-in
    pub continue_uri: String,
    /// Refresh cached id tokens this long before they expire
    pub token_refresh_margin: Duration,
    /// Whether plain `http` endpoints are acceptable
    pub allow_insecure_http: bool,
    /// HTTP client settings
    pub http: HttpClientConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            session_endpoint: Url::parse("https://localhost/api/auth/firebase-session")
                .unwrap_or_else(|_| unreachable!("static URL")),
            api_key: String::new(),
            identity_toolkit_url: IDENTITY_TOOLKIT_URL.to_string(),
            secure_token_url: SECURE_TOKEN_URL.to_string(),
            continue_uri: "http://localhost".to_string(),
            token_refresh_margin: Duration::from_secs(60),
            allow_insecure_http: false,
            http: HttpClientConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// Create config for an API key and backend base URL
    ///
    /// The session endpoint is resolved against `api_base`.
    pub fn new(api_key: impl Into<String>, api_base: &Url) -> Result<Self, url::ParseError> {
        Ok(Self {
            session_endpoint: session_endpoint(api_base)?,
            api_key: api_key.into(),
            continue_uri: api_base.to_string(),
            ..Self::default()
        })
    }

    /// Create config for development (local backend over plain HTTP)
    pub fn development(api_key: impl Into<String>) -> Result<Self, url::ParseError> {
        let api_base = Url::parse(DEFAULT_API_BASE)?;
        Ok(Self {
            allow_insecure_http: true,
            http: HttpClientConfig::development(),
            ..Self::new(api_key, &api_base)?
        })
    }

    /// Point the REST adapter at a local auth emulator (`host:port`)
    pub fn with_emulator(mut self, host: &str) -> Self {
        let host = host
            .trim_start_matches("http://")
            .trim_end_matches('/');
        self.identity_toolkit_url = format!("http://{host}/identitytoolkit.googleapis.com/v1");
        self.secure_token_url = format!("http://{host}/securetoken.googleapis.com/v1/token");
        self.allow_insecure_http = true;
        self.http.https_only = false;
        self
    }

    pub fn with_session_endpoint(mut self, endpoint: Url) -> Self {
        self.session_endpoint = endpoint;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http.timeout = timeout;
        self
    }

    /// Allow plain `http` endpoints (local development and tests)
    pub fn allow_insecure(mut self) -> Self {
        self.allow_insecure_http = true;
        self.http.https_only = false;
        self
    }
}

/// Resolve the session endpoint against a backend base URL
pub fn session_endpoint(api_base: &Url) -> Result<Url, url::ParseError> {
    if api_base.path().ends_with('/') {
        api_base.join(SESSION_PATH)
    } else {
        let mut base = api_base.clone();
        base.set_path(&format!("{}/", api_base.path()));
        base.join(SESSION_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_endpoint() {
        let base = Url::parse("https://api.bingeboard.app").unwrap();
        assert_eq!(
            session_endpoint(&base).unwrap().as_str(),
            "https://api.bingeboard.app/api/auth/firebase-session"
        );

        let base = Url::parse("https://x.com/prefix").unwrap();
        assert_eq!(
            session_endpoint(&base).unwrap().as_str(),
            "https://x.com/prefix/api/auth/firebase-session"
        );
    }

    #[test]
    fn test_default_is_secure() {
        let config = BridgeConfig::default();
        assert!(!config.allow_insecure_http);
        assert!(config.http.https_only);
        assert_eq!(config.token_refresh_margin, Duration::from_secs(60));
    }

    #[test]
    fn test_development() {
        let config = BridgeConfig::development("key").unwrap();
        assert!(config.allow_insecure_http);
        assert_eq!(
            config.session_endpoint.as_str(),
            "http://localhost:3000/api/auth/firebase-session"
        );
    }

    #[test]
    fn test_with_emulator() {
        let config = BridgeConfig::default().with_emulator("http://127.0.0.1:9099/");
        assert_eq!(
            config.identity_toolkit_url,
            "http://127.0.0.1:9099/identitytoolkit.googleapis.com/v1"
        );
        assert!(config.allow_insecure_http);
    }
}
