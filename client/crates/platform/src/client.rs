//! HTTP client construction
//!
//! Every outbound call of the bridge (identity provider REST API, backend
//! session endpoint) goes through a `reqwest::Client` built here, so cookie
//! handling, timeouts and TLS policy stay consistent.

use std::net::IpAddr;
use std::time::Duration;

use reqwest::Url;

/// Default timeout for a single request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP client settings
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Per-request timeout
    pub timeout: Duration,
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// Keep cookies set by responses and send them back ("credentials included")
    pub cookie_store: bool,
    /// Refuse plain-HTTP requests
    pub https_only: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("bingeboard-auth/", env!("CARGO_PKG_VERSION")).to_string(),
            cookie_store: true,
            https_only: true,
        }
    }
}

impl HttpClientConfig {
    /// Settings for local development and tests (plain HTTP allowed)
    pub fn development() -> Self {
        Self {
            https_only: false,
            ..Self::default()
        }
    }

    /// Build the client
    pub fn build(&self) -> Result<reqwest::Client, ClientError> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .cookie_store(self.cookie_store)
            .https_only(self.https_only)
            .build()
            .map_err(ClientError::Build)
    }
}

/// Error when preparing an HTTP client or endpoint
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("endpoint must use https: {0}")]
    InsecureEndpoint(String),
}

/// Check that an endpoint may be called under the given policy
///
/// ## Arguments
/// * `url` - Endpoint to check
/// * `allow_insecure` - Whether plain `http` is acceptable (development only)
pub fn ensure_secure(url: &Url, allow_insecure: bool) -> Result<(), ClientError> {
    match url.scheme() {
        "https" => Ok(()),
        "http" if allow_insecure => Ok(()),
        _ => Err(ClientError::InsecureEndpoint(url.to_string())),
    }
}

/// Whether the endpoint host is this machine
pub fn is_loopback(url: &Url) -> bool {
    match url.host_str() {
        Some("localhost") => true,
        Some(host) => host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .is_ok_and(|ip| ip.is_loopback()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_secure() {
        let https: Url = "https://api.bingeboard.app/api/auth/firebase-session"
            .parse()
            .unwrap();
        let http: Url = "http://localhost:3000/api/auth/firebase-session"
            .parse()
            .unwrap();

        assert!(ensure_secure(&https, false).is_ok());
        assert!(matches!(
            ensure_secure(&http, false),
            Err(ClientError::InsecureEndpoint(_))
        ));
        assert!(ensure_secure(&http, true).is_ok());

        let ftp: Url = "ftp://example.com/".parse().unwrap();
        assert!(ensure_secure(&ftp, true).is_err());
    }

    #[test]
    fn test_is_loopback() {
        for raw in [
            "http://localhost:3000/",
            "http://127.0.0.1:9099/",
            "http://[::1]:3000/",
        ] {
            assert!(is_loopback(&raw.parse().unwrap()), "{raw}");
        }
        for raw in ["http://api.bingeboard.app/", "http://10.0.0.5/", "http://localhost.evil.com/"] {
            assert!(!is_loopback(&raw.parse().unwrap()), "{raw}");
        }
    }

    #[test]
    fn test_build_clients() {
        assert!(HttpClientConfig::default().build().is_ok());
        let dev = HttpClientConfig::development();
        assert!(!dev.https_only);
        assert!(dev.cookie_store);
        assert!(dev.build().is_ok());
    }
}
