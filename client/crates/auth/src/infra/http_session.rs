//! HTTP Session Gateway
//!
//! POSTs the session token to the backend session endpoint and reports
//! whether a session cookie came back.

use platform::client::{ClientError, ensure_secure};
use url::Url;

use crate::application::config::BridgeConfig;
use crate::domain::entity::{
    server_session::{SessionRequest, SessionResponse},
    session_token::SessionToken,
};
use crate::domain::gateway::SessionGateway;
use crate::infra::dto::SessionBody;

/// Backend session endpoint over HTTP
#[derive(Debug, Clone)]
pub struct HttpSessionGateway {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpSessionGateway {
    /// Create a gateway for the configured endpoint
    ///
    /// Plain `http` endpoints are refused unless the config allows them.
    pub fn new(config: &BridgeConfig) -> Result<Self, ClientError> {
        ensure_secure(&config.session_endpoint, config.allow_insecure_http)?;

        Ok(Self {
            http: config.http.build()?,
            endpoint: config.session_endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl SessionGateway for HttpSessionGateway {
    async fn exchange(&self, token: SessionToken, request: &SessionRequest) -> SessionResponse {
        let bearer = token.into_bearer();
        let body = SessionBody {
            firebase_token: bearer.as_str(),
            user: request,
        };

        let response = match self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(bearer.as_str())
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                return SessionResponse::Unreachable {
                    reason: err.to_string(),
                };
            }
        };

        let status = response.status().as_u16();

        if response.status().is_success() {
            let cookie_set = platform::cookie::sets_any_cookie(response.headers());
            if !cookie_set {
                tracing::warn!(status, "Session endpoint answered without a session cookie");
            }
            return SessionResponse::Established { status, cookie_set };
        }

        let body = response.text().await.unwrap_or_default();
        SessionResponse::Rejected { status, body }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer) -> BridgeConfig {
        let endpoint = Url::parse(&format!("{}/api/auth/firebase-session", server.uri())).unwrap();
        BridgeConfig::default()
            .with_session_endpoint(endpoint)
            .allow_insecure()
    }

    fn request() -> SessionRequest {
        SessionRequest {
            uid: "u1".to_string(),
            email: Some("a@x.com".to_string()),
            display_name: Some("A".to_string()),
            photo_url: None,
        }
    }

    #[test]
    fn test_refuses_plain_http_by_default() {
        let config = BridgeConfig::default().with_session_endpoint(
            Url::parse("http://api.bingeboard.app/api/auth/firebase-session").unwrap(),
        );
        assert!(matches!(
            HttpSessionGateway::new(&config),
            Err(ClientError::InsecureEndpoint(_))
        ));
    }

    #[tokio::test]
    async fn test_exchange_established() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/firebase-session"))
            .and(header("authorization", "Bearer tok-1"))
            .and(body_json(json!({
                "firebaseToken": "tok-1",
                "user": {
                    "uid": "u1",
                    "email": "a@x.com",
                    "displayName": "A",
                    "photoURL": null,
                }
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "session=abc; Path=/; HttpOnly; Secure")
                    .set_body_json(json!({ "ok": true })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let gateway = HttpSessionGateway::new(&config(&server)).unwrap();
        let response = gateway.exchange(SessionToken::new("tok-1"), &request()).await;

        assert_eq!(
            response,
            SessionResponse::Established {
                status: 200,
                cookie_set: true
            }
        );
    }

    #[tokio::test]
    async fn test_exchange_without_cookie() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let gateway = HttpSessionGateway::new(&config(&server)).unwrap();
        let response = gateway.exchange(SessionToken::new("tok"), &request()).await;
        assert_eq!(
            response,
            SessionResponse::Established {
                status: 204,
                cookie_set: false
            }
        );
    }

    #[tokio::test]
    async fn test_exchange_rejected_keeps_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("token revoked"))
            .mount(&server)
            .await;

        let gateway = HttpSessionGateway::new(&config(&server)).unwrap();
        let response = gateway.exchange(SessionToken::new("tok"), &request()).await;
        assert_eq!(
            response,
            SessionResponse::Rejected {
                status: 401,
                body: "token revoked".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_exchange_unreachable() {
        // Reserve a port, then free it so nothing is listening there
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let endpoint = Url::parse(&format!("http://127.0.0.1:{port}/api/auth/firebase-session")).unwrap();
        let config = BridgeConfig::default()
            .with_session_endpoint(endpoint)
            .allow_insecure();

        let gateway = HttpSessionGateway::new(&config).unwrap();
        let response = gateway.exchange(SessionToken::new("tok"), &request()).await;
        assert!(matches!(response, SessionResponse::Unreachable { .. }));
    }
}
