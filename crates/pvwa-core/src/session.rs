//! Authenticated API session
//!
//! [`ApiSession`] is the explicit context every network operation takes: the
//! API root, the principal, the session token and the reusable HTTP client.
//! The token's lifetime is the server's business. Nothing here refreshes it;
//! once it stops working every call fails hard.

use crate::config::ExportConfig;
use crate::error::{ExportError, ExportResult};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use std::fmt;
use tracing::{info, instrument};

/// Body of `POST /auth/<provider>/Logon`
#[derive(Serialize)]
struct LogonRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// An authenticated PVWA session
#[derive(Clone)]
pub struct ApiSession {
    api_root: String,
    username: String,
    token: String,
    http: Client,
}

impl ApiSession {
    /// Exchange credentials for a session token
    ///
    /// One attempt only: a transport failure, a non-success status or an empty
    /// token is returned to the caller as is.
    #[instrument(skip(config, password), fields(username = %config.username, provider = %config.auth_provider))]
    pub async fn authenticate(config: &ExportConfig, password: &str) -> ExportResult<Self> {
        config.validate()?;
        if password.is_empty() {
            return Err(ExportError::config("password cannot be empty"));
        }

        let http = build_http_client()?;
        let api_root = config.api_root().to_string();
        let url = format!("{}/auth/{}/Logon", api_root, config.auth_provider);

        info!("requesting session token");
        let response = http
            .post(&url)
            .json(&LogonRequest {
                username: &config.username,
                password,
            })
            .send()
            .await
            .map_err(|e| ExportError::transport(&url, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExportError::transport(&url, e))?;

        if !status.is_success() {
            return Err(ExportError::auth(Some(status.as_u16()), body.trim().to_string()));
        }

        let token = parse_token(&body)
            .ok_or_else(|| ExportError::auth(Some(status.as_u16()), "server returned an empty token"))?;

        info!("authenticated");
        Ok(Self {
            api_root,
            username: config.username.clone(),
            token,
            http,
        })
    }

    /// Build a session around a token obtained elsewhere
    pub fn from_token(
        api_root: impl Into<String>,
        username: impl Into<String>,
        token: impl Into<String>,
    ) -> ExportResult<Self> {
        Ok(Self {
            api_root: api_root.into().trim_end_matches('/').to_string(),
            username: username.into(),
            token: token.into(),
            http: build_http_client()?,
        })
    }

    /// Absolute URL for an API path such as `/recordings`
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_root, path)
    }

    /// Authenticated GET request
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.http.get(url).header(AUTHORIZATION, &self.token)
    }

    /// Authenticated POST request
    pub fn post(&self, url: &str) -> RequestBuilder {
        self.http.post(url).header(AUTHORIZATION, &self.token)
    }

    /// Principal this session was opened for
    pub fn username(&self) -> &str {
        &self.username
    }

    /// API root without trailing slash
    pub fn api_root(&self) -> &str {
        &self.api_root
    }
}

impl fmt::Debug for ApiSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiSession")
            .field("api_root", &self.api_root)
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

fn build_http_client() -> ExportResult<Client> {
    Client::builder()
        .user_agent(concat!("pvwa-export/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ExportError::config(format!("failed to build HTTP client: {}", e)))
}

/// The logon endpoint answers with a JSON string literal, e.g. `"abc123"`
fn parse_token(body: &str) -> Option<String> {
    let token = body.trim().trim_matches('"').trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: &str) -> ExportConfig {
        ExportConfig::default()
            .with_base_url(base_url)
            .with_username("auditor")
    }

    #[test]
    fn test_parse_token() {
        assert_eq!(parse_token("\"abc123\""), Some("abc123".to_string()));
        assert_eq!(parse_token("abc123\n"), Some("abc123".to_string()));
        assert_eq!(parse_token(" \"tok\" "), Some("tok".to_string()));
        assert_eq!(parse_token("\"\""), None);
        assert_eq!(parse_token(""), None);
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = ApiSession::from_token("https://pvwa/", "auditor", "secret-token").unwrap();
        let debug = format!("{:?}", session);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("<redacted>"));
        assert_eq!(session.api_root(), "https://pvwa");
        assert_eq!(session.url("/recordings"), "https://pvwa/recordings");
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/CyberArk/Logon"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(serde_json::json!({
                "username": "auditor",
                "password": "hunter2"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string("\"token-xyz\""))
            .expect(1)
            .mount(&mock_server)
            .await;

        let session = ApiSession::authenticate(&test_config(&mock_server.uri()), "hunter2")
            .await
            .unwrap();
        assert_eq!(session.token, "token-xyz");
        assert_eq!(session.username(), "auditor");
    }

    #[tokio::test]
    async fn test_authenticate_uses_configured_provider() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/LDAP/Logon"))
            .respond_with(ResponseTemplate::new(200).set_body_string("\"ldap-token\""))
            .mount(&mock_server)
            .await;

        let config = test_config(&mock_server.uri()).with_auth_provider("LDAP");
        let session = ApiSession::authenticate(&config, "pw").await.unwrap();
        assert_eq!(session.token, "ldap-token");
    }

    #[tokio::test]
    async fn test_authenticate_rejected() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/CyberArk/Logon"))
            .respond_with(ResponseTemplate::new(403).set_body_string("ITATS004E Authentication failure"))
            .mount(&mock_server)
            .await;

        let err = ApiSession::authenticate(&test_config(&mock_server.uri()), "wrong")
            .await
            .unwrap_err();
        match err {
            ExportError::Auth { status, message } => {
                assert_eq!(status, Some(403));
                assert!(message.contains("ITATS004E"));
            }
            other => panic!("expected auth error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_authenticate_empty_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("\"\""))
            .mount(&mock_server)
            .await;

        let err = ApiSession::authenticate(&test_config(&mock_server.uri()), "pw")
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Auth { .. }));
    }

    #[tokio::test]
    async fn test_authenticate_requires_password() {
        let err = ApiSession::authenticate(&test_config("http://127.0.0.1:9"), "")
            .await
            .unwrap_err();
        assert!(err.is_config());
    }

    #[tokio::test]
    async fn test_authenticate_transport_failure() {
        // Nothing listens on the discard port
        let err = ApiSession::authenticate(&test_config("http://127.0.0.1:9"), "pw")
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_requests_carry_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ping"))
            .and(header("Authorization", "tok-1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let session = ApiSession::from_token(mock_server.uri(), "auditor", "tok-1").unwrap();
        let response = session.get(&session.url("/ping")).send().await.unwrap();
        assert_eq!(response.status().as_u16(), 204);
    }
}
