//! Token issuance.
//!
//! A [`TokenIssuer`] exchanges a [`TokenGrant`] for an [`AccessTokenResponse`].
//! The HTTP implementation posts a form body with a pre-computed
//! `Authorization` secret, as the OAuth client-credentials flow expects.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::BearerToken;
use crate::error::AuthError;
use crate::host::HttpClient;
use crate::host::http::decode_json;

// ============================================================================
// Grant / Response
// ============================================================================

/// The grant presented to the token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub enum TokenGrant {
    /// App-only access.
    ClientCredentials,
    /// Exchange of an authorization code.
    AuthorizationCode {
        /// Authorization code from the redirect.
        code: String,
        /// Redirect URI used to obtain the code.
        redirect_uri: String,
    },
    /// Renewal of an earlier credential.
    RefreshToken(String),
}

impl TokenGrant {
    /// The `grant_type` form value.
    pub fn grant_type(&self) -> &'static str {
        match self {
            Self::ClientCredentials => "client_credentials",
            Self::AuthorizationCode { .. } => "authorization_code",
            Self::RefreshToken(_) => "refresh_token",
        }
    }

    /// Form-encoded body fields.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("grant_type", self.grant_type().to_string())];
        match self {
            Self::ClientCredentials => {}
            Self::AuthorizationCode { code, redirect_uri } => {
                fields.push(("code", code.clone()));
                fields.push(("redirect_uri", redirect_uri.clone()));
            }
            Self::RefreshToken(token) => fields.push(("refresh_token", token.clone())),
        }
        fields
    }
}

impl std::fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TokenGrant({})", self.grant_type())
    }
}

/// Token endpoint response body.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenResponse {
    /// The access token.
    pub access_token: String,
    /// Lifetime in seconds.
    pub expires_in: u64,
    /// Token type, normally `Bearer`.
    #[serde(default)]
    pub token_type: String,
    /// Refresh token, if issued.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl AccessTokenResponse {
    /// Builds a credential issued at `issued_at`.
    pub fn into_bearer(self, issued_at: DateTime<Utc>) -> BearerToken {
        BearerToken::new(
            self.access_token,
            issued_at,
            self.expires_in,
            self.refresh_token,
        )
    }
}

/// Builds the `Basic base64(id:secret)` authorization value.
pub fn client_secret_header(client_id: &str, client_secret: &str) -> String {
    let encoded = STANDARD.encode(format!("{client_id}:{client_secret}"));
    format!("Basic {encoded}")
}

// ============================================================================
// Issuer
// ============================================================================

/// Exchanges grants for access tokens.
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    /// Requests a new token for `grant`.
    async fn issue(&self, grant: &TokenGrant) -> Result<AccessTokenResponse, AuthError>;
}

/// Issuer that calls an OAuth token endpoint over HTTP.
#[derive(Clone)]
pub struct HttpTokenIssuer {
    http: Arc<HttpClient>,
    token_url: String,
    authorization: String,
}

impl HttpTokenIssuer {
    /// Creates an issuer for `token_url` with a pre-computed secret.
    pub fn new(http: Arc<HttpClient>, token_url: impl Into<String>, authorization: String) -> Self {
        Self {
            http,
            token_url: token_url.into(),
            authorization,
        }
    }

    /// Creates an issuer authenticating with client id and secret.
    pub fn with_client_credentials(
        http: Arc<HttpClient>,
        token_url: impl Into<String>,
        client_id: &str,
        client_secret: &str,
    ) -> Self {
        Self::new(
            http,
            token_url,
            client_secret_header(client_id, client_secret),
        )
    }
}

#[async_trait]
impl TokenIssuer for HttpTokenIssuer {
    #[instrument(skip(self), fields(url = %self.token_url))]
    async fn issue(&self, grant: &TokenGrant) -> Result<AccessTokenResponse, AuthError> {
        let response = self
            .http
            .post_form_with_auth(&self.token_url, &grant.form_fields(), &self.authorization)
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = %status, "Token request rejected");
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let token: AccessTokenResponse = decode_json(response)
            .await
            .map_err(|e| AuthError::Parse(e.to_string()))?;
        debug!(expires_in = token.expires_in, token_type = %token.token_type, "Token issued");
        Ok(token)
    }
}

impl std::fmt::Debug for HttpTokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTokenIssuer")
            .field("token_url", &self.token_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_client_secret_header() {
        // base64("id:secret")
        assert_eq!(client_secret_header("id", "secret"), "Basic aWQ6c2VjcmV0");
    }

    #[test]
    fn test_form_fields() {
        let grant = TokenGrant::AuthorizationCode {
            code: "c0de".to_string(),
            redirect_uri: "musify://callback".to_string(),
        };
        let fields = grant.form_fields();
        assert_eq!(fields[0], ("grant_type", "authorization_code".to_string()));
        assert!(fields.contains(&("code", "c0de".to_string())));
        assert!(fields.contains(&("redirect_uri", "musify://callback".to_string())));

        let fields = TokenGrant::RefreshToken("r".to_string()).form_fields();
        assert_eq!(fields[1], ("refresh_token", "r".to_string()));
    }

    #[tokio::test]
    async fn test_http_issuer_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .and(header("authorization", "Basic aWQ6c2VjcmV0"))
            .and(body_string_contains("grant_type=client_credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"access_token":"tok","expires_in":3600,"token_type":"Bearer"}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let issuer = HttpTokenIssuer::with_client_credentials(
            Arc::new(HttpClient::new()),
            format!("{}/api/token", server.uri()),
            "id",
            "secret",
        );
        let response = issuer.issue(&TokenGrant::ClientCredentials).await.unwrap();

        assert_eq!(response.access_token, "tok");
        assert_eq!(response.expires_in, 3600);
        assert!(response.refresh_token.is_none());
    }

    #[tokio::test]
    async fn test_http_issuer_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"error":"invalid_client"}"#))
            .mount(&server)
            .await;

        let issuer = HttpTokenIssuer::with_client_credentials(
            Arc::new(HttpClient::new()),
            server.uri(),
            "id",
            "wrong",
        );
        let err = issuer.issue(&TokenGrant::ClientCredentials).await.unwrap_err();

        assert!(matches!(err, AuthError::Rejected { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_http_issuer_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let issuer = HttpTokenIssuer::new(Arc::new(HttpClient::new()), server.uri(), "Basic x".to_string());
        let err = issuer.issue(&TokenGrant::ClientCredentials).await.unwrap_err();

        assert!(matches!(err, AuthError::Parse(_)));
    }
}
