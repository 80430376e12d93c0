//! HTTP client with tracing and domain allowlist.
//!
//! This module provides a wrapped HTTP client that adds:
//! - Request/response tracing
//! - Domain allowlist for security
//! - JSON helpers that separate transport, status, and parse failures

use reqwest::{Client, Response, StatusCode, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::{FetchError, HttpError};

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User agent string for Musify.
const USER_AGENT: &str = concat!("Musify/", env!("CARGO_PKG_VERSION"));

/// Longest error body kept in an error message.
const MAX_ERROR_BODY: usize = 512;

// ============================================================================
// HTTP Client
// ============================================================================

/// HTTP client wrapper with tracing and domain allowlist.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    allowed_domains: Option<Vec<String>>,
}

impl HttpClient {
    /// Creates a new HTTP client with default settings.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a new HTTP client with a custom timeout.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built. This only happens when the
    /// system's TLS configuration is broken, in which case no network
    /// operation can succeed.
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|e| {
                panic!(
                    "Failed to create HTTP client: {e}. \
                    This usually indicates a broken TLS/SSL configuration."
                )
            });

        Self {
            inner: client,
            allowed_domains: None,
        }
    }

    /// Restricts requests to the given domains and their subdomains.
    #[must_use]
    pub fn with_allowed_domains(mut self, domains: Vec<String>) -> Self {
        self.allowed_domains = Some(domains);
        self
    }

    /// Checks if a URL's domain is allowed.
    fn is_domain_allowed(&self, url: &str) -> Result<(), HttpError> {
        let Some(ref allowed) = self.allowed_domains else {
            return Ok(());
        };

        let parsed = Url::parse(url).map_err(|e| HttpError::InvalidUrl(e.to_string()))?;

        let host = parsed
            .host_str()
            .ok_or_else(|| HttpError::InvalidUrl("No host in URL".to_string()))?;

        let allowed = allowed
            .iter()
            .any(|domain| host == domain || host.ends_with(&format!(".{domain}")));

        if allowed {
            Ok(())
        } else {
            Err(HttpError::DomainNotAllowed(host.to_string()))
        }
    }

    /// Performs a GET request and decodes a JSON body.
    ///
    /// `bearer` is sent verbatim as the `Authorization` header.
    #[instrument(skip(self, query, bearer), fields(url = %url))]
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        bearer: Option<&str>,
    ) -> Result<T, FetchError> {
        self.is_domain_allowed(url)?;
        debug!("GET request");

        let mut request = self.inner.get(url).query(query);
        if let Some(auth) = bearer {
            request = request.header(header::AUTHORIZATION, auth);
        }

        let response = request.send().await.map_err(map_transport)?;
        debug!(status = %response.status(), "Response received");

        let response = ensure_success(response).await?;
        decode_json(response).await
    }

    /// Performs a POST request with form data and an `Authorization` header.
    #[instrument(skip(self, form, auth_header), fields(url = %url))]
    pub async fn post_form_with_auth<F: Serialize + ?Sized>(
        &self,
        url: &str,
        form: &F,
        auth_header: &str,
    ) -> Result<Response, HttpError> {
        self.is_domain_allowed(url)?;
        debug!("POST request with form data");

        let response = self
            .inner
            .post(url)
            .header(header::AUTHORIZATION, auth_header)
            .form(form)
            .send()
            .await
            .map_err(map_transport)?;
        debug!(status = %response.status(), "Response received");
        Ok(response)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Host part of `url`, for building an allowlist from endpoint URLs.
pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url).ok()?.host_str().map(str::to_string)
}

// ============================================================================
// Response Helpers
// ============================================================================

fn map_transport(err: reqwest::Error) -> HttpError {
    if err.is_timeout() {
        HttpError::Timeout
    } else {
        HttpError::Request(err)
    }
}

/// Converts a non-success status into [`FetchError::Status`].
pub async fn ensure_success(response: Response) -> Result<Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        warn!(retry_after = ?response.retry_after_secs(), "Rate limited");
    }

    let body = response.text().await.unwrap_or_default();
    Err(FetchError::Status {
        status: status.as_u16(),
        message: truncate_body(&body, status),
    })
}

/// Decodes a JSON body, distinguishing an empty body from a malformed one.
pub async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, FetchError> {
    let bytes = response.bytes().await.map_err(map_transport)?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(FetchError::EmptyResponse("empty body".to_string()));
    }
    Ok(serde_json::from_slice(&bytes)?)
}

fn truncate_body(body: &str, status: StatusCode) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Unknown status")
            .to_string();
    }
    trimmed.chars().take(MAX_ERROR_BODY).collect()
}

// ============================================================================
// Response Extensions
// ============================================================================

/// Extension trait for Response handling.
pub trait ResponseExt {
    /// Get the Retry-After header value in seconds.
    fn retry_after_secs(&self) -> Option<u64>;
}

impl ResponseExt for Response {
    fn retry_after_secs(&self) -> Option<u64> {
        self.headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use musify_core::ErrorKind;
    use serde_json::Value;
    use wiremock::matchers::{header as header_eq, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_domain_allowlist() {
        let client = HttpClient::new().with_allowed_domains(vec![
            "api.spotify.com".to_string(),
            "jamendo.com".to_string(),
        ]);

        assert!(client.is_domain_allowed("https://api.spotify.com/v1/search").is_ok());
        assert!(client.is_domain_allowed("https://api.jamendo.com/v3.0/albums").is_ok());
        assert!(client.is_domain_allowed("https://evil.com/steal").is_err());
        assert!(client.is_domain_allowed("not-a-valid-url").is_err());
    }

    #[test]
    fn test_host_of() {
        assert_eq!(host_of("https://api.spotify.com/v1").as_deref(), Some("api.spotify.com"));
        assert_eq!(host_of("http://127.0.0.1:8080/x").as_deref(), Some("127.0.0.1"));
        assert_eq!(host_of("not a url"), None);
    }

    #[tokio::test]
    async fn test_disallowed_domain_fails_before_request() {
        let client = HttpClient::new().with_allowed_domains(vec!["api.jamendo.com".to_string()]);
        let err = client
            .get_json::<serde_json::Value>("https://tracker.example/collect", &[], None)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Http(HttpError::DomainNotAllowed(ref host)) if host == "tracker.example"));
    }

    #[test]
    fn test_no_domain_restrictions() {
        let client = HttpClient::new();
        assert!(client.is_domain_allowed("https://any.domain.com").is_ok());
    }

    #[tokio::test]
    async fn test_get_json_sends_query_and_auth() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("q", "daft punk"))
            .and(header_eq("authorization", "Bearer abc"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
            .mount(&server)
            .await;

        let client = HttpClient::new();
        let value: Value = client
            .get_json(
                &format!("{}/v1/search", server.uri()),
                &[("q", "daft punk".to_string())],
                Some("Bearer abc"),
            )
            .await
            .unwrap();

        assert_eq!(value["ok"], Value::Bool(true));
    }

    #[tokio::test]
    async fn test_get_json_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
            .mount(&server)
            .await;

        let err = HttpClient::new()
            .get_json::<Value>(&server.uri(), &[], None)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 404, ref message } if message == "missing"));
        assert_eq!(err.kind(), ErrorKind::NetworkError);
    }

    #[tokio::test]
    async fn test_get_json_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let err = HttpClient::new()
            .get_json::<Value>(&server.uri(), &[], None)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::EmptyResponse);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_connection_failure() {
        let err = HttpClient::with_timeout(Duration::from_secs(2))
            .get_json::<Value>("http://127.0.0.1:9/", &[], None)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NetworkConnectionFailure);
        assert!(err.is_transient());
    }
}
