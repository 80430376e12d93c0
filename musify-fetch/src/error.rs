//! Fetch error types.
//!
//! [`FetchError::kind`] is the single place where an error is classified into
//! the [`ErrorKind`] taxonomy surfaced to callers.

use musify_core::{CoreError, ErrorKind};
use thiserror::Error;

// ============================================================================
// Main Fetch Error
// ============================================================================

/// Error type for fetch operations.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// The provider answered with a non-success HTTP status.
    #[error("Provider returned HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// The provider embedded an error code in a successful response.
    #[error("Provider error code {code}: {message}")]
    Api {
        /// Embedded error code.
        code: i64,
        /// Embedded error message.
        message: String,
    },

    /// Well-formed response without the expected data.
    #[error("Empty response: {0}")]
    EmptyResponse(String),

    /// Credential could not be obtained.
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Credential could not be obtained for a page load. Retried like a
    /// transport failure.
    #[error("Credential unavailable: {0}")]
    Credential(#[source] AuthError),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid response from the provider.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The connectivity probe reported no network.
    #[error("Network unavailable")]
    NoConnectivity,

    /// An error that was already classified upstream.
    #[error("Classified failure: {0}")]
    Classified(ErrorKind),

    /// Core error.
    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

impl FetchError {
    /// Classifies this error into the [`ErrorKind`] taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(err) => err.kind(),
            Self::Status { .. } | Self::NoConnectivity => ErrorKind::NetworkError,
            Self::Api { .. } => ErrorKind::ApiError,
            Self::EmptyResponse(_) => ErrorKind::EmptyResponse,
            Self::Auth(err) => err.kind(),
            Self::Credential(_) => ErrorKind::NetworkConnectionFailure,
            Self::Classified(kind) => *kind,
            Self::Json(_) | Self::InvalidResponse(_) | Self::Core(_) => ErrorKind::UnknownError,
        }
    }

    /// Returns true for transport-level failures that may succeed on retry.
    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::NetworkConnectionFailure
    }

    /// Returns true if the provider rejected the credential.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401, .. })
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(HttpError::from(err))
    }
}

impl From<ErrorKind> for FetchError {
    fn from(kind: ErrorKind) -> Self {
        Self::Classified(kind)
    }
}

// ============================================================================
// HTTP Error
// ============================================================================

/// HTTP-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request error.
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Domain not allowed.
    #[error("Domain not allowed: {0}")]
    DomainNotAllowed(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Timeout.
    #[error("Request timed out")]
    Timeout,
}

impl HttpError {
    /// Classifies this error into the [`ErrorKind`] taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Request(err) if err.is_decode() => ErrorKind::UnknownError,
            Self::Request(err) if err.is_status() => ErrorKind::NetworkError,
            Self::Request(_) | Self::Timeout => ErrorKind::NetworkConnectionFailure,
            Self::DomainNotAllowed(_) | Self::InvalidUrl(_) => ErrorKind::UnknownError,
        }
    }
}

// ============================================================================
// Auth Error
// ============================================================================

/// Error type for credential issuance.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token endpoint rejected the request.
    #[error("Token request rejected with HTTP {status}: {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// The token endpoint could not be reached.
    #[error("Token request failed: {0}")]
    Transport(#[from] HttpError),

    /// The token response could not be parsed.
    #[error("Invalid token response: {0}")]
    Parse(String),

    /// The issued credential has no lifetime left.
    #[error("Issued token has a zero lifetime")]
    ZeroLifetime,

    /// A call needs a credential but no token repository is configured.
    #[error("No credentials configured")]
    NotConfigured,
}

impl AuthError {
    /// Classifies this error into the [`ErrorKind`] taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Rejected { .. } => ErrorKind::NetworkError,
            Self::Transport(err) => err.kind(),
            Self::Parse(_) | Self::ZeroLifetime | Self::NotConfigured => ErrorKind::UnknownError,
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(HttpError::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_network_error() {
        let err = FetchError::Status {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::NetworkError);
        assert!(!err.is_transient());
    }

    #[test]
    fn test_embedded_code_is_api_error() {
        let err = FetchError::Api {
            code: 5,
            message: "bad client".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::ApiError);
    }

    #[test]
    fn test_rejected_token_is_network_error() {
        let err = FetchError::from(AuthError::Rejected {
            status: 401,
            message: "invalid_client".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::NetworkError);
    }

    #[test]
    fn test_credential_failure_is_transient() {
        for cause in [
            AuthError::Rejected {
                status: 401,
                message: "invalid_client".to_string(),
            },
            AuthError::NotConfigured,
            AuthError::ZeroLifetime,
        ] {
            let err = FetchError::Credential(cause);
            assert_eq!(err.kind(), ErrorKind::NetworkConnectionFailure);
            assert!(err.is_transient());
        }
    }

    #[test]
    fn test_timeout_is_transient() {
        let err = FetchError::from(HttpError::Timeout);
        assert_eq!(err.kind(), ErrorKind::NetworkConnectionFailure);
        assert!(err.is_transient());

        let err = FetchError::from(AuthError::Transport(HttpError::Timeout));
        assert!(err.is_transient());
    }

    #[test]
    fn test_classified_kind_is_preserved() {
        for kind in [
            ErrorKind::NetworkError,
            ErrorKind::NetworkConnectionFailure,
            ErrorKind::ApiError,
            ErrorKind::EmptyResponse,
            ErrorKind::UnknownError,
        ] {
            assert_eq!(FetchError::from(kind).kind(), kind);
        }
    }

    #[test]
    fn test_parse_errors_are_unknown() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        assert_eq!(FetchError::from(json_err).kind(), ErrorKind::UnknownError);
        assert_eq!(
            FetchError::InvalidResponse("x".to_string()).kind(),
            ErrorKind::UnknownError
        );
    }

    #[test]
    fn test_offline_is_network_error() {
        assert_eq!(FetchError::NoConnectivity.kind(), ErrorKind::NetworkError);
    }

    #[test]
    fn test_unauthorized() {
        let err = FetchError::Status {
            status: 401,
            message: String::new(),
        };
        assert!(err.is_unauthorized());
    }
}
