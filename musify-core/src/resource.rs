//! Result model shared by every one-shot fetch.
//!
//! Fetch operations never raise on expected failure modes. They return a
//! [`FetchedResource`], whose failure variant carries a typed cause plus an
//! optional fallback payload (usually an empty list) for graceful degradation.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Error Kind
// ============================================================================

/// Closed failure taxonomy for fetch operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// The request reached the provider but failed or was rejected.
    NetworkError,
    /// Transport-level failure: no connectivity, DNS, timeout, reset.
    NetworkConnectionFailure,
    /// The provider returned an embedded error envelope despite HTTP success.
    ApiError,
    /// Well-formed but empty body where data was expected.
    EmptyResponse,
    /// Anything not classified above.
    UnknownError,
}

impl ErrorKind {
    /// Returns a human-readable message suitable for an error banner.
    pub fn message(&self) -> &'static str {
        match self {
            Self::NetworkError => "The service could not complete the request",
            Self::NetworkConnectionFailure => "No connection. Check your network",
            Self::ApiError => "The service reported an error",
            Self::EmptyResponse => "Nothing was returned",
            Self::UnknownError => "Something went wrong",
        }
    }

    /// Returns true if a retry affordance should be offered.
    ///
    /// Provider-reported errors and empty payloads are not retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError | Self::NetworkConnectionFailure | Self::UnknownError
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NetworkError => "NETWORK_ERROR",
            Self::NetworkConnectionFailure => "NETWORK_CONNECTION_FAILURE",
            Self::ApiError => "API_ERROR",
            Self::EmptyResponse => "EMPTY_RESPONSE",
            Self::UnknownError => "UNKNOWN_ERROR",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Fetched Resource
// ============================================================================

/// Outcome of a one-shot fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchedResource<T, E = ErrorKind> {
    /// The fetch succeeded.
    Success {
        /// Fetched payload.
        data: T,
    },
    /// The fetch failed.
    Failure {
        /// Why it failed.
        cause: E,
        /// Fallback payload, when one makes sense.
        data: Option<T>,
    },
}

impl<T, E> FetchedResource<T, E> {
    /// Creates a success.
    pub fn success(data: T) -> Self {
        Self::Success { data }
    }

    /// Creates a failure without fallback data.
    pub fn failure(cause: E) -> Self {
        Self::Failure { cause, data: None }
    }

    /// Creates a failure carrying fallback data.
    pub fn failure_with(cause: E, data: T) -> Self {
        Self::Failure {
            cause,
            data: Some(data),
        }
    }

    /// Returns true for the success variant.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns true for the failure variant.
    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// Returns the payload, or the fallback payload of a failure.
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success { data } => Some(data),
            Self::Failure { data, .. } => data.as_ref(),
        }
    }

    /// Consumes the resource and returns the payload or fallback payload.
    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Success { data } => Some(data),
            Self::Failure { data, .. } => data,
        }
    }

    /// Returns the failure cause, if any.
    pub fn cause(&self) -> Option<&E> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { cause, .. } => Some(cause),
        }
    }

    /// Maps the payload (and fallback payload) with `f`.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FetchedResource<U, E> {
        match self {
            Self::Success { data } => FetchedResource::Success { data: f(data) },
            Self::Failure { cause, data } => FetchedResource::Failure {
                cause,
                data: data.map(f),
            },
        }
    }

    /// Replaces a missing fallback payload with `fallback`.
    #[must_use]
    pub fn or_fallback(self, fallback: impl FnOnce() -> T) -> Self {
        match self {
            Self::Failure { cause, data: None } => Self::Failure {
                cause,
                data: Some(fallback()),
            },
            other => other,
        }
    }

    /// Converts into a `Result`, dropping any fallback payload.
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Self::Success { data } => Ok(data),
            Self::Failure { cause, .. } => Err(cause),
        }
    }
}

impl<T: Default, E> FetchedResource<T, E> {
    /// Returns the payload, the fallback payload, or `T::default()`.
    pub fn data_or_default(self) -> T {
        self.into_data().unwrap_or_default()
    }
}

impl<T, E> From<Result<T, E>> for FetchedResource<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(cause) => Self::failure(cause),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_accessors() {
        let resource: FetchedResource<Vec<u8>> = FetchedResource::success(vec![1, 2]);
        assert!(resource.is_success());
        assert_eq!(resource.data(), Some(&vec![1, 2]));
        assert_eq!(resource.cause(), None);
    }

    #[test]
    fn test_failure_with_fallback() {
        let resource: FetchedResource<Vec<u8>> =
            FetchedResource::failure_with(ErrorKind::NetworkError, Vec::new());
        assert!(resource.is_failure());
        assert_eq!(resource.cause(), Some(&ErrorKind::NetworkError));
        assert_eq!(resource.data(), Some(&Vec::new()));
    }

    #[test]
    fn test_or_fallback_only_fills_missing_data() {
        let resource: FetchedResource<Vec<u8>> =
            FetchedResource::failure(ErrorKind::ApiError).or_fallback(Vec::new);
        assert_eq!(resource.data(), Some(&Vec::new()));

        let resource: FetchedResource<Vec<u8>> =
            FetchedResource::failure_with(ErrorKind::ApiError, vec![7]).or_fallback(Vec::new);
        assert_eq!(resource.data(), Some(&vec![7]));

        let resource: FetchedResource<Vec<u8>> =
            FetchedResource::success(vec![1]).or_fallback(Vec::new);
        assert!(resource.is_success());
    }

    #[test]
    fn test_map_keeps_cause() {
        let resource: FetchedResource<Vec<u8>> =
            FetchedResource::failure_with(ErrorKind::EmptyResponse, vec![1, 2, 3]);
        let mapped = resource.map(|v| v.len());
        assert_eq!(mapped.cause(), Some(&ErrorKind::EmptyResponse));
        assert_eq!(mapped.data(), Some(&3));
    }

    #[test]
    fn test_from_result() {
        let ok: FetchedResource<u8> = Ok(5).into();
        assert_eq!(ok.into_result(), Ok(5));

        let err: FetchedResource<u8> = Err(ErrorKind::UnknownError).into();
        assert_eq!(err.into_result(), Err(ErrorKind::UnknownError));
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(ErrorKind::NetworkConnectionFailure.is_retryable());
        assert!(ErrorKind::NetworkError.is_retryable());
        assert!(!ErrorKind::ApiError.is_retryable());
        assert!(!ErrorKind::EmptyResponse.is_retryable());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(ErrorKind::ApiError.to_string(), "API_ERROR");
        assert_eq!(
            ErrorKind::NetworkConnectionFailure.to_string(),
            "NETWORK_CONNECTION_FAILURE"
        );
    }
}
