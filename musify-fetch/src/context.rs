//! Fetch context providing access to host APIs.
//!
//! The context is shared by every provider adapter and repository facade. It
//! bundles the HTTP client, the connectivity probe, and fetch settings.

use std::sync::Arc;
use std::time::Duration;

use crate::host::http::DEFAULT_TIMEOUT_SECS;
use crate::host::{ConnectivityProbe, HttpClient, TcpConnectivityProbe};
use crate::paging::PagingConfig;
use crate::retry::RetryStrategy;

// ============================================================================
// Fetch Settings
// ============================================================================

/// Settings for fetch operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    /// Timeout for a single HTTP request.
    pub timeout: Duration,
    /// Page sizing for paged streams.
    pub paging: PagingConfig,
    /// Retry policy for page loads.
    pub retry: RetryStrategy,
    /// Whether the display warrants high-resolution artwork.
    pub high_density_display: bool,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            paging: PagingConfig::default(),
            retry: RetryStrategy::paging(),
            high_density_display: false,
        }
    }
}

impl FetchSettings {
    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.paging = PagingConfig::new(page_size);
        self
    }
}

// ============================================================================
// Fetch Context
// ============================================================================

/// Host APIs shared by provider adapters and facades.
#[derive(Clone)]
pub struct FetchContext {
    /// HTTP client with tracing.
    pub http: Arc<HttpClient>,
    /// Network availability probe.
    pub connectivity: Arc<dyn ConnectivityProbe>,
    /// Fetch settings.
    pub settings: FetchSettings,
}

impl FetchContext {
    /// Creates a context with default host API implementations.
    pub fn new() -> Self {
        Self::with_settings(FetchSettings::default())
    }

    /// Creates a context with custom settings.
    pub fn with_settings(settings: FetchSettings) -> Self {
        Self {
            http: Arc::new(HttpClient::with_timeout(settings.timeout)),
            connectivity: Arc::new(TcpConnectivityProbe::default()),
            settings,
        }
    }

    /// Creates a builder for customizing the context.
    pub fn builder() -> FetchContextBuilder {
        FetchContextBuilder::new()
    }

    /// Returns true if the connectivity probe reports a network.
    pub async fn is_online(&self) -> bool {
        self.connectivity.is_online().await
    }
}

impl Default for FetchContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FetchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchContext")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Fetch Context Builder
// ============================================================================

/// Builder for constructing a `FetchContext`.
#[derive(Default)]
pub struct FetchContextBuilder {
    http: Option<Arc<HttpClient>>,
    connectivity: Option<Arc<dyn ConnectivityProbe>>,
    settings: FetchSettings,
}

impl FetchContextBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP client.
    #[must_use]
    pub fn http(mut self, http: Arc<HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    /// Sets the connectivity probe.
    #[must_use]
    pub fn connectivity(mut self, probe: Arc<dyn ConnectivityProbe>) -> Self {
        self.connectivity = Some(probe);
        self
    }

    /// Sets the fetch settings.
    #[must_use]
    pub fn settings(mut self, settings: FetchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.settings.timeout = timeout;
        self
    }

    /// Sets the page size.
    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.settings.paging = PagingConfig::new(page_size);
        self
    }

    /// Sets the page-load retry policy.
    #[must_use]
    pub fn retry(mut self, retry: RetryStrategy) -> Self {
        self.settings.retry = retry;
        self
    }

    /// Builds the fetch context.
    pub fn build(self) -> FetchContext {
        let timeout = self.settings.timeout;
        FetchContext {
            http: self
                .http
                .unwrap_or_else(|| Arc::new(HttpClient::with_timeout(timeout))),
            connectivity: self
                .connectivity
                .unwrap_or_else(|| Arc::new(TcpConnectivityProbe::default())),
            settings: self.settings,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::StaticConnectivity;

    #[test]
    fn test_context_builder() {
        let ctx = FetchContext::builder()
            .timeout(Duration::from_secs(60))
            .page_size(50)
            .retry(RetryStrategy::no_retry())
            .build();

        assert_eq!(ctx.settings.timeout, Duration::from_secs(60));
        assert_eq!(ctx.settings.paging.page_size, 50);
        assert_eq!(ctx.settings.retry.max_retries, 0);
    }

    #[test]
    fn test_default_settings() {
        let settings = FetchSettings::default();
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert_eq!(settings.paging.page_size, 20);
        assert_eq!(settings.retry, RetryStrategy::paging());
    }

    #[tokio::test]
    async fn test_injected_connectivity() {
        let ctx = FetchContext::builder()
            .connectivity(Arc::new(StaticConnectivity::offline()))
            .build();
        assert!(!ctx.is_online().await);
    }
}
