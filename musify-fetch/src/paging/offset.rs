//! Offset-windowed paging.
//!
//! The key is the item offset of the page start. A page is requested as
//! `(offset, limit)` from a [`PageProvider`], which hides the provider's query
//! parameters and response envelope.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use musify_core::{Page, PageRequest};

use super::source::{LoadResult, PagingSource, credential_for};
use crate::error::FetchError;
use crate::retry::RetryStrategy;
use crate::token::{BearerToken, TokenRepository};

/// One provider endpoint that can be read in `(offset, limit)` windows.
#[async_trait]
pub trait PageProvider: Send + Sync {
    /// Raw entry as delivered by the provider, already flattened.
    type Raw: Send;
    /// Domain item.
    type Item: Send + Sync + 'static;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Whether calls need a bearer token.
    fn requires_auth(&self) -> bool {
        false
    }

    /// Fetches the raw entries of one window.
    ///
    /// Must fail (not return partial data) when the provider signals an
    /// error, whether by HTTP status or inside the body.
    async fn fetch_page(
        &self,
        token: Option<&BearerToken>,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<Self::Raw>, FetchError>;

    /// Maps a raw entry to a domain item, or `None` to drop it.
    fn map_item(&self, raw: Self::Raw) -> Option<Self::Item>;
}

/// Paging source over a [`PageProvider`].
pub struct OffsetPagingSource<P> {
    provider: P,
    tokens: Option<Arc<dyn TokenRepository>>,
    retry: RetryStrategy,
}

impl<P: PageProvider> OffsetPagingSource<P> {
    /// Creates a source using the paging retry policy.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            tokens: None,
            retry: RetryStrategy::paging(),
        }
    }

    /// Supplies credentials for providers that require auth.
    #[must_use]
    pub fn with_tokens(mut self, tokens: Arc<dyn TokenRepository>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryStrategy) -> Self {
        self.retry = retry;
        self
    }

    /// The wrapped provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    async fn fetch_raw(&self, offset: u32, limit: u32) -> Result<Vec<P::Raw>, FetchError> {
        self.retry
            .run(self.provider.name(), || async move {
                let token =
                    credential_for(self.tokens.as_ref(), self.provider.requires_auth()).await?;
                self.provider.fetch_page(token.as_ref(), offset, limit).await
            })
            .await
    }
}

#[async_trait]
impl<P: PageProvider> PagingSource for OffsetPagingSource<P> {
    type Key = u32;
    type Item = P::Item;

    async fn load(&self, request: PageRequest<u32>) -> LoadResult<u32, P::Item> {
        let offset = request.key.unwrap_or(0);
        let limit = request.load_size;

        let raw = match self.fetch_raw(offset, limit).await {
            Ok(raw) => raw,
            Err(e) => {
                if e.is_unauthorized() {
                    if let Some(tokens) = &self.tokens {
                        tokens.invalidate().await;
                    }
                }
                warn!(provider = self.provider.name(), offset, error = %e, "Page load failed");
                return Err(e);
            }
        };

        let fetched = raw.len();
        let items: Vec<P::Item> = raw
            .into_iter()
            .filter_map(|entry| self.provider.map_item(entry))
            .collect();

        // End of list is an empty page after filtering, not a total count.
        let prev_key = (offset > 0).then(|| offset.saturating_sub(limit));
        let next_key = if items.is_empty() {
            None
        } else {
            offset.checked_add(limit)
        };

        debug!(
            provider = self.provider.name(),
            offset,
            limit,
            fetched,
            kept = items.len(),
            "Page loaded"
        );
        Ok(Page::new(items, prev_key, next_key))
    }
}
