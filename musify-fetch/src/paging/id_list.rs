//! Paging over a fixed list of ids.
//!
//! Used when a provider only offers "fetch by id". The key is an index into
//! the id list and every page holds the item for exactly one id.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use musify_core::{Page, PageRequest};

use super::source::{LoadResult, PagingSource, credential_for};
use crate::error::FetchError;
use crate::retry::RetryStrategy;
use crate::token::{BearerToken, TokenRepository};

/// Resolves single ids to domain items.
#[async_trait]
pub trait ItemLookup: Send + Sync {
    /// Domain item.
    type Item: Send + Sync + 'static;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Whether calls need a bearer token.
    fn requires_auth(&self) -> bool {
        false
    }

    /// Fetches the item for `id`, or `None` if the provider has no such item.
    async fn fetch_item(
        &self,
        token: Option<&BearerToken>,
        id: &str,
    ) -> Result<Option<Self::Item>, FetchError>;
}

/// Paging source yielding one item per id.
pub struct IdListPagingSource<L> {
    lookup: L,
    ids: Vec<String>,
    tokens: Option<Arc<dyn TokenRepository>>,
    retry: RetryStrategy,
}

impl<L: ItemLookup> IdListPagingSource<L> {
    /// Creates a source over `ids`, dropping repeated ids.
    pub fn new<I, S>(lookup: L, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let ids = ids
            .into_iter()
            .map(Into::into)
            .filter(|id: &String| seen.insert(id.clone()))
            .collect();

        Self {
            lookup,
            ids,
            tokens: None,
            retry: RetryStrategy::paging(),
        }
    }

    /// Supplies credentials for lookups that require auth.
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

    /// The deduplicated ids in page order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// The wrapped lookup.
    pub fn lookup(&self) -> &L {
        &self.lookup
    }
}

#[async_trait]
impl<L: ItemLookup> PagingSource for IdListPagingSource<L> {
    type Key = usize;
    type Item = L::Item;

    async fn load(&self, request: PageRequest<usize>) -> LoadResult<usize, L::Item> {
        let index = request.key.unwrap_or(0);
        let Some(id) = self.ids.get(index) else {
            return Ok(Page::empty());
        };

        let found = self
            .retry
            .run(self.lookup.name(), || async move {
                let token =
                    credential_for(self.tokens.as_ref(), self.lookup.requires_auth()).await?;
                self.lookup.fetch_item(token.as_ref(), id).await
            })
            .await
            .inspect_err(|e| {
                warn!(lookup = self.lookup.name(), id = %id, error = %e, "Item load failed");
            })?;

        let Some(item) = found else {
            warn!(lookup = self.lookup.name(), id = %id, "Unknown id");
            return Err(FetchError::EmptyResponse(format!("No item for id {id}")));
        };

        let prev_key = index.checked_sub(1);
        let next_key = (index + 1 < self.ids.len()).then_some(index + 1);
        debug!(lookup = self.lookup.name(), index, total = self.ids.len(), "Item loaded");
        Ok(Page::new(vec![item], prev_key, next_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AuthError, HttpError};
    use musify_core::{ErrorKind, LoadDirection, PagingState};
    use std::sync::atomic::{AtomicU32, Ordering};

    struct MapLookup {
        calls: AtomicU32,
        fail: bool,
        auth: bool,
    }

    impl MapLookup {
        fn new() -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail: false,
                auth: false,
            }
        }
    }

    struct RejectingTokens {
        attempts: AtomicU32,
    }

    #[async_trait]
    impl TokenRepository for RejectingTokens {
        async fn get_valid_bearer_token(&self) -> Result<BearerToken, AuthError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(AuthError::Rejected {
                status: 500,
                message: "server_error".to_string(),
            })
        }

        async fn invalidate(&self) {}
    }

    #[async_trait]
    impl ItemLookup for MapLookup {
        type Item = String;

        fn name(&self) -> &'static str {
            "map"
        }

        fn requires_auth(&self) -> bool {
            self.auth
        }

        async fn fetch_item(
            &self,
            _token: Option<&BearerToken>,
            id: &str,
        ) -> Result<Option<String>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(FetchError::from(HttpError::Timeout));
            }
            Ok((id != "404").then(|| format!("track-{id}")))
        }
    }

    fn at(key: Option<usize>) -> PageRequest<usize> {
        PageRequest::at(key, 1, LoadDirection::Append)
    }

    #[test]
    fn test_ids_deduplicated_in_order() {
        let source = IdListPagingSource::new(MapLookup::new(), ["3", "1", "3", "2", "1"]);
        assert_eq!(source.ids(), ["3", "1", "2"]);
    }

    #[tokio::test]
    async fn test_walks_ids_one_per_page() {
        let source = IdListPagingSource::new(MapLookup::new(), ["1", "2", "3"]);
        let mut key = None;
        let mut items = Vec::new();

        loop {
            let page = source.load(at(key)).await.unwrap();
            assert_eq!(page.prev_key, key.and_then(|k: usize| k.checked_sub(1)));
            items.extend(page.items);
            key = page.next_key;
            if key.is_none() {
                break;
            }
        }

        assert_eq!(items, vec!["track-1", "track-2", "track-3"]);
    }

    #[tokio::test]
    async fn test_past_end_is_empty_terminal_page() {
        let source = IdListPagingSource::new(MapLookup::new(), ["1"]);
        let page = source.load(at(Some(5))).await.unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.prev_key, None);
        assert_eq!(page.next_key, None);
        assert_eq!(source.lookup().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_id_list() {
        let source = IdListPagingSource::new(MapLookup::new(), Vec::<String>::new());
        let page = source.load(at(None)).await.unwrap();
        assert!(page.is_last());
    }

    #[tokio::test]
    async fn test_unknown_id_is_empty_response() {
        let source = IdListPagingSource::new(MapLookup::new(), ["1", "404"]);
        let err = source.load(at(Some(1))).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyResponse);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_uses_retry_bound() {
        let mut lookup = MapLookup::new();
        lookup.fail = true;
        let source = IdListPagingSource::new(lookup, ["1"]);

        let err = source.load(at(None)).await.unwrap_err();

        assert!(err.is_transient());
        assert_eq!(source.lookup().calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_rejection_uses_retry_bound() {
        let mut lookup = MapLookup::new();
        lookup.auth = true;
        let tokens = Arc::new(RejectingTokens {
            attempts: AtomicU32::new(0),
        });
        let source = IdListPagingSource::new(lookup, ["1"]).with_tokens(tokens.clone());

        let err = source.load(at(None)).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NetworkConnectionFailure);
        assert_eq!(tokens.attempts.load(Ordering::SeqCst), 4);
        assert_eq!(source.lookup().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_refresh_key_returns_anchor_index() {
        let source = IdListPagingSource::new(MapLookup::new(), ["1", "2", "3"]);
        let page = source.load(at(Some(1))).await.unwrap();
        let state = PagingState::new(vec![page], Some(0));
        assert_eq!(source.refresh_key(&state), Some(1));
    }
}
