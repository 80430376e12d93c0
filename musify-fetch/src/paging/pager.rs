//! Drives a paging source through its load-state machine.
//!
//! ```text
//! Fresh ─► Loading ─► Loaded { has_next, has_previous }
//!             ▲    └► Errored { retryable }
//!             └── load_next / load_previous / retry / invalidate
//! ```
//!
//! Loads take `&mut self`, so one pager never has two loads in flight and
//! page N+1 is only requested after page N was delivered.

use futures::Stream;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, warn};

use musify_core::{ErrorKind, LoadDirection, Page, PageRequest, PagingState};

use super::source::PagingSource;
use crate::error::FetchError;

/// Default number of items per page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

// ============================================================================
// Config / State
// ============================================================================

/// Page sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingConfig {
    /// Items per append/prepend load.
    pub page_size: u32,
    /// Items for refresh loads.
    pub initial_load_size: u32,
}

impl PagingConfig {
    /// Uses `page_size` for every load.
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size,
            initial_load_size: page_size,
        }
    }

    /// Sets a different size for refresh loads.
    #[must_use]
    pub fn with_initial_load_size(mut self, size: u32) -> Self {
        self.initial_load_size = size;
        self
    }

    fn size_for(&self, direction: LoadDirection) -> u32 {
        match direction {
            LoadDirection::Refresh => self.initial_load_size,
            LoadDirection::Prepend | LoadDirection::Append => self.page_size,
        }
    }
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// Observable load state of a pager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing loaded yet.
    Fresh,
    /// A load is in flight.
    Loading(LoadDirection),
    /// The last load succeeded.
    Loaded {
        /// More pages after the loaded window.
        has_next: bool,
        /// More pages before the loaded window.
        has_previous: bool,
    },
    /// The last load failed.
    Errored {
        /// Which load failed.
        direction: LoadDirection,
        /// Classified cause.
        kind: ErrorKind,
        /// Whether to offer a retry affordance.
        retryable: bool,
    },
}

/// A failed page load.
#[derive(Debug, Error)]
#[error("{direction:?} load failed ({kind}): {source}")]
pub struct PagingError {
    /// Which load failed.
    pub direction: LoadDirection,
    /// Classified cause.
    pub kind: ErrorKind,
    /// Whether to offer a retry affordance.
    pub retryable: bool,
    /// Underlying error.
    #[source]
    pub source: FetchError,
}

impl PagingError {
    fn new(direction: LoadDirection, source: FetchError) -> Self {
        let kind = source.kind();
        Self {
            direction,
            kind,
            retryable: kind.is_retryable(),
            source,
        }
    }
}

// ============================================================================
// Pager
// ============================================================================

/// Holds the loaded window of one paging source.
pub struct Pager<S: PagingSource> {
    source: S,
    config: PagingConfig,
    pages: Vec<Page<S::Key, S::Item>>,
    anchor: Option<usize>,
    failed: Option<PageRequest<S::Key>>,
    state: watch::Sender<LoadState>,
}

impl<S: PagingSource> Pager<S> {
    /// Creates a pager. Nothing is loaded until [`Pager::refresh`].
    pub fn new(source: S, config: PagingConfig) -> Self {
        let (state, _) = watch::channel(LoadState::Fresh);
        Self {
            source,
            config,
            pages: Vec::new(),
            anchor: None,
            failed: None,
            state,
        }
    }

    /// Current load state.
    pub fn state(&self) -> LoadState {
        self.state.borrow().clone()
    }

    /// Subscribes to load-state changes.
    pub fn subscribe(&self) -> watch::Receiver<LoadState> {
        self.state.subscribe()
    }

    /// Loaded pages in order.
    pub fn pages(&self) -> &[Page<S::Key, S::Item>] {
        &self.pages
    }

    /// Loaded items in order.
    pub fn items(&self) -> impl Iterator<Item = &S::Item> {
        self.pages.iter().flat_map(|page| page.items.iter())
    }

    /// Number of loaded items.
    pub fn item_count(&self) -> usize {
        self.pages.iter().map(|page| page.items.len()).sum()
    }

    /// Returns true if a page after the loaded window exists.
    pub fn has_next(&self) -> bool {
        self.pages.last().is_some_and(|page| page.next_key.is_some())
    }

    /// Records the most recently visible item index.
    pub fn set_anchor(&mut self, position: usize) {
        self.anchor = Some(position);
    }

    /// Drops everything and loads the first page.
    pub async fn refresh(&mut self) -> Result<usize, PagingError> {
        self.pages.clear();
        self.anchor = None;
        self.load(PageRequest::at(None, self.config.initial_load_size, LoadDirection::Refresh))
            .await
    }

    /// Loads the page after the window. Returns `Ok(0)` at the end.
    pub async fn load_next(&mut self) -> Result<usize, PagingError> {
        let Some(last) = self.pages.last() else {
            return self.refresh().await;
        };
        let Some(key) = last.next_key else {
            return Ok(0);
        };
        self.load(PageRequest::at(Some(key), self.config.page_size, LoadDirection::Append))
            .await
    }

    /// Loads the page before the window. Returns `Ok(0)` at the start.
    pub async fn load_previous(&mut self) -> Result<usize, PagingError> {
        let Some(key) = self.pages.first().and_then(|page| page.prev_key) else {
            return Ok(0);
        };
        self.load(PageRequest::at(Some(key), self.config.page_size, LoadDirection::Prepend))
            .await
    }

    /// Re-issues the load that failed last. Returns `Ok(0)` if none failed.
    pub async fn retry(&mut self) -> Result<usize, PagingError> {
        let Some(request) = self.failed.take() else {
            return Ok(0);
        };
        self.load(request).await
    }

    /// Drops the window and reloads around the anchor.
    pub async fn invalidate(&mut self) -> Result<usize, PagingError> {
        let pages = std::mem::take(&mut self.pages);
        let snapshot = PagingState::new(pages, self.anchor);
        let key = self.source.refresh_key(&snapshot);
        debug!(?key, anchor = ?self.anchor, "Invalidated, reloading");
        self.anchor = None;
        self.load(PageRequest::at(key, self.config.initial_load_size, LoadDirection::Refresh))
            .await
    }

    async fn load(&mut self, request: PageRequest<S::Key>) -> Result<usize, PagingError> {
        let direction = request.direction;
        self.state.send_replace(LoadState::Loading(direction));

        match self.source.load(request).await {
            Ok(page) => {
                let count = page.items.len();
                match direction {
                    LoadDirection::Refresh => {
                        self.pages.clear();
                        self.pages.push(page);
                    }
                    LoadDirection::Prepend => {
                        self.anchor = self.anchor.map(|a| a + count);
                        self.pages.insert(0, page);
                    }
                    LoadDirection::Append => self.pages.push(page),
                }
                self.failed = None;
                self.state.send_replace(LoadState::Loaded {
                    has_next: self.has_next(),
                    has_previous: self.pages.first().is_some_and(|p| p.prev_key.is_some()),
                });
                Ok(count)
            }
            Err(e) => {
                let err = PagingError::new(direction, e);
                warn!(?direction, kind = %err.kind, "Page load failed");
                self.failed = Some(request);
                self.state.send_replace(LoadState::Errored {
                    direction,
                    kind: err.kind,
                    retryable: err.retryable,
                });
                Err(err)
            }
        }
    }

    /// Converts into a forward stream of pages starting at the first page.
    pub fn into_page_stream(
        self,
    ) -> impl Stream<Item = Result<Page<S::Key, S::Item>, PagingError>> + Send
    where
        S: 'static,
    {
        page_stream(self.source, self.config)
    }
}

// ============================================================================
// Page Stream
// ============================================================================

/// Streams pages forward from the first page until `next_key` is `None`.
///
/// The stream ends after yielding a load error.
pub fn page_stream<S>(
    source: S,
    config: PagingConfig,
) -> impl Stream<Item = Result<Page<S::Key, S::Item>, PagingError>> + Send
where
    S: PagingSource + 'static,
{
    // `None` = finished, `Some(None)` = first page, `Some(Some(k))` = page at k.
    let start: Option<Option<S::Key>> = Some(None);

    futures::stream::unfold((source, start), move |(source, cursor)| async move {
        let key = cursor?;
        let direction = if key.is_none() {
            LoadDirection::Refresh
        } else {
            LoadDirection::Append
        };
        let request = PageRequest::at(key, config.size_for(direction), direction);

        match source.load(request).await {
            Ok(page) => {
                let next = page.next_key.map(Some);
                Some((Ok(page), (source, next)))
            }
            Err(e) => Some((Err(PagingError::new(direction, e)), (source, None))),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HttpError;
    use crate::paging::source::LoadResult;
    use async_trait::async_trait;
    use futures::StreamExt;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Offset source over `0..total` that fails while `fail_next` > 0.
    struct CountingSource {
        total: u32,
        fail_next: AtomicU32,
        requested: Mutex<Vec<Option<u32>>>,
    }

    impl CountingSource {
        fn new(total: u32) -> Self {
            Self {
                total,
                fail_next: AtomicU32::new(0),
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PagingSource for CountingSource {
        type Key = u32;
        type Item = u32;

        async fn load(&self, request: PageRequest<u32>) -> LoadResult<u32, u32> {
            self.requested.lock().unwrap().push(request.key);
            if self.fail_next.load(Ordering::SeqCst) > 0 {
                self.fail_next.fetch_sub(1, Ordering::SeqCst);
                return Err(FetchError::from(HttpError::Timeout));
            }
            let offset = request.key.unwrap_or(0);
            let end = (offset + request.load_size).min(self.total);
            let items: Vec<u32> = (offset.min(end)..end).collect();
            let prev = (offset > 0).then(|| offset.saturating_sub(request.load_size));
            let next = (!items.is_empty()).then_some(offset + request.load_size);
            Ok(Page::new(items, prev, next))
        }
    }

    #[tokio::test]
    async fn test_refresh_then_append_to_end() {
        let mut pager = Pager::new(CountingSource::new(25), PagingConfig::new(10));
        assert_eq!(pager.state(), LoadState::Fresh);

        assert_eq!(pager.refresh().await.unwrap(), 10);
        assert_eq!(
            pager.state(),
            LoadState::Loaded {
                has_next: true,
                has_previous: false
            }
        );

        while pager.has_next() {
            pager.load_next().await.unwrap();
        }

        assert_eq!(pager.item_count(), 25);
        assert_eq!(pager.items().copied().collect::<Vec<_>>(), (0..25).collect::<Vec<_>>());
        assert_eq!(pager.load_next().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_error_then_retry() {
        let source = CountingSource::new(30);
        let mut pager = Pager::new(source, PagingConfig::new(10));
        pager.refresh().await.unwrap();

        pager.source.fail_next.store(1, Ordering::SeqCst);
        let err = pager.load_next().await.unwrap_err();
        assert_eq!(err.direction, LoadDirection::Append);
        assert_eq!(err.kind, ErrorKind::NetworkConnectionFailure);
        assert_eq!(
            pager.state(),
            LoadState::Errored {
                direction: LoadDirection::Append,
                kind: ErrorKind::NetworkConnectionFailure,
                retryable: true
            }
        );
        assert_eq!(pager.item_count(), 10);

        assert_eq!(pager.retry().await.unwrap(), 10);
        assert_eq!(pager.item_count(), 20);
        assert_eq!(pager.retry().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalidate_reloads_around_anchor() {
        let mut pager = Pager::new(CountingSource::new(100), PagingConfig::new(10));
        pager.refresh().await.unwrap();
        pager.load_next().await.unwrap();
        pager.load_next().await.unwrap();
        pager.set_anchor(25);

        pager.invalidate().await.unwrap();

        // Anchor lies in the page at offset 20 whose prev key is 10.
        let requested = pager.source.requested.lock().unwrap().clone();
        assert_eq!(requested.last(), Some(&Some(11)));
        assert_eq!(pager.pages().len(), 1);
        assert_eq!(pager.items().next(), Some(&11));
    }

    #[tokio::test]
    async fn test_invalidate_without_anchor_restarts() {
        let mut pager = Pager::new(CountingSource::new(100), PagingConfig::new(10));
        pager.refresh().await.unwrap();
        pager.load_next().await.unwrap();

        pager.invalidate().await.unwrap();

        let requested = pager.source.requested.lock().unwrap().clone();
        assert_eq!(requested.last(), Some(&None));
    }

    #[tokio::test]
    async fn test_load_previous_prepends() {
        let mut pager = Pager::new(CountingSource::new(100), PagingConfig::new(10));
        pager.refresh().await.unwrap();
        pager.load_next().await.unwrap();
        pager.set_anchor(15);
        pager.invalidate().await.unwrap();
        assert_eq!(pager.items().next(), Some(&1));

        let loaded = pager.load_previous().await.unwrap();
        assert_eq!(loaded, 10);
        assert_eq!(pager.items().next(), Some(&0));
        assert_eq!(pager.load_previous().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_state_is_observable() {
        let mut pager = Pager::new(CountingSource::new(5), PagingConfig::new(10));
        let mut rx = pager.subscribe();

        pager.refresh().await.unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(
            *rx.borrow_and_update(),
            LoadState::Loaded {
                has_next: true,
                has_previous: false
            }
        );
    }

    #[tokio::test]
    async fn test_page_stream_yields_until_end() {
        let stream = page_stream(CountingSource::new(23), PagingConfig::new(10));
        let pages: Vec<_> = stream.collect().await;

        assert_eq!(pages.len(), 4);
        let items: Vec<u32> = pages
            .into_iter()
            .flat_map(|page| page.unwrap().items)
            .collect();
        assert_eq!(items, (0..23).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_page_stream_stops_after_error() {
        let source = CountingSource::new(50);
        source.fail_next.store(1, Ordering::SeqCst);
        let pages: Vec<_> = page_stream(source, PagingConfig::default()).collect().await;

        assert_eq!(pages.len(), 1);
        let err = pages.into_iter().next().unwrap().unwrap_err();
        assert_eq!(err.direction, LoadDirection::Refresh);
        assert!(err.retryable);
    }
}
