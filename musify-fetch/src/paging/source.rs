//! The paging-source contract.

use async_trait::async_trait;
use std::sync::Arc;

use musify_core::{Page, PageKey, PageRequest, PagingState};

use crate::error::{AuthError, FetchError};
use crate::token::{BearerToken, TokenRepository};

/// Result of a single page load.
pub type LoadResult<K, T> = Result<Page<K, T>, FetchError>;

/// Loads one page of an incremental list at a time.
///
/// A source is bound to one list (one query, one playlist, ...). Callers issue
/// loads for the same source serially.
#[async_trait]
pub trait PagingSource: Send + Sync {
    /// Page key type.
    type Key: PageKey;
    /// Domain item type.
    type Item: Send + Sync + 'static;

    /// Loads the page described by `request`.
    async fn load(&self, request: PageRequest<Self::Key>) -> LoadResult<Self::Key, Self::Item>;

    /// Key to reload from after invalidation, or `None` to start over.
    fn refresh_key(&self, state: &PagingState<Self::Key, Self::Item>) -> Option<Self::Key> {
        state.refresh_key()
    }
}

#[async_trait]
impl<S: PagingSource + ?Sized> PagingSource for Box<S> {
    type Key = S::Key;
    type Item = S::Item;

    async fn load(&self, request: PageRequest<Self::Key>) -> LoadResult<Self::Key, Self::Item> {
        (**self).load(request).await
    }

    fn refresh_key(&self, state: &PagingState<Self::Key, Self::Item>) -> Option<Self::Key> {
        (**self).refresh_key(state)
    }
}

/// Fetches a credential when `required`.
///
/// Every failure, including a missing repository, becomes
/// [`FetchError::Credential`] so the page load retries it as an I/O failure.
pub(crate) async fn credential_for(
    tokens: Option<&Arc<dyn TokenRepository>>,
    required: bool,
) -> Result<Option<BearerToken>, FetchError> {
    if !required {
        return Ok(None);
    }
    let tokens = tokens.ok_or(FetchError::Credential(AuthError::NotConfigured))?;
    tokens
        .get_valid_bearer_token()
        .await
        .map(Some)
        .map_err(FetchError::Credential)
}
