//! Repository facades combining adapters, credentials and the paging engine
//! into domain operations.
//!
//! One-shot operations check connectivity before any provider call and
//! return a [`FetchedResource`]; list results carry an empty list as fallback
//! data on failure. Incremental lists are returned as [`Pager`]s.

pub mod albums;
pub mod artists;
pub mod home_feed;
pub mod search;
pub mod tracks;

pub use albums::AlbumsRepository;
pub use artists::ArtistsRepository;
pub use home_feed::{GenreFeed, HomeFeedRepository};
pub use search::SearchRepository;
pub use tracks::TracksRepository;

use std::sync::Arc;
use tracing::warn;

use musify_core::{ErrorKind, FetchedResource, Track};
use musify_fetch::{
    FetchContext, FetchError, OffsetPagingSource, PageProvider, Pager, TokenRepository,
};

/// Failure returned without a provider call when there is no network.
pub(crate) fn offline<T>(operation: &str, data: Option<T>) -> FetchedResource<T> {
    warn!(operation, "No network available, skipping provider call");
    match data {
        Some(data) => FetchedResource::failure_with(ErrorKind::NetworkError, data),
        None => FetchedResource::failure(ErrorKind::NetworkError),
    }
}

/// Classifies the outcome of an unauthenticated provider call.
pub(crate) fn classify<T>(operation: &str, result: Result<T, FetchError>) -> FetchedResource<T> {
    match result {
        Ok(data) => FetchedResource::success(data),
        Err(e) => {
            let kind = e.kind();
            warn!(operation, error = %e, kind = %kind, "Provider call failed");
            FetchedResource::failure(kind)
        }
    }
}

/// Keeps only tracks with a stream URL.
pub(crate) fn playable(tracks: impl IntoIterator<Item = Track>) -> Vec<Track> {
    tracks.into_iter().filter(Track::is_playable).collect()
}

/// Builds a pager over an offset provider using the context's settings.
pub(crate) fn offset_pager<P: PageProvider>(
    ctx: &FetchContext,
    provider: P,
    tokens: Option<Arc<dyn TokenRepository>>,
) -> Pager<OffsetPagingSource<P>> {
    let mut source = OffsetPagingSource::new(provider).with_retry(ctx.settings.retry.clone());
    if let Some(tokens) = tokens {
        source = source.with_tokens(tokens);
    }
    Pager::new(source, ctx.settings.paging)
}
