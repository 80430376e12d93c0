//! Catalog search against the commercial catalog.

use std::sync::Arc;
use tracing::instrument;

use musify_core::{FetchedResource, SearchResults};
use musify_fetch::{
    FetchContext, FetchError, OffsetPagingSource, Pager, TokenRepository, run_catching_with_token,
};

use super::{offline, offset_pager};
use crate::spotify::dto::SearchResponse;
use crate::spotify::paging::{Albums, Artists, Playlists, SearchCategory, SearchPages, Tracks};
use crate::spotify::{SearchType, SpotifyApiClient};

/// Search facade.
#[derive(Clone)]
pub struct SearchRepository {
    ctx: FetchContext,
    tokens: Arc<dyn TokenRepository>,
    spotify: Arc<SpotifyApiClient>,
}

impl SearchRepository {
    /// Creates the facade.
    pub fn new(
        ctx: FetchContext,
        tokens: Arc<dyn TokenRepository>,
        spotify: Arc<SpotifyApiClient>,
    ) -> Self {
        Self {
            ctx,
            tokens,
            spotify,
        }
    }

    /// First `limit` results of every category.
    #[instrument(skip(self))]
    pub async fn fetch_search_results(&self, query: &str, limit: u32) -> FetchedResource<SearchResults> {
        if !self.ctx.is_online().await {
            return offline("search", Some(SearchResults::default()));
        }
        let api = &self.spotify;
        run_catching_with_token(self.tokens.as_ref(), |token| async move {
            let response = api.search(&token, query, &SearchType::ALL, 0, limit).await?;
            Ok::<_, FetchError>(into_results(response, api))
        })
        .await
        .or_fallback(SearchResults::default)
    }

    fn pager<C: SearchCategory>(&self, query: &str) -> Pager<OffsetPagingSource<SearchPages<C>>> {
        offset_pager(
            &self.ctx,
            SearchPages::<C>::new(Arc::clone(&self.spotify), query),
            Some(Arc::clone(&self.tokens)),
        )
    }

    /// Incremental album results.
    pub fn albums_pager(&self, query: &str) -> Pager<OffsetPagingSource<SearchPages<Albums>>> {
        self.pager(query)
    }

    /// Incremental artist results.
    pub fn artists_pager(&self, query: &str) -> Pager<OffsetPagingSource<SearchPages<Artists>>> {
        self.pager(query)
    }

    /// Incremental track results.
    pub fn tracks_pager(&self, query: &str) -> Pager<OffsetPagingSource<SearchPages<Tracks>>> {
        self.pager(query)
    }

    /// Incremental playlist results.
    pub fn playlists_pager(&self, query: &str) -> Pager<OffsetPagingSource<SearchPages<Playlists>>> {
        self.pager(query)
    }
}

fn into_results(response: SearchResponse, api: &SpotifyApiClient) -> SearchResults {
    let size = api.image_size();
    SearchResults {
        tracks: response
            .tracks
            .map(|p| p.items.into_iter().map(|t| t.into_track(size, None)).collect())
            .unwrap_or_default(),
        albums: response
            .albums
            .map(|p| p.items.iter().map(|a| a.to_album(size)).collect())
            .unwrap_or_default(),
        artists: response
            .artists
            .map(|p| p.items.iter().map(|a| a.to_artist(size)).collect())
            .unwrap_or_default(),
        playlists: response
            .playlists
            .map(|p| p.items.iter().map(|pl| pl.to_summary(size)).collect())
            .unwrap_or_default(),
    }
}

impl std::fmt::Debug for SearchRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchRepository")
            .field("spotify", &self.spotify)
            .finish_non_exhaustive()
    }
}
