//! Albums from the commercial catalog.

use std::sync::Arc;
use tracing::instrument;

use musify_core::{Album, FetchedResource, Track};
use musify_fetch::{
    FetchContext, FetchError, OffsetPagingSource, Pager, TokenRepository, run_catching_with_token,
};

use super::{offline, offset_pager, playable};
use crate::spotify::{ArtistAlbumPages, SpotifyApiClient};

/// Album facade.
#[derive(Clone)]
pub struct AlbumsRepository {
    ctx: FetchContext,
    tokens: Arc<dyn TokenRepository>,
    spotify: Arc<SpotifyApiClient>,
}

impl AlbumsRepository {
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

    /// Album metadata.
    #[instrument(skip(self))]
    pub async fn fetch_album(&self, album_id: &str) -> FetchedResource<Album> {
        if !self.ctx.is_online().await {
            return offline("album", None);
        }
        let api = &self.spotify;
        run_catching_with_token(self.tokens.as_ref(), |token| async move {
            let album = api.album(&token, album_id).await?;
            Ok::<_, FetchError>(album.summary.to_album(api.image_size()))
        })
        .await
    }

    /// Playable tracks of an album, in album order.
    #[instrument(skip(self))]
    pub async fn fetch_album_tracks(&self, album_id: &str) -> FetchedResource<Vec<Track>> {
        if !self.ctx.is_online().await {
            return offline("album_tracks", Some(Vec::new()));
        }
        let api = &self.spotify;
        run_catching_with_token(self.tokens.as_ref(), |token| async move {
            let album = api.album(&token, album_id).await?;
            Ok::<_, FetchError>(playable(album.into_tracks(api.image_size())))
        })
        .await
        .or_fallback(Vec::new)
    }

    /// First `limit` albums and singles of an artist.
    #[instrument(skip(self))]
    pub async fn fetch_albums_of_artist(&self, artist_id: &str, limit: u32) -> FetchedResource<Vec<Album>> {
        if !self.ctx.is_online().await {
            return offline("albums_of_artist", Some(Vec::new()));
        }
        let api = &self.spotify;
        run_catching_with_token(self.tokens.as_ref(), |token| async move {
            let page = api.artist_albums(&token, artist_id, 0, limit).await?;
            let size = api.image_size();
            Ok::<_, FetchError>(page.items.iter().map(|a| a.to_album(size)).collect())
        })
        .await
        .or_fallback(Vec::new)
    }

    /// First `limit` new releases in the configured market.
    #[instrument(skip(self))]
    pub async fn fetch_new_releases(&self, limit: u32) -> FetchedResource<Vec<Album>> {
        if !self.ctx.is_online().await {
            return offline("new_releases", Some(Vec::new()));
        }
        let api = &self.spotify;
        run_catching_with_token(self.tokens.as_ref(), |token| async move {
            let response = api.new_releases(&token, 0, limit).await?;
            let size = api.image_size();
            Ok::<_, FetchError>(response.albums.items.iter().map(|a| a.to_album(size)).collect())
        })
        .await
        .or_fallback(Vec::new)
    }

    /// Incremental list of an artist's albums and singles.
    pub fn albums_of_artist_pager(&self, artist_id: &str) -> Pager<OffsetPagingSource<ArtistAlbumPages>> {
        offset_pager(
            &self.ctx,
            ArtistAlbumPages::new(Arc::clone(&self.spotify), artist_id),
            Some(Arc::clone(&self.tokens)),
        )
    }
}

impl std::fmt::Debug for AlbumsRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlbumsRepository")
            .field("spotify", &self.spotify)
            .finish_non_exhaustive()
    }
}
