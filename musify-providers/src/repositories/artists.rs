//! Artists from the commercial catalog.

use std::sync::Arc;
use tracing::instrument;

use musify_core::{Artist, FetchedResource, Track};
use musify_fetch::{FetchContext, FetchError, TokenRepository, run_catching_with_token};

use super::{offline, playable};
use crate::spotify::SpotifyApiClient;

/// Artist facade.
#[derive(Clone)]
pub struct ArtistsRepository {
    ctx: FetchContext,
    tokens: Arc<dyn TokenRepository>,
    spotify: Arc<SpotifyApiClient>,
}

impl ArtistsRepository {
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

    /// Artist profile.
    #[instrument(skip(self))]
    pub async fn fetch_artist(&self, artist_id: &str) -> FetchedResource<Artist> {
        if !self.ctx.is_online().await {
            return offline("artist", None);
        }
        let api = &self.spotify;
        run_catching_with_token(self.tokens.as_ref(), |token| async move {
            let artist = api.artist(&token, artist_id).await?;
            Ok::<_, FetchError>(artist.to_artist(api.image_size()))
        })
        .await
    }

    /// The artist's most popular tracks that have a preview.
    #[instrument(skip(self))]
    pub async fn fetch_top_tracks(&self, artist_id: &str) -> FetchedResource<Vec<Track>> {
        if !self.ctx.is_online().await {
            return offline("top_tracks", Some(Vec::new()));
        }
        let api = &self.spotify;
        run_catching_with_token(self.tokens.as_ref(), |token| async move {
            let response = api.top_tracks(&token, artist_id).await?;
            let size = api.image_size();
            Ok::<_, FetchError>(playable(
                response.tracks.into_iter().map(|t| t.into_track(size, None)),
            ))
        })
        .await
        .or_fallback(Vec::new)
    }
}

impl std::fmt::Debug for ArtistsRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtistsRepository")
            .field("spotify", &self.spotify)
            .finish_non_exhaustive()
    }
}
