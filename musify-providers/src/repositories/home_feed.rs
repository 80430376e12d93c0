//! Browse feed of the open-content catalog: new releases and genre shelves.

use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument};

use musify_core::{Album, FetchedResource, GenreType, PlaylistSummary};
use musify_fetch::{FetchContext, OffsetPagingSource, Pager};

use super::{classify, offline, offset_pager};
use crate::images::first_present;
use crate::jamendo::dto::JamendoPlaylist;
use crate::jamendo::{AlbumListing, AlbumPages, JamendoApiClient};

/// Albums and playlists of one genre, fetched together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreFeed {
    /// Genre the feed was built for.
    pub genre: GenreType,
    /// Albums tagged with the genre.
    pub albums: FetchedResource<Vec<Album>>,
    /// Playlists tagged with the genre.
    pub playlists: FetchedResource<Vec<PlaylistSummary>>,
}

/// Home feed facade.
#[derive(Debug, Clone)]
pub struct HomeFeedRepository {
    ctx: FetchContext,
    jamendo: Arc<JamendoApiClient>,
}

impl HomeFeedRepository {
    /// Creates the facade.
    pub fn new(ctx: FetchContext, jamendo: Arc<JamendoApiClient>) -> Self {
        Self { ctx, jamendo }
    }

    /// Newest albums.
    #[instrument(skip(self))]
    pub async fn fetch_new_albums(&self, limit: u32) -> FetchedResource<Vec<Album>> {
        if !self.ctx.is_online().await {
            return offline("new_albums", Some(Vec::new()));
        }
        let width = self.jamendo.image_width();
        let result = self
            .jamendo
            .new_albums(0, limit)
            .await
            .map(|albums| albums.iter().map(|a| a.to_album(width)).collect());
        classify("new_albums", result).or_fallback(Vec::new)
    }

    /// Albums tagged with `genre`.
    #[instrument(skip(self))]
    pub async fn fetch_albums_for_genre(
        &self,
        genre: GenreType,
        limit: u32,
    ) -> FetchedResource<Vec<Album>> {
        if !self.ctx.is_online().await {
            return offline("albums_for_genre", Some(Vec::new()));
        }
        let width = self.jamendo.image_width();
        let result = self
            .jamendo
            .albums_by_tag(genre.tag(), 0, limit)
            .await
            .map(|albums| albums.iter().map(|a| a.to_album(width)).collect());
        classify("albums_for_genre", result).or_fallback(Vec::new)
    }

    /// Playlists tagged with `genre`.
    ///
    /// Playlists without a cover are given their first track's artwork, which
    /// costs one extra request per such playlist. The requests run
    /// concurrently and a failed one falls back to the default cover.
    #[instrument(skip(self))]
    pub async fn fetch_playlists_for_genre(
        &self,
        genre: GenreType,
        limit: u32,
    ) -> FetchedResource<Vec<PlaylistSummary>> {
        if !self.ctx.is_online().await {
            return offline("playlists_for_genre", Some(Vec::new()));
        }
        let playlists = match self.jamendo.playlists_by_tag(genre.tag(), 0, limit).await {
            Ok(playlists) => playlists,
            Err(e) => return classify("playlists_for_genre", Err(e)).or_fallback(Vec::new),
        };

        let summaries = join_all(playlists.iter().map(|p| self.summarize(p))).await;
        FetchedResource::success(summaries)
    }

    async fn summarize(&self, playlist: &JamendoPlaylist) -> PlaylistSummary {
        if playlist.has_image() {
            return playlist.to_summary(None, None);
        }
        let cover = self.first_track_image(&playlist.id).await;
        playlist.to_summary(cover.as_deref(), None)
    }

    async fn first_track_image(&self, playlist_id: &str) -> Option<String> {
        match self.jamendo.playlist_tracks(playlist_id, 0, 1).await {
            Ok(entries) => entries
                .first()
                .and_then(|e| e.tracks.first())
                .and_then(|t| first_present([t.image.as_deref(), t.album_image.as_deref()]))
                .map(str::to_string),
            Err(e) => {
                debug!(playlist_id, error = %e, "Cover lookup failed, using default");
                None
            }
        }
    }

    /// Albums and playlists of `genre`, fetched concurrently.
    #[instrument(skip(self))]
    pub async fn fetch_genre_feed(&self, genre: GenreType, limit: u32) -> GenreFeed {
        let (albums, playlists) = futures::join!(
            self.fetch_albums_for_genre(genre, limit),
            self.fetch_playlists_for_genre(genre, limit),
        );
        GenreFeed {
            genre,
            albums,
            playlists,
        }
    }

    /// Incremental list of the newest albums.
    pub fn new_albums_pager(&self) -> Pager<OffsetPagingSource<AlbumPages>> {
        offset_pager(
            &self.ctx,
            AlbumPages::new(Arc::clone(&self.jamendo), AlbumListing::NewReleases),
            None,
        )
    }

    /// Incremental list of albums tagged with `genre`.
    pub fn genre_albums_pager(&self, genre: GenreType) -> Pager<OffsetPagingSource<AlbumPages>> {
        offset_pager(
            &self.ctx,
            AlbumPages::new(Arc::clone(&self.jamendo), AlbumListing::Genre(genre)),
            None,
        )
    }
}
