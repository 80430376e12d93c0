//! Track listings from the open-content catalog.

use std::sync::Arc;
use tracing::{debug, instrument};

use musify_core::{FetchedResource, PlaylistDetails, Track};
use musify_fetch::{FetchContext, FetchError, IdListPagingSource, OffsetPagingSource, Pager};

use super::{classify, offline, offset_pager, playable};
use crate::images::first_present;
use crate::jamendo::api::ALBUM_TRACK_LIMIT;
use crate::jamendo::{JamendoApiClient, PlaylistTrackPages, TrackLookup};

/// Number of tracks returned for an artist.
pub const TOP_TRACKS_LIMIT: u32 = 10;

/// Track facade.
#[derive(Debug, Clone)]
pub struct TracksRepository {
    ctx: FetchContext,
    jamendo: Arc<JamendoApiClient>,
}

impl TracksRepository {
    /// Creates the facade.
    pub fn new(ctx: FetchContext, jamendo: Arc<JamendoApiClient>) -> Self {
        Self { ctx, jamendo }
    }

    /// Playable tracks of an artist.
    #[instrument(skip(self))]
    pub async fn fetch_top_tracks_for_artist(&self, artist_id: &str) -> FetchedResource<Vec<Track>> {
        if !self.ctx.is_online().await {
            return offline("top_tracks_for_artist", Some(Vec::new()));
        }
        let result = self
            .jamendo
            .artist_tracks(artist_id, TOP_TRACKS_LIMIT)
            .await
            .map(|tracks| playable(tracks.into_iter().map(|t| t.into_track(None, None))));
        classify("top_tracks_for_artist", result).or_fallback(Vec::new)
    }

    /// Playable tracks of an album, in album order.
    #[instrument(skip(self))]
    pub async fn fetch_tracks_for_album(&self, album_id: &str) -> FetchedResource<Vec<Track>> {
        if !self.ctx.is_online().await {
            return offline("tracks_for_album", Some(Vec::new()));
        }
        let result = self.jamendo.album_tracks(album_id).await.map(|albums| {
            playable(albums.into_iter().flat_map(|entry| {
                let album = entry.album;
                entry.tracks.into_iter().map(move |t| {
                    t.into_track(Some(album.name.as_str()), album.image.as_deref())
                })
            }))
        });
        classify("tracks_for_album", result).or_fallback(Vec::new)
    }

    /// Playable tracks of a playlist.
    pub async fn fetch_tracks_for_playlist(&self, playlist_id: &str) -> FetchedResource<Vec<Track>> {
        self.fetch_playlist_details(playlist_id)
            .await
            .map(|details| details.tracks)
            .or_fallback(Vec::new)
    }

    /// Playlist summary with its playable tracks and the unfiltered count.
    ///
    /// A playlist without a cover borrows the artwork of its first track.
    #[instrument(skip(self))]
    pub async fn fetch_playlist_details(&self, playlist_id: &str) -> FetchedResource<PlaylistDetails> {
        if !self.ctx.is_online().await {
            return offline("playlist_details", None);
        }
        let result = self
            .jamendo
            .playlist_tracks(playlist_id, 0, ALBUM_TRACK_LIMIT)
            .await
            .and_then(|entries| {
                entries.into_iter().next().ok_or_else(|| {
                    FetchError::EmptyResponse(format!("No playlist with id {playlist_id}"))
                })
            })
            .map(|entry| {
                let raw_track_count = entry.tracks.len();
                let cover = entry
                    .tracks
                    .first()
                    .and_then(|t| first_present([t.image.as_deref(), t.album_image.as_deref()]))
                    .map(str::to_string);
                let summary = entry.playlist.to_summary(
                    cover.as_deref(),
                    u32::try_from(raw_track_count).ok(),
                );
                let tracks = playable(entry.tracks.into_iter().map(|t| t.into_track(None, None)));
                debug!(raw = raw_track_count, playable = tracks.len(), "Playlist tracks");
                PlaylistDetails {
                    summary,
                    tracks,
                    raw_track_count,
                }
            });
        classify("playlist_details", result)
    }

    /// Incremental list of a playlist's playable tracks.
    pub fn playlist_tracks_pager(&self, playlist_id: &str) -> Pager<OffsetPagingSource<PlaylistTrackPages>> {
        offset_pager(
            &self.ctx,
            PlaylistTrackPages::new(Arc::clone(&self.jamendo), playlist_id),
            None,
        )
    }

    /// Incremental list resolving track ids one at a time.
    ///
    /// Ids are deduplicated keeping the first occurrence. Ids that are not
    /// numeric cannot exist in the catalog and are dropped.
    pub fn tracks_for_ids_pager<I, S>(&self, ids: I) -> Pager<IdListPagingSource<TrackLookup>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids = ids
            .into_iter()
            .map(Into::<String>::into)
            .filter(|id| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()));
        let source = IdListPagingSource::new(TrackLookup::new(Arc::clone(&self.jamendo)), ids)
            .with_retry(self.ctx.settings.retry.clone());
        Pager::new(source, self.ctx.settings.paging)
    }
}
