//! Playlists created by the signed-in user.
//!
//! Each playlist is one document under `users/{uid}/playlists/{id}` holding
//! its name, creation time and the ids of its songs. Song ids are catalog
//! track ids and therefore numeric.

use chrono::Utc;
use futures::stream::{BoxStream, StreamExt};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

use musify_core::UserPlaylist;

use crate::document::{DocumentStore, OrderBy, lazy_collection};
use crate::error::StoreError;
use crate::favorites::{decode_all, to_document};
use crate::session::UserSession;
use crate::shared::ReplayHub;

const SONG_IDS_FIELD: &str = "songIds";
const NAME_FIELD: &str = "name";
const CREATED_AT_FIELD: &str = "createdAt";

/// Collection holding `uid`'s playlists.
pub fn playlists_collection(uid: &str) -> String {
    format!("users/{uid}/playlists")
}

/// Returns the ids that are not plain decimal numbers.
pub fn invalid_song_ids(ids: &[String]) -> Vec<String> {
    ids.iter()
        .filter(|id| id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()))
        .cloned()
        .collect()
}

fn newest_first() -> OrderBy {
    OrderBy::desc(CREATED_AT_FIELD)
}

fn id_values(ids: &[String]) -> Vec<Value> {
    ids.iter().cloned().map(Value::String).collect()
}

/// User playlists of the current user.
#[derive(Clone)]
pub struct UserPlaylistsRepository {
    store: Arc<dyn DocumentStore>,
    session: Arc<dyn UserSession>,
}

impl UserPlaylistsRepository {
    /// Creates a repository over `store` for the user of `session`.
    pub fn new(store: Arc<dyn DocumentStore>, session: Arc<dyn UserSession>) -> Self {
        Self { store, session }
    }

    async fn collection(&self) -> Result<String, StoreError> {
        let uid = self.session.ensure_user().await?;
        Ok(playlists_collection(&uid))
    }

    async fn path(&self, playlist_id: &str) -> Result<String, StoreError> {
        Ok(format!("{}/{playlist_id}", self.collection().await?))
    }

    /// Creates an empty playlist named `name`.
    #[instrument(skip(self))]
    pub async fn create_playlist(&self, name: &str) -> Result<UserPlaylist, StoreError> {
        let playlist = UserPlaylist {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            song_ids: Vec::new(),
            created_at: Utc::now(),
        };
        let path = self.path(&playlist.id).await?;
        self.store.set(&path, to_document(&playlist)?).await?;
        info!(playlist_id = %playlist.id, "Playlist created");
        Ok(playlist)
    }

    /// Appends `song_ids` that the playlist does not hold yet.
    ///
    /// Fails with [`StoreError::InvalidSongIds`] without writing anything if
    /// any id is not numeric.
    #[instrument(skip(self, song_ids), fields(count = song_ids.len()))]
    pub async fn add_songs(&self, playlist_id: &str, song_ids: &[String]) -> Result<(), StoreError> {
        let invalid = invalid_song_ids(song_ids);
        if !invalid.is_empty() {
            return Err(StoreError::InvalidSongIds(invalid));
        }
        let path = self.path(playlist_id).await?;
        self.store
            .array_union(&path, SONG_IDS_FIELD, id_values(song_ids))
            .await
    }

    /// Removes `song_ids` from the playlist.
    #[instrument(skip(self, song_ids), fields(count = song_ids.len()))]
    pub async fn remove_songs(
        &self,
        playlist_id: &str,
        song_ids: &[String],
    ) -> Result<(), StoreError> {
        let path = self.path(playlist_id).await?;
        self.store
            .array_remove(&path, SONG_IDS_FIELD, id_values(song_ids))
            .await
    }

    /// Renames a playlist.
    pub async fn rename_playlist(&self, playlist_id: &str, name: &str) -> Result<(), StoreError> {
        let path = self.path(playlist_id).await?;
        self.store
            .update_field(&path, NAME_FIELD, Value::String(name.to_string()))
            .await
    }

    /// Deletes a playlist. Deleting a missing playlist is a no-op.
    #[instrument(skip(self))]
    pub async fn delete_playlist(&self, playlist_id: &str) -> Result<(), StoreError> {
        let path = self.path(playlist_id).await?;
        self.store.delete(&path).await
    }

    /// Reads one playlist.
    pub async fn playlist(&self, playlist_id: &str) -> Result<Option<UserPlaylist>, StoreError> {
        let path = self.path(playlist_id).await?;
        match self.store.get(&path).await? {
            Some(data) => Ok(Some(serde_json::from_value(Value::Object(data))?)),
            None => Ok(None),
        }
    }

    /// Live playlist list, newest first.
    pub async fn playlists(&self) -> Result<BoxStream<'static, Vec<UserPlaylist>>, StoreError> {
        let collection = self.collection().await?;
        let snapshots = self
            .store
            .subscribe_collection(&collection, Some(newest_first()))
            .await?;
        Ok(snapshots
            .map(|docs| decode_all::<UserPlaylist>("playlist", docs))
            .boxed())
    }

    /// Playlist list shared between any number of observers.
    pub async fn shared_playlists(
        &self,
        linger: Duration,
    ) -> Result<ReplayHub<Vec<UserPlaylist>>, StoreError> {
        let collection = self.collection().await?;
        let store = Arc::clone(&self.store);
        Ok(ReplayHub::new("playlists", linger, move || {
            lazy_collection(Arc::clone(&store), collection.clone(), Some(newest_first()))
                .map(|docs| decode_all::<UserPlaylist>("playlist", docs))
                .boxed()
        }))
    }
}

impl std::fmt::Debug for UserPlaylistsRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserPlaylistsRepository")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocumentStore;
    use crate::session::LocalSession;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    fn repo() -> (Arc<MemoryDocumentStore>, UserPlaylistsRepository) {
        let store = Arc::new(MemoryDocumentStore::new());
        let repo =
            UserPlaylistsRepository::new(store.clone(), Arc::new(LocalSession::signed_in("u1")));
        (store, repo)
    }

    #[test]
    fn test_invalid_song_ids() {
        assert!(invalid_song_ids(&ids(&["1", "42", "007"])).is_empty());
        assert_eq!(invalid_song_ids(&ids(&["1", "abc", "", "4x"])), ids(&["abc", "", "4x"]));
    }

    #[tokio::test]
    async fn test_create_uses_camel_case_document() {
        let (store, repo) = repo();
        let playlist = repo.create_playlist("Road trip").await.unwrap();

        let path = format!("users/u1/playlists/{}", playlist.id);
        let data = store.get(&path).await.unwrap().unwrap();
        assert_eq!(data["name"], "Road trip");
        assert_eq!(data["songIds"], serde_json::json!([]));
        assert!(data.contains_key("createdAt"));
    }

    #[tokio::test]
    async fn test_add_and_remove_songs() {
        let (_store, repo) = repo();
        let playlist = repo.create_playlist("Mix").await.unwrap();

        repo.add_songs(&playlist.id, &ids(&["1", "2"])).await.unwrap();
        repo.add_songs(&playlist.id, &ids(&["2", "3"])).await.unwrap();
        repo.remove_songs(&playlist.id, &ids(&["1"])).await.unwrap();

        let stored = repo.playlist(&playlist.id).await.unwrap().unwrap();
        assert_eq!(stored.song_ids, ids(&["2", "3"]));
    }

    #[tokio::test]
    async fn test_non_numeric_ids_rejected_without_write() {
        let (_store, repo) = repo();
        let playlist = repo.create_playlist("Mix").await.unwrap();

        let err = repo
            .add_songs(&playlist.id, &ids(&["1", "spotify:track:abc"]))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::InvalidSongIds(ref bad) if bad == &ids(&["spotify:track:abc"])));
        let stored = repo.playlist(&playlist.id).await.unwrap().unwrap();
        assert!(stored.song_ids.is_empty());
    }

    #[tokio::test]
    async fn test_rename_and_delete() {
        let (_store, repo) = repo();
        let playlist = repo.create_playlist("Old").await.unwrap();

        repo.rename_playlist(&playlist.id, "New").await.unwrap();
        assert_eq!(repo.playlist(&playlist.id).await.unwrap().unwrap().name, "New");

        repo.delete_playlist(&playlist.id).await.unwrap();
        assert!(repo.playlist(&playlist.id).await.unwrap().is_none());
        assert!(matches!(
            repo.rename_playlist(&playlist.id, "Gone").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_stream_lists_newest_first() {
        let (_store, repo) = repo();
        let older = repo.create_playlist("First").await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let newer = repo.create_playlist("Second").await.unwrap();

        let mut playlists = repo.playlists().await.unwrap();
        let listed: Vec<_> = playlists.next().await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(listed, vec![newer.id.clone(), older.id]);

        repo.delete_playlist(&newer.id).await.unwrap();
        assert_eq!(playlists.next().await.unwrap().len(), 1);
    }
}
