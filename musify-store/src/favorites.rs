//! Favorited songs of the signed-in user.
//!
//! Stored one document per song under `users/{uid}/favorites/{song id}`.

use futures::stream::{BoxStream, StreamExt};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use musify_core::Song;

use crate::document::{Document, DocumentSnapshot, DocumentStore, lazy_collection};
use crate::error::StoreError;
use crate::session::UserSession;
use crate::shared::ReplayHub;

/// Collection holding `uid`'s favorites.
pub fn favorites_collection(uid: &str) -> String {
    format!("users/{uid}/favorites")
}

/// Serializes a library value into a document body.
pub(crate) fn to_document<T: Serialize>(value: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::Serialization(serde::ser::Error::custom(
            "value is not a JSON object",
        ))),
    }
}

/// Decodes every snapshot, skipping documents that do not match `T`.
pub(crate) fn decode_all<T: DeserializeOwned>(
    kind: &'static str,
    snapshots: Vec<DocumentSnapshot>,
) -> Vec<T> {
    snapshots
        .into_iter()
        .filter_map(|snapshot| {
            serde_json::from_value(Value::Object(snapshot.data))
                .inspect_err(|e| {
                    warn!(kind, id = %snapshot.id, error = %e, "Skipping malformed document");
                })
                .ok()
        })
        .collect()
}

/// Favorites of the current user.
#[derive(Clone)]
pub struct FavoritesRepository {
    store: Arc<dyn DocumentStore>,
    session: Arc<dyn UserSession>,
}

impl FavoritesRepository {
    /// Creates a repository over `store` for the user of `session`.
    pub fn new(store: Arc<dyn DocumentStore>, session: Arc<dyn UserSession>) -> Self {
        Self { store, session }
    }

    async fn path(&self, song_id: &str) -> Result<String, StoreError> {
        let uid = self.session.ensure_user().await?;
        Ok(format!("{}/{song_id}", favorites_collection(&uid)))
    }

    /// Marks `song` as favorite, replacing any earlier copy.
    #[instrument(skip(self, song), fields(song_id = %song.id))]
    pub async fn add_favorite(&self, song: &Song) -> Result<(), StoreError> {
        let path = self.path(&song.id).await?;
        self.store.set(&path, to_document(song)?).await?;
        debug!("Favorite added");
        Ok(())
    }

    /// Removes `song_id` from the favorites. Removing a non-favorite is a no-op.
    #[instrument(skip(self))]
    pub async fn remove_favorite(&self, song_id: &str) -> Result<(), StoreError> {
        let path = self.path(song_id).await?;
        self.store.delete(&path).await
    }

    /// Flips the favorite state of `song` and returns the new state.
    pub async fn toggle_favorite(&self, song: &Song) -> Result<bool, StoreError> {
        if self.is_favorite(&song.id).await? {
            self.remove_favorite(&song.id).await?;
            Ok(false)
        } else {
            self.add_favorite(song).await?;
            Ok(true)
        }
    }

    /// Whether `song_id` is a favorite.
    pub async fn is_favorite(&self, song_id: &str) -> Result<bool, StoreError> {
        let path = self.path(song_id).await?;
        Ok(self.store.get(&path).await?.is_some())
    }

    /// Live favorites list, pushed again on every change.
    pub async fn favorites(&self) -> Result<BoxStream<'static, Vec<Song>>, StoreError> {
        let uid = self.session.ensure_user().await?;
        let snapshots = self
            .store
            .subscribe_collection(&favorites_collection(&uid), None)
            .await?;
        Ok(snapshots
            .map(|docs| decode_all::<Song>("favorite", docs))
            .boxed())
    }

    /// Live favorite flag of one song.
    pub async fn favorite_state(
        &self,
        song_id: &str,
    ) -> Result<BoxStream<'static, bool>, StoreError> {
        let path = self.path(song_id).await?;
        let doc = self.store.subscribe_document(&path).await?;
        Ok(doc.map(|data| data.is_some()).boxed())
    }

    /// Favorites list shared between any number of observers.
    ///
    /// The store subscription is opened for the first observer and closed
    /// `linger` after the last one leaves.
    pub async fn shared_favorites(
        &self,
        linger: Duration,
    ) -> Result<ReplayHub<Vec<Song>>, StoreError> {
        let uid = self.session.ensure_user().await?;
        let store = Arc::clone(&self.store);
        let collection = favorites_collection(&uid);
        Ok(ReplayHub::new("favorites", linger, move || {
            lazy_collection(Arc::clone(&store), collection.clone(), None)
                .map(|docs| decode_all::<Song>("favorite", docs))
                .boxed()
        }))
    }
}

impl std::fmt::Debug for FavoritesRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FavoritesRepository").finish_non_exhaustive()
    }
}
