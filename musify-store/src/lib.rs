// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Musify Store
//!
//! User library storage and configuration for Musify.
//!
//! This crate provides:
//!
//! - **DocumentStore**: Push-capable document database with an in-memory backend
//! - **ReplayHub**: Shares one push stream between many observers
//! - **FavoritesRepository** / **UserPlaylistsRepository**: The user's library
//! - **Config**: Persisted settings with environment overrides
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use musify_store::{FavoritesRepository, LocalSession, MemoryDocumentStore};
//!
//! let store = Arc::new(MemoryDocumentStore::new());
//! let favorites = FavoritesRepository::new(store, Arc::new(LocalSession::new()));
//!
//! favorites.add_favorite(&song).await?;
//!
//! let mut stream = favorites.favorites().await?;
//! while let Some(songs) = stream.next().await {
//!     println!("{} favorites", songs.len());
//! }
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod favorites;
pub mod playlists;
pub mod session;
pub mod shared;

pub use config::{
    Config, JamendoConfig, NetworkConfig, PagingConfig, SpotifyConfig, default_config_dir,
    default_config_path,
};
pub use document::{
    Document, DocumentSnapshot, DocumentStore, MemoryDocumentStore, OrderBy, lazy_collection,
};
pub use error::StoreError;
pub use favorites::{FavoritesRepository, favorites_collection};
pub use playlists::{UserPlaylistsRepository, invalid_song_ids, playlists_collection};
pub use session::{LocalSession, UserSession};
pub use shared::{HubSubscription, ReplayHub};
