//! Jamendo catalog adapter.
//!
//! Authenticates with a `client_id` query parameter. Errors are reported in
//! the response's status block as well as by HTTP status.

pub mod api;
pub mod dto;
pub mod paging;

pub use api::{API_BASE_URL, JamendoApiClient};
pub use dto::{DEFAULT_OWNER_NAME, placeholder_url};
pub use paging::{AlbumListing, AlbumPages, PlaylistTrackPages, TrackLookup};
