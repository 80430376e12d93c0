//! Integration tests for the repository facades against mock catalogs.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use musify_core::{ErrorKind, GenreType};
use musify_fetch::{
    AuthError, BearerToken, FetchContext, RetryStrategy, StaticConnectivity, TokenRepository,
};
use musify_providers::images::{DEFAULT_PLAYLIST_IMAGE_URL, DEFAULT_TRACK_IMAGE_URL};
use musify_providers::{Catalog, CatalogConfig, JamendoSettings, SpotifySettings};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

#[derive(Default)]
struct CountingTokens {
    issued: AtomicU32,
    invalidated: AtomicU32,
}

#[async_trait]
impl TokenRepository for CountingTokens {
    async fn get_valid_bearer_token(&self) -> Result<BearerToken, AuthError> {
        self.issued.fetch_add(1, Ordering::SeqCst);
        Ok(BearerToken::new("tok", Utc::now(), 3600, None))
    }

    async fn invalidate(&self) {
        self.invalidated.fetch_add(1, Ordering::SeqCst);
    }
}

fn context(online: bool) -> FetchContext {
    let probe = if online {
        StaticConnectivity::online()
    } else {
        StaticConnectivity::offline()
    };
    FetchContext::builder()
        .connectivity(Arc::new(probe))
        .retry(RetryStrategy::no_retry())
        .page_size(2)
        .build()
}

fn config(server: &MockServer) -> CatalogConfig {
    CatalogConfig {
        spotify: SpotifySettings {
            api_base_url: server.uri(),
            ..SpotifySettings::default()
        },
        jamendo: JamendoSettings {
            client_id: "cid".to_string(),
            api_base_url: server.uri(),
        },
    }
}

fn catalog(server: &MockServer, online: bool, tokens: Arc<CountingTokens>) -> Catalog {
    Catalog::with_tokens(context(online), &config(server), tokens)
}

fn ok_envelope(results: &str) -> String {
    format!(r#"{{"headers": {{"status": "success", "code": 0}}, "results": {results}}}"#)
}

// ============================================================================
// Open-content catalog
// ============================================================================

#[tokio::test]
async fn test_error_code_in_success_body_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/albums"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"headers": {"status": "failed", "code": 5, "error_message": "Invalid client id"},
                "results": [{"id": "1", "name": "Garbage"}]}"#,
        ))
        .mount(&server)
        .await;

    let catalog = catalog(&server, true, Arc::default());
    let result = catalog.home_feed.fetch_new_albums(20).await;

    assert!(result.is_failure());
    assert_eq!(result.cause(), Some(&ErrorKind::ApiError));
    assert_eq!(result.data().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_offline_skips_provider_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ok_envelope("[]")))
        .expect(0)
        .mount(&server)
        .await;

    let catalog = catalog(&server, false, Arc::default());

    let albums = catalog.home_feed.fetch_new_albums(20).await;
    assert_eq!(albums.cause(), Some(&ErrorKind::NetworkError));
    assert_eq!(albums.data().map(Vec::len), Some(0));

    let details = catalog.tracks.fetch_playlist_details("1").await;
    assert_eq!(details.cause(), Some(&ErrorKind::NetworkError));
    assert!(details.data().is_none());
}

#[tokio::test]
async fn test_playlist_cover_falls_back_to_first_track() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/playlists"))
        .and(query_param("tags", "chill"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ok_envelope(
            r#"[{"id": "10", "name": "Covered", "user_name": "dj", "image": "https://cover/10"},
                {"id": "11", "name": "Bare", "user_name": ""},
                {"id": "12", "name": "Empty"}]"#,
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/playlists/tracks"))
        .and(query_param("id", "11"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ok_envelope(
            r#"[{"id": "11", "name": "Bare", "tracks": [
                {"id": "1", "name": "T", "image": "", "album_image": "https://album/1"}]}]"#,
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/playlists/tracks"))
        .and(query_param("id", "12"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ok_envelope(
            r#"[{"id": "12", "name": "Empty", "tracks": []}]"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let catalog = catalog(&server, true, Arc::default());
    let playlists = catalog
        .home_feed
        .fetch_playlists_for_genre(GenreType::Chill, 10)
        .await
        .into_result()
        .unwrap();

    let covers: Vec<_> = playlists.iter().map(|p| p.image_url.as_str()).collect();
    assert_eq!(
        covers,
        vec!["https://cover/10", "https://album/1", DEFAULT_PLAYLIST_IMAGE_URL]
    );
    assert_eq!(playlists[0].owner_name, "dj");
    assert_eq!(playlists[1].owner_name, "Jamendo Community");
}

#[tokio::test]
async fn test_playlist_details_keep_raw_count() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/playlists/tracks"))
        .and(query_param("id", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ok_envelope(
            r#"[{"id": "7", "name": "Mixed", "tracks": [
                {"id": "1", "name": "A", "audio": "https://a/1", "image": "https://img/1"},
                {"id": "2", "name": "B", "audio": ""},
                {"id": "3", "name": "C", "audio": "https://a/3"}]}]"#,
        )))
        .mount(&server)
        .await;

    let catalog = catalog(&server, true, Arc::default());
    let details = catalog
        .tracks
        .fetch_playlist_details("7")
        .await
        .into_result()
        .unwrap();

    assert_eq!(details.raw_track_count, 3);
    assert_eq!(details.tracks.len(), 2);
    assert_eq!(details.unplayable_count(), 1);
    assert_eq!(details.summary.image_url, "https://img/1");
    assert_eq!(details.summary.track_count, Some(3));
    assert_eq!(details.tracks[1].image_url, DEFAULT_TRACK_IMAGE_URL);
}

#[tokio::test]
async fn test_unknown_playlist_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/playlists/tracks"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ok_envelope("[]")))
        .mount(&server)
        .await;

    let catalog = catalog(&server, true, Arc::default());
    let result = catalog.tracks.fetch_tracks_for_playlist("404").await;
    assert_eq!(result.cause(), Some(&ErrorKind::EmptyResponse));
    assert_eq!(result.data().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_genre_feed_joins_both_shelves() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/albums"))
        .and(query_param("tags", "jazz"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ok_envelope(
            r#"[{"id": "1", "name": "Blue", "artist_id": "5", "artist_name": "M", "image": ""}]"#,
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/playlists"))
        .and(query_param("tags", "jazz"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let catalog = catalog(&server, true, Arc::default());
    let feed = catalog.home_feed.fetch_genre_feed(GenreType::Jazz, 5).await;

    let albums = feed.albums.into_result().unwrap();
    assert_eq!(
        albums[0].image_url,
        "https://usercontent.jamendo.com?type=artist&id=5&width=300"
    );
    assert_eq!(feed.playlists.cause(), Some(&ErrorKind::NetworkError));
}

#[tokio::test]
async fn test_playlist_pager_walks_to_end() {
    let server = MockServer::start().await;
    for (offset, body) in [
        ("0", r#"[{"id": "p", "name": "P", "tracks": [
            {"id": "1", "name": "A", "audio": "https://a/1"},
            {"id": "2", "name": "B", "audio": "https://a/2"}]}]"#),
        ("2", r#"[{"id": "p", "name": "P", "tracks": [
            {"id": "3", "name": "C", "audio": ""}]}]"#),
        ("4", "[]"),
    ] {
        Mock::given(method("GET"))
            .and(path("/playlists/tracks"))
            .and(query_param("offset", offset))
            .respond_with(ResponseTemplate::new(200).set_body_string(ok_envelope(body)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let catalog = catalog(&server, true, Arc::default());
    let mut pager = catalog.tracks.playlist_tracks_pager("p");
    pager.refresh().await.unwrap();
    while pager.has_next() {
        pager.load_next().await.unwrap();
    }

    let ids: Vec<_> = pager.items().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"]);
    assert_eq!(pager.pages().len(), 3);
}

// ============================================================================
// Commercial catalog
// ============================================================================

#[tokio::test]
async fn test_search_uses_shared_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(header("authorization", "Bearer tok"))
        .and(query_param("type", "track,album,artist,playlist"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"tracks": {"items": [{"id": "t", "name": "Song", "preview_url": "https://p"}]},
                "albums": {"items": []}, "artists": {"items": [null]}, "playlists": {"items": []}}"#,
        ))
        .mount(&server)
        .await;

    let tokens = Arc::new(CountingTokens::default());
    let catalog = catalog(&server, true, Arc::clone(&tokens));
    let results = catalog
        .search
        .fetch_search_results("song", 5)
        .await
        .into_result()
        .unwrap();

    assert_eq!(results.tracks.len(), 1);
    assert!(results.artists.is_empty());
    assert_eq!(tokens.issued.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unauthorized_invalidates_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/albums/a1"))
        .respond_with(ResponseTemplate::new(401).set_body_string(
            r#"{"error": {"status": 401, "message": "The access token expired"}}"#,
        ))
        .mount(&server)
        .await;

    let tokens = Arc::new(CountingTokens::default());
    let catalog = catalog(&server, true, Arc::clone(&tokens));
    let result = catalog.albums.fetch_album("a1").await;

    assert_eq!(result.cause(), Some(&ErrorKind::NetworkError));
    assert!(result.data().is_none());
    assert_eq!(tokens.invalidated.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_top_tracks_drop_missing_previews() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/artists/r1/top-tracks"))
        .and(query_param("market", "US"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"tracks": [
                {"id": "1", "name": "A", "preview_url": "https://p/1"},
                {"id": "2", "name": "B", "preview_url": null}
            ]}"#,
        ))
        .mount(&server)
        .await;

    let catalog = catalog(&server, true, Arc::default());
    let tracks = catalog
        .artists
        .fetch_top_tracks("r1")
        .await
        .into_result()
        .unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].id, "1");
}
