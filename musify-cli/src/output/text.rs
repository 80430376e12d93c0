//! Text output formatting with colors.

use musify_core::{Album, Artist, FetchedResource, PlaylistDetails, PlaylistSummary, SearchResults, Track};
use musify_providers::GenreFeed;

use super::json::{ConfigOutput, PagedTracksOutput, TokenOutput};

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

/// Width of the title column in listings.
const TITLE_WIDTH: usize = 40;

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    // ------------------------------------------------------------------------
    // Listings
    // ------------------------------------------------------------------------

    /// Formats one track as a listing line.
    pub fn format_track_line(&self, index: usize, track: &Track) -> String {
        let marker = if track.is_playable() {
            self.green("▶")
        } else {
            self.dim("·")
        };
        let explicit = if track.is_explicit { " [E]" } else { "" };
        format!(
            "{:>3}. {} {:<width$} {} {}{}",
            index + 1,
            marker,
            truncate(&track.title, TITLE_WIDTH),
            self.cyan(&track.artist_name),
            self.dim(&track.duration_label()),
            explicit,
            width = TITLE_WIDTH,
        )
    }

    /// Formats a titled list of tracks.
    pub fn format_tracks(&self, title: &str, tracks: &[Track]) -> String {
        let mut lines = vec![self.header(title, tracks.len())];
        lines.extend(
            tracks
                .iter()
                .enumerate()
                .map(|(i, track)| self.format_track_line(i, track)),
        );
        lines.join("\n")
    }

    /// Formats a titled list of albums.
    pub fn format_albums(&self, title: &str, albums: &[Album]) -> String {
        let mut lines = vec![self.header(title, albums.len())];
        for (i, album) in albums.iter().enumerate() {
            let year = album
                .release_year
                .as_deref()
                .map(|y| format!(" ({y})"))
                .unwrap_or_default();
            lines.push(format!(
                "{:>3}. {:<width$} {}{}  {}",
                i + 1,
                truncate(&album.name, TITLE_WIDTH),
                self.cyan(&album.artist_name),
                year,
                self.dim(&album.id),
                width = TITLE_WIDTH,
            ));
        }
        lines.join("\n")
    }

    /// Formats a list of artists.
    pub fn format_artists(&self, artists: &[Artist]) -> String {
        let mut lines = vec![self.header("Artists", artists.len())];
        for (i, artist) in artists.iter().enumerate() {
            let followers = artist
                .followers
                .map(|n| format!(" {} followers", format_count(n)))
                .unwrap_or_default();
            lines.push(format!(
                "{:>3}. {:<width$}{}  {}",
                i + 1,
                truncate(&artist.name, TITLE_WIDTH),
                self.dim(&followers),
                self.dim(&artist.id),
                width = TITLE_WIDTH,
            ));
        }
        lines.join("\n")
    }

    /// Formats a titled list of playlists.
    pub fn format_playlists(&self, title: &str, playlists: &[PlaylistSummary]) -> String {
        let mut lines = vec![self.header(title, playlists.len())];
        for (i, playlist) in playlists.iter().enumerate() {
            let count = playlist
                .track_count
                .map(|n| format!(" {n} tracks"))
                .unwrap_or_default();
            lines.push(format!(
                "{:>3}. {:<width$} {}{}  {}",
                i + 1,
                truncate(&playlist.name, TITLE_WIDTH),
                self.cyan(&playlist.owner_name),
                self.dim(&count),
                self.dim(&playlist.id),
                width = TITLE_WIDTH,
            ));
        }
        lines.join("\n")
    }

    // ------------------------------------------------------------------------
    // Composite Views
    // ------------------------------------------------------------------------

    /// Formats search results, skipping empty categories.
    pub fn format_search(&self, query: &str, results: &SearchResults) -> String {
        if results.is_empty() {
            return format!("No results for {}", self.bold(&format!("\"{query}\"")));
        }

        let mut sections = Vec::new();
        if !results.tracks.is_empty() {
            sections.push(self.format_tracks("Tracks", &results.tracks));
        }
        if !results.albums.is_empty() {
            sections.push(self.format_albums("Albums", &results.albums));
        }
        if !results.artists.is_empty() {
            sections.push(self.format_artists(&results.artists));
        }
        if !results.playlists.is_empty() {
            sections.push(self.format_playlists("Playlists", &results.playlists));
        }
        sections.join("\n\n")
    }

    /// Formats a playlist with its cover and tracks.
    pub fn format_playlist_details(&self, details: &PlaylistDetails) -> String {
        let summary = &details.summary;
        let mut lines = vec![
            format!("{} by {}", self.bold(&summary.name), self.cyan(&summary.owner_name)),
            format!("Cover: {}", self.dim(&summary.image_url)),
        ];
        let hidden = details.unplayable_count();
        if hidden > 0 {
            lines.push(self.yellow(&format!(
                "{hidden} of {} tracks are not playable and were hidden",
                details.raw_track_count
            )));
        }
        lines.push(String::new());
        lines.push(self.format_tracks("Tracks", &details.tracks));
        lines.join("\n")
    }

    /// Formats tracks loaded through the pager.
    pub fn format_paged_tracks(&self, output: &PagedTracksOutput) -> String {
        let mut lines = vec![self.format_tracks(
            &format!("Playlist {}", output.playlist_id),
            &output.tracks,
        )];
        let more = if output.has_more {
            self.yellow("more available")
        } else {
            self.green("complete")
        };
        lines.push(String::new());
        lines.push(format!("{} page(s) loaded, {more}", output.pages_loaded));
        if let Some(error) = &output.error {
            lines.push(self.red(&format!("Stopped: {error}")));
        }
        lines.join("\n")
    }

    /// Formats an album header followed by its tracks.
    pub fn format_album(&self, album: &Album, tracks: &[Track]) -> String {
        let year = album.release_year.as_deref().unwrap_or("unknown year");
        [
            format!("{} by {}", self.bold(&album.name), self.cyan(&album.artist_name)),
            format!("Released: {year}"),
            format!("Cover: {}", self.dim(&album.image_url)),
            String::new(),
            self.format_tracks("Tracks", tracks),
        ]
        .join("\n")
    }

    /// Formats a genre feed, reporting each failed half on its own.
    pub fn format_genre_feed(&self, feed: &GenreFeed) -> String {
        let albums = self.section(&feed.albums, |albums| {
            self.format_albums(&format!("{} albums", feed.genre), albums)
        });
        let playlists = self.section(&feed.playlists, |playlists| {
            self.format_playlists(&format!("{} playlists", feed.genre), playlists)
        });
        format!("{albums}\n\n{playlists}")
    }

    fn section<T>(&self, resource: &FetchedResource<T>, render: impl FnOnce(&T) -> String) -> String {
        match (resource.cause(), resource.data()) {
            (None, Some(data)) => render(data),
            (Some(kind), _) => self.red(&format!("{} ({kind})", kind.message())),
            (None, None) => String::new(),
        }
    }

    // ------------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------------

    /// Formats the credential state.
    pub fn format_token(&self, token: &TokenOutput) -> String {
        let mut lines = vec![self.bold("Spotify credential"), "─".repeat(40)];
        if !token.configured {
            lines.push(self.yellow("Not configured"));
        }
        if let (Some(issued), Some(expires)) = (token.issued_at, token.expires_at) {
            lines.push(format!("Status:     {}", self.green("valid")));
            lines.push(format!("Issued:     {}", issued.to_rfc3339()));
            lines.push(format!("Expires:    {}", expires.to_rfc3339()));
        }
        if let Some(ttl) = token.ttl_secs {
            lines.push(format!("Lifetime:   {ttl}s"));
        }
        if token.configured {
            lines.push(format!(
                "Refreshable: {}",
                if token.has_refresh_token { "yes" } else { "no" }
            ));
        }
        if let Some(error) = &token.error {
            lines.push(format!("Error:      {}", self.red(error)));
        }
        lines.join("\n")
    }

    /// Formats the effective configuration.
    pub fn format_config(&self, config: &ConfigOutput) -> String {
        let file_state = if config.config_file_exists {
            self.green("found")
        } else {
            self.dim("not found, using defaults")
        };
        let set = |flag: bool| if flag { "set" } else { "not set" };
        [
            self.bold("Musify Configuration"),
            "─".repeat(40),
            format!("Config file: {} ({file_state})", config.config_file),
            String::new(),
            self.bold("Spotify"),
            format!(
                "  Client id:     {}",
                config.spotify_client_id.as_deref().unwrap_or("not set")
            ),
            format!("  Client secret: {}", set(config.spotify_client_secret_set)),
            format!("  Market:        {}", config.market),
            format!("  Token URL:     {}", config.spotify_token_url),
            format!("  API base URL:  {}", config.spotify_api_base_url),
            String::new(),
            self.bold("Jamendo"),
            format!("  Client id:     {}", set(config.jamendo_client_id_set)),
            format!("  API base URL:  {}", config.jamendo_api_base_url),
            String::new(),
            format!("Page size: {}", config.page_size),
            format!("Timeout:   {}s", config.timeout_secs),
            format!("Hi-DPI images: {}", config.high_density_display),
            format!("Log level: {}", config.log_level),
        ]
        .join("\n")
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn header(&self, title: &str, count: usize) -> String {
        format!("{} {}", self.bold(title), self.dim(&format!("({count})")))
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

/// Shortens `text` to `max` characters, ending in an ellipsis when cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Formats a count with k/M suffixes.
pub fn format_count(n: u64) -> String {
    #[allow(clippy::cast_precision_loss)]
    let value = n as f64;
    if n >= 1_000_000 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}k", value / 1_000.0)
    } else {
        n.to_string()
    }
}
