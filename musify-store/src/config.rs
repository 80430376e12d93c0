//! Configuration management.
//!
//! The config file is JSON at [`default_config_path`]. It may hold the
//! Spotify client secret, so saves are atomic and owner-only. Every section is
//! optional; unset endpoint fields mean the catalog's public default.
//! Environment variables override the file:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `MUSIFY_SPOTIFY_CLIENT_ID` | `spotify.client_id` |
//! | `MUSIFY_SPOTIFY_CLIENT_SECRET` | `spotify.client_secret` |
//! | `MUSIFY_JAMENDO_CLIENT_ID` | `jamendo.client_id` |
//! | `MUSIFY_MARKET` | `spotify.market` |

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::StoreError;

/// Environment variable for the Spotify client id.
pub const ENV_SPOTIFY_CLIENT_ID: &str = "MUSIFY_SPOTIFY_CLIENT_ID";
/// Environment variable for the Spotify client secret.
pub const ENV_SPOTIFY_CLIENT_SECRET: &str = "MUSIFY_SPOTIFY_CLIENT_SECRET";
/// Environment variable for the Jamendo client id.
pub const ENV_JAMENDO_CLIENT_ID: &str = "MUSIFY_JAMENDO_CLIENT_ID";
/// Environment variable for the Spotify market.
pub const ENV_MARKET: &str = "MUSIFY_MARKET";

/// Directory holding the config file.
///
/// - macOS: `~/Library/Application Support/Musify`
/// - elsewhere: `<config dir>/musify`, e.g. `~/.config/musify`
pub fn default_config_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    let base = dirs::home_dir().map(|h| h.join("Library").join("Application Support").join("Musify"));
    #[cfg(not(target_os = "macos"))]
    let base = dirs::config_dir().map(|c| c.join("musify"));

    base.unwrap_or_else(|| PathBuf::from("."))
}

/// Path of the config file.
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.json")
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Commercial catalog.
    #[serde(default)]
    pub spotify: SpotifyConfig,
    /// Open-content catalog.
    #[serde(default)]
    pub jamendo: JamendoConfig,
    /// Paged list sizing.
    #[serde(default)]
    pub paging: PagingConfig,
    /// Network behavior.
    #[serde(default)]
    pub network: NetworkConfig,
    /// Default log filter level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Spotify settings.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotifyConfig {
    /// OAuth client id.
    pub client_id: Option<String>,
    /// OAuth client secret.
    pub client_secret: Option<String>,
    /// Market code, e.g. `US`.
    pub market: Option<String>,
    /// Token endpoint override.
    pub token_url: Option<String>,
    /// Web API base URL override.
    pub api_base_url: Option<String>,
}

impl std::fmt::Debug for SpotifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyConfig")
            .field("client_id", &self.client_id)
            .field("market", &self.market)
            .field("token_url", &self.token_url)
            .field("api_base_url", &self.api_base_url)
            .finish_non_exhaustive()
    }
}

/// Jamendo settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JamendoConfig {
    /// API client id.
    pub client_id: Option<String>,
    /// API base URL override.
    pub api_base_url: Option<String>,
}

/// Paging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingConfig {
    /// Items per page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

/// Network settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Request high-resolution artwork.
    #[serde(default)]
    pub high_density_display: bool,
}

fn default_page_size() -> u32 {
    20
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            high_density_display: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spotify: SpotifyConfig::default(),
            jamendo: JamendoConfig::default(),
            paging: PagingConfig::default(),
            network: NetworkConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        default_config_path()
    }

    /// Loads configuration from the default path and applies the environment.
    pub async fn load() -> Result<Self, StoreError> {
        let config = Self::load_from(&Self::default_path()).await?;
        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    /// Loads configuration from a specific path.
    ///
    /// A missing file yields the defaults; a malformed one is an error.
    pub async fn load_from(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Saves configuration to the default path.
    pub async fn save(&self) -> Result<(), StoreError> {
        self.save_to(&Self::default_path()).await
    }

    /// Saves configuration to a specific path.
    ///
    /// Writes a sibling temp file and renames it over `path`. A newly created
    /// config directory is `0700` and the file `0600` on Unix.
    pub async fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(dir) = path.parent().filter(|dir| !dir.exists()) {
            debug!(path = %dir.display(), "Creating config directory");
            tokio::fs::create_dir_all(dir).await?;
            restrict(dir, 0o700).await?;
        }

        let json = serde_json::to_string_pretty(self)?;
        let staged = path.with_extension("json.tmp");
        tokio::fs::write(&staged, json).await?;
        restrict(&staged, 0o600).await?;
        tokio::fs::rename(&staged, path).await?;

        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Overrides fields from environment variables read through `lookup`.
    ///
    /// Empty values are ignored.
    #[must_use]
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(id) = get(ENV_SPOTIFY_CLIENT_ID) {
            self.spotify.client_id = Some(id);
        }
        if let Some(secret) = get(ENV_SPOTIFY_CLIENT_SECRET) {
            self.spotify.client_secret = Some(secret);
        }
        if let Some(id) = get(ENV_JAMENDO_CLIENT_ID) {
            self.jamendo.client_id = Some(id);
        }
        if let Some(market) = get(ENV_MARKET) {
            self.spotify.market = Some(market);
        }
        self
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.paging.page_size == 0 {
            return Err(StoreError::Config("paging.page_size must be positive".to_string()));
        }
        if self.network.timeout_secs == 0 {
            return Err(StoreError::Config(
                "network.timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns true if Spotify client credentials are present.
    pub fn has_spotify_credentials(&self) -> bool {
        self.spotify.client_id.is_some() && self.spotify.client_secret.is_some()
    }
}

#[cfg(unix)]
async fn restrict(path: &Path, mode: u32) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn restrict(_path: &Path, _mode: u32) -> Result<(), StoreError> {
    Ok(())
}
