//! JSON output formatting.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use musify_core::Track;
use musify_fetch::BearerToken;
use musify_providers::CatalogConfig;

// ============================================================================
// Output Types
// ============================================================================

/// Credential state. Never carries the token itself.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenOutput {
    pub configured: bool,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_datetime_opt")]
    pub issued_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_datetime_opt")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl_secs: Option<u64>,
    pub has_refresh_token: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TokenOutput {
    /// State of a freshly obtained credential.
    pub fn from_token(token: &BearerToken) -> Self {
        Self {
            configured: true,
            issued_at: Some(token.issued_at()),
            expires_at: Some(token.expires_at()),
            ttl_secs: Some(token.ttl_secs()),
            has_refresh_token: token.refresh_token().is_some(),
            error: None,
        }
    }

    /// State when no credential could be obtained.
    pub fn unavailable(configured: bool, error: impl Into<String>) -> Self {
        Self {
            configured,
            issued_at: None,
            expires_at: None,
            ttl_secs: None,
            has_refresh_token: false,
            error: Some(error.into()),
        }
    }
}

/// Effective configuration with secrets reduced to presence flags.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOutput {
    pub config_file: String,
    pub config_file_exists: bool,
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret_set: bool,
    pub market: String,
    pub spotify_token_url: String,
    pub spotify_api_base_url: String,
    pub jamendo_client_id_set: bool,
    pub jamendo_api_base_url: String,
    pub page_size: u32,
    pub timeout_secs: u64,
    pub high_density_display: bool,
    pub log_level: String,
}

impl ConfigOutput {
    /// Summarizes `config` as resolved into `catalog`.
    pub fn new(
        path: &std::path::Path,
        config: &musify_store::Config,
        catalog: &CatalogConfig,
    ) -> Self {
        Self {
            config_file: path.display().to_string(),
            config_file_exists: path.exists(),
            spotify_client_id: catalog.spotify.client_id.clone(),
            spotify_client_secret_set: catalog.spotify.client_secret.is_some(),
            market: catalog.spotify.market.clone(),
            spotify_token_url: catalog.spotify.token_url.clone(),
            spotify_api_base_url: catalog.spotify.api_base_url.clone(),
            jamendo_client_id_set: !catalog.jamendo.client_id.is_empty(),
            jamendo_api_base_url: catalog.jamendo.api_base_url.clone(),
            page_size: config.paging.page_size,
            timeout_secs: config.network.timeout_secs,
            high_density_display: config.network.high_density_display,
            log_level: config.log_level.clone(),
        }
    }
}

/// Tracks loaded page by page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedTracksOutput {
    pub playlist_id: String,
    pub pages_loaded: usize,
    pub has_more: bool,
    pub tracks: Vec<Track>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// Serialization Helpers
// ============================================================================

#[allow(clippy::ref_option)]
fn serialize_datetime_opt<S>(dt: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match dt {
        Some(dt) => serializer.serialize_str(&dt.to_rfc3339()),
        None => serializer.serialize_none(),
    }
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON output formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }
}
