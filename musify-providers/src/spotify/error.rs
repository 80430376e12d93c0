//! Spotify error bodies.
//!
//! Spotify signals failures with the HTTP status plus a JSON body of the form
//! `{"error": {"status": 401, "message": "The access token expired"}}`.

use musify_fetch::FetchError;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

/// Replaces a raw error body with Spotify's error message when present.
pub(crate) fn refine(err: FetchError) -> FetchError {
    match err {
        FetchError::Status { status, message } => {
            let message = serde_json::from_str::<ErrorBody>(&message)
                .ok()
                .map(|body| body.error.message)
                .filter(|m| !m.is_empty())
                .unwrap_or(message);
            FetchError::Status { status, message }
        }
        other => other,
    }
}
