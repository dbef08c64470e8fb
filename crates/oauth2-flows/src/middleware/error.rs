//! Error responses for OAuth errors.
//!
//! Errors are rendered as the RFC 6749 JSON error object
//! `{"error": ..., "error_description": ...}` with the status of the error
//! kind. Internal causes are never rendered.

use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::{ErrorKind, OAuthError};

/// Realm advertised in `WWW-Authenticate` challenges.
pub const REALM: &str = "Service";

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for OAuthError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut headers = HeaderMap::new();
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

        if let Some(challenge) = build_www_authenticate_header(&self) {
            if let Ok(value) = HeaderValue::from_str(&challenge) {
                headers.insert(header::WWW_AUTHENTICATE, value);
            }
        }

        (status, headers, Json(error_json(&self))).into_response()
    }
}

/// Returns the JSON error object for an error.
#[must_use]
pub fn error_json(error: &OAuthError) -> serde_json::Value {
    json!({
        "error": error.kind().as_str(),
        "error_description": error.description(),
    })
}

/// Builds the `WWW-Authenticate` challenge for errors that carry one.
///
/// `invalid_token` gets a Bearer challenge (RFC 6750 section 3),
/// `invalid_client` a Basic one (RFC 6749 section 5.2).
fn build_www_authenticate_header(error: &OAuthError) -> Option<String> {
    match error.kind() {
        ErrorKind::InvalidToken => {
            let escaped = error.description().replace('"', "\\\"");
            Some(format!(
                "Bearer realm=\"{REALM}\", error=\"invalid_token\", error_description=\"{escaped}\""
            ))
        }
        ErrorKind::InvalidClient => Some(format!("Basic realm=\"{REALM}\"")),
        _ => None,
    }
}
