//! Axum extraction of [`OAuthRequest`].
//!
//! The query string is decoded with `serde_urlencoded`. The body is decoded
//! according to its content type:
//!
//! - `application/x-www-form-urlencoded` - form fields
//! - `application/json` - top-level string members of a JSON object
//!
//! Any other body, and an empty one, leaves the body source absent.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};

use crate::error::OAuthError;
use crate::request::{FORM_URLENCODED, OAuthRequest, Params};

/// Upper bound on buffered request bodies.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

const JSON: &str = "application/json";

impl<S> FromRequest<S> for OAuthRequest
where
    S: Send + Sync,
{
    type Rejection = OAuthError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let (parts, body) = req.into_parts();

        let query = parts.uri.query().map(decode_form).transpose()?;
        let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
            .await
            .map_err(|e| {
                tracing::debug!(error = %e, "Failed to read request body");
                OAuthError::invalid_request("Unreadable request body")
            })?;

        let request = OAuthRequest::from_parts(parts.method, parts.headers, query, None);
        let body = decode_body(&request, &bytes)?;
        Ok(request.with_body_params(body))
    }
}

fn decode_body(request: &OAuthRequest, bytes: &Bytes) -> Result<Option<Params>, OAuthError> {
    if bytes.is_empty() {
        return Ok(None);
    }

    if request.is_content_type(FORM_URLENCODED) {
        return decode_form_bytes(bytes).map(Some);
    }

    if request.is_content_type(JSON) {
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(bytes)
            .map_err(|e| {
                tracing::debug!(error = %e, "Invalid JSON request body");
                OAuthError::invalid_request("Invalid request body")
            })?;

        let params = object
            .into_iter()
            .filter_map(|(key, value)| match value {
                serde_json::Value::String(s) => Some((key, s)),
                _ => None,
            })
            .collect();
        return Ok(Some(params));
    }

    Ok(None)
}

fn decode_form(raw: &str) -> Result<Params, OAuthError> {
    decode_form_bytes(raw.as_bytes())
}

fn decode_form_bytes(raw: &[u8]) -> Result<Params, OAuthError> {
    // Later duplicates win
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(raw).map_err(|e| {
        tracing::debug!(error = %e, "Invalid form encoding");
        OAuthError::invalid_request("Invalid request parameters")
    })?;
    Ok(pairs.into_iter().collect())
}
