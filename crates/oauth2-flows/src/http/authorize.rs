//! Authorization endpoint handler.
//!
//! # Usage
//!
//! ```ignore
//! use axum::{Router, routing::get};
//! use oauth2_flows::http::authorize_handler;
//!
//! let app = Router::new()
//!     .route("/authorize", get(authorize_handler).post(authorize_handler))
//!     .with_state(Arc::new(flow));
//! ```
//!
//! # Responses
//!
//! - `302 Found` to `<redirect_uri>?code=...` on success in redirect mode
//! - `200 OK` with `{"authCode": ..., "state": ...}` in direct mode
//! - `302 Found` to `<redirect_uri>?error=...` once the redirect URI is
//!   validated, otherwise the JSON error object
//!
//! Control characters and non-ASCII bytes in a `Location` target are
//! percent-encoded so a decoded `state` always fits in the header.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

use percent_encoding::{CONTROLS, utf8_percent_encode};

use crate::error::OAuthError;
use crate::oauth::{AuthorizationFailure, AuthorizationGrantFlow, AuthorizationOutcome};
use crate::request::OAuthRequest;

/// Runs the authorization code grant for one request.
pub async fn authorize_handler(
    State(flow): State<Arc<AuthorizationGrantFlow>>,
    request: OAuthRequest,
) -> Response {
    match flow.authorize(&request).await {
        Ok(AuthorizationOutcome::Redirect(url)) => found(&url),
        Ok(AuthorizationOutcome::Direct(response)) => Json(response).into_response(),
        Err(failure) => failure.into_response(),
    }
}

impl IntoResponse for AuthorizationFailure {
    fn into_response(self) -> Response {
        match self.redirect_url() {
            Some(url) => found(&url),
            None => self.into_error().into_response(),
        }
    }
}

/// Builds a `302 Found` response to `url`.
fn found(url: &str) -> Response {
    let target = location_target(url);
    match HeaderValue::from_str(&target) {
        Ok(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Redirect target is not a valid header value");
            OAuthError::server_error(e).into_response()
        }
    }
}

/// Percent-encodes the bytes a header value cannot carry.
fn location_target(url: &str) -> String {
    utf8_percent_encode(url, CONTROLS).to_string()
}
