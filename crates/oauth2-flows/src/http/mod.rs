//! Axum integration for the authorization endpoint.
//!
//! - [`authorize`] - the authorization endpoint handler
//! - [`extract`] - `FromRequest` for [`OAuthRequest`](crate::request::OAuthRequest)

pub mod authorize;
pub mod extract;

pub use authorize::authorize_handler;
pub use extract::MAX_BODY_BYTES;
