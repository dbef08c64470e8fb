//! HTTP middleware for protected resources.
//!
//! - [`auth`] - the [`BearerAuth`] extractor and its [`ResourceState`]
//! - [`error`] - `IntoResponse` for [`OAuthError`](crate::error::OAuthError)

pub mod auth;
pub mod error;

pub use auth::{BearerAuth, ResourceState};
pub use error::{REALM, error_json};
