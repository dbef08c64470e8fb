//! Domain types shared by the flows and the storage traits.
//!
//! - [`Client`] - registered OAuth 2.0 client
//! - [`RedirectUris`] - one or several registered redirect URIs
//! - [`User`] - resource owner resolved by consent or token lookup
//! - [`AuthorizationCode`] - code issued by the grant flow
//! - [`AccessToken`] - stored bearer token record

pub mod client;
pub mod token;
pub mod user;

pub use client::{Client, RedirectUris};
pub use token::{AccessToken, AuthorizationCode, TokenExpiry};
pub use user::User;
