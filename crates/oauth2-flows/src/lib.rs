//! # oauth2-flows
//!
//! Server-side OAuth 2.0 protocol flows.
//!
//! This crate provides:
//! - The authorization code grant: issuing a code to a redirecting client
//! - Bearer token validation with scope enforcement for protected resources
//! - A sequential step runner that drives both flows
//!
//! ## Overview
//!
//! Each flow is an ordered list of steps run by [`runner::StepRunner`]
//! against a per-request context. Storage, code generation, and resource
//! owner consent are supplied by the caller through traits, so the flows
//! contain only protocol logic, ordering, and failure semantics.
//!
//! ## Modules
//!
//! - [`config`] - Flow configuration
//! - [`error`] - OAuth error taxonomy
//! - [`runner`] - Sequential step execution
//! - [`oauth`] - Authorization code grant flow
//! - [`token`] - Bearer token validation flow
//! - [`storage`] - Storage traits and an in-memory backend
//! - [`http`] - Axum handler and request extraction
//! - [`middleware`] - Bearer token extractor and error responses
//! - [`observability`] - Tracing setup

pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod oauth;
pub mod observability;
pub mod request;
pub mod runner;
pub mod scope;
pub mod storage;
pub mod token;
pub mod types;

pub use config::{ConfigError, OAuthConfig, ResponseMode, load_config};
pub use error::{BoxError, ErrorKind, OAuthError};
pub use http::authorize_handler;
pub use middleware::{BearerAuth, ResourceState};
pub use oauth::{
    AuthorizationFailure, AuthorizationGrantFlow, AuthorizationOutcome, AuthorizationResponse,
    Consent, ConsentCheck, GrantContext, RandomTokenGenerator, TokenGenerator, TokenKind,
};
pub use request::OAuthRequest;
pub use runner::{StepContext, StepRunner};
pub use storage::{AccessTokenStorage, AuthCodeStorage, ClientStorage, MemoryStore};
pub use token::{AuthorisedRequest, TokenValidationFlow};
pub use types::{AccessToken, AuthorizationCode, Client, RedirectUris, TokenExpiry, User};

/// Type alias for OAuth flow results.
pub type OAuthResult<T> = Result<T, OAuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use oauth2_flows::prelude::*;
/// ```
pub mod prelude {
    pub use crate::OAuthResult;
    pub use crate::config::{OAuthConfig, ResponseMode};
    pub use crate::error::{BoxError, ErrorKind, OAuthError};
    pub use crate::http::authorize_handler;
    pub use crate::middleware::{BearerAuth, ResourceState};
    pub use crate::oauth::{
        AuthorizationFailure, AuthorizationGrantFlow, AuthorizationOutcome, Consent,
        ConsentCheck, RandomTokenGenerator, TokenGenerator,
    };
    pub use crate::request::OAuthRequest;
    pub use crate::storage::{AccessTokenStorage, AuthCodeStorage, ClientStorage, MemoryStore};
    pub use crate::token::{AuthorisedRequest, TokenValidationFlow};
    pub use crate::types::{AccessToken, AuthorizationCode, Client, TokenExpiry, User};
}
