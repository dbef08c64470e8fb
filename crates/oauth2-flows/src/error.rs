//! OAuth 2.0 protocol error types.
//!
//! Every failure produced by the flows in this crate is an [`OAuthError`]:
//! a protocol error kind from a fixed enumeration, a description that is
//! safe to return to the remote caller, and an optional internal cause.
//!
//! Errors are built through [`OAuthError::new`] (or one of the shorthand
//! constructors that delegate to it). Supplying a cause always produces a
//! `server_error` with the generic description, so internal failure
//! messages never reach the wire.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Boxed error returned by external collaborators (storage, consent checks).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// OAuth 2.0 error kinds recognised by the flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or missing parameter, or a scope mismatch.
    InvalidRequest,

    /// Client lookup failed or the client credentials are invalid.
    InvalidClient,

    /// The resource owner declined the authorization request.
    AccessDenied,

    /// The bearer token is absent, unknown, or expired.
    InvalidToken,

    /// An unexpected failure in a collaborator (storage, generator, consent).
    ServerError,
}

impl ErrorKind {
    /// Returns the wire representation of the error kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::InvalidClient => "invalid_client",
            Self::AccessDenied => "access_denied",
            Self::InvalidToken => "invalid_token",
            Self::ServerError => "server_error",
        }
    }

    /// Returns the HTTP status code reported for this kind.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest | Self::InvalidClient => 400,
            Self::AccessDenied => 403,
            Self::InvalidToken => 401,
            Self::ServerError => 503,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An OAuth 2.0 protocol error.
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {description}")]
pub struct OAuthError {
    kind: ErrorKind,
    description: String,
    #[source]
    cause: Option<BoxError>,
}

impl OAuthError {
    /// Builds an error of the given kind.
    ///
    /// When `cause` is present the kind is forced to
    /// [`ErrorKind::ServerError`] and `description` is ignored: the external
    /// description of an internal failure is always the generic kind text.
    /// A missing description defaults to the kind's wire string.
    #[must_use]
    pub fn new(kind: ErrorKind, description: Option<String>, cause: Option<BoxError>) -> Self {
        match cause {
            Some(cause) => Self {
                kind: ErrorKind::ServerError,
                description: ErrorKind::ServerError.as_str().to_string(),
                cause: Some(cause),
            },
            None => Self {
                kind,
                description: description.unwrap_or_else(|| kind.as_str().to_string()),
                cause: None,
            },
        }
    }

    /// Creates an error carrying only its kind.
    #[must_use]
    pub fn from_kind(kind: ErrorKind) -> Self {
        Self::new(kind, None, None)
    }

    /// Creates a new `invalid_request` error.
    #[must_use]
    pub fn invalid_request(description: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRequest, Some(description.into()), None)
    }

    /// Creates a new `invalid_client` error.
    #[must_use]
    pub fn invalid_client(description: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidClient, Some(description.into()), None)
    }

    /// Creates a new `access_denied` error.
    #[must_use]
    pub fn access_denied(description: impl Into<String>) -> Self {
        Self::new(ErrorKind::AccessDenied, Some(description.into()), None)
    }

    /// Creates a new `invalid_token` error.
    #[must_use]
    pub fn invalid_token(description: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidToken, Some(description.into()), None)
    }

    /// Wraps a collaborator failure as a `server_error`.
    #[must_use]
    pub fn server_error(cause: impl Into<BoxError>) -> Self {
        Self::new(ErrorKind::ServerError, None, Some(cause.into()))
    }

    /// Returns the error kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the description that may be shown to the remote caller.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    /// Returns the wrapped internal cause, if any.
    ///
    /// For diagnostics only; never include this in a response.
    #[must_use]
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Builds the error redirect for a validated redirect URI.
    ///
    /// Format: `<redirect_uri>?error=<kind>&error_description=<description>&code=<status>`.
    #[must_use]
    pub fn to_redirect_url(&self, redirect_uri: &str) -> String {
        format!(
            "{}?error={}&error_description={}&code={}",
            redirect_uri,
            self.kind.as_str(),
            self.description,
            self.status_code()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn test_error_display() {
        let err = OAuthError::invalid_request("Invalid or missing scope parameter");
        assert_eq!(
            err.to_string(),
            "invalid_request: Invalid or missing scope parameter"
        );

        let err = OAuthError::from_kind(ErrorKind::InvalidToken);
        assert_eq!(err.to_string(), "invalid_token: invalid_token");
    }

    #[test]
    fn test_description_defaults_to_kind() {
        let err = OAuthError::new(ErrorKind::InvalidRequest, None, None);
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        assert_eq!(err.description(), "invalid_request");
        assert!(err.cause().is_none());
    }

    #[test]
    fn test_cause_forces_server_error() {
        let cause = io::Error::other("connection refused by db-01:5432");
        let err = OAuthError::new(
            ErrorKind::InvalidClient,
            Some("Invalid client credentials".to_string()),
            Some(Box::new(cause)),
        );

        assert_eq!(err.kind(), ErrorKind::ServerError);
        assert_eq!(err.description(), "server_error");
        assert!(!err.to_string().contains("db-01"));
        assert!(err.cause().is_some());
        assert!(err.source().unwrap().to_string().contains("db-01"));
    }

    #[test]
    fn test_server_error_shorthand() {
        let err = OAuthError::server_error("disk full");
        assert_eq!(err.kind(), ErrorKind::ServerError);
        assert_eq!(err.status_code(), 503);
        assert_eq!(err.description(), "server_error");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ErrorKind::InvalidRequest.status_code(), 400);
        assert_eq!(ErrorKind::InvalidClient.status_code(), 400);
        assert_eq!(ErrorKind::AccessDenied.status_code(), 403);
        assert_eq!(ErrorKind::InvalidToken.status_code(), 401);
        assert_eq!(ErrorKind::ServerError.status_code(), 503);
    }

    #[test]
    fn test_error_redirect_url() {
        let err = OAuthError::access_denied("The user denied access to your application");
        assert_eq!(
            err.to_redirect_url("https://app/cb"),
            "https://app/cb?error=access_denied&error_description=The user denied access to your application&code=403"
        );
    }

    #[test]
    fn test_kind_serde_names() {
        assert_eq!(
            serde_json::to_string(&ErrorKind::AccessDenied).unwrap(),
            "\"access_denied\""
        );
        let kind: ErrorKind = serde_json::from_str("\"invalid_token\"").unwrap();
        assert_eq!(kind, ErrorKind::InvalidToken);
    }
}
