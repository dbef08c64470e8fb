//! Resource owner consent.
//!
//! The grant flow asks a caller-supplied [`ConsentCheck`] whether the user
//! behind the request approved it. How that is decided (session cookie,
//! login form, pre-authenticated first-party app) is up to the caller.

use async_trait::async_trait;

use crate::error::BoxError;
use crate::request::OAuthRequest;
use crate::types::User;

/// Outcome of a consent check.
#[derive(Debug, Clone, PartialEq)]
pub struct Consent {
    /// Whether the resource owner approved the request.
    pub allowed: bool,

    /// The approving user, if one is known.
    pub user: Option<User>,
}

impl Consent {
    /// Consent granted, optionally by a known user.
    #[must_use]
    pub fn granted(user: Option<User>) -> Self {
        Self {
            allowed: true,
            user,
        }
    }

    /// Consent refused.
    #[must_use]
    pub fn denied() -> Self {
        Self {
            allowed: false,
            user: None,
        }
    }
}

/// Decides whether the resource owner approved an authorization request.
///
/// Closures with the signature
/// `Fn(&OAuthRequest) -> Result<Consent, BoxError>` implement this trait.
#[async_trait]
pub trait ConsentCheck: Send + Sync {
    /// Checks consent for the given request.
    ///
    /// # Errors
    ///
    /// Returns an error if consent could not be determined; the grant flow
    /// reports it as `server_error`.
    async fn check(&self, request: &OAuthRequest) -> Result<Consent, BoxError>;
}

#[async_trait]
impl<F> ConsentCheck for F
where
    F: Fn(&OAuthRequest) -> Result<Consent, BoxError> + Send + Sync,
{
    async fn check(&self, request: &OAuthRequest) -> Result<Consent, BoxError> {
        self(request)
    }
}
