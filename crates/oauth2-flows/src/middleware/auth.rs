//! Bearer token authentication extractor.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::get};
//! use oauth2_flows::middleware::{BearerAuth, ResourceState};
//!
//! async fn protected_handler(BearerAuth(auth): BearerAuth) -> String {
//!     format!("scopes: {}", auth.scopes.join(" "))
//! }
//!
//! let app = Router::new()
//!     .route("/protected", get(protected_handler))
//!     .with_state(ResourceState::new(store).with_required_scopes(["read"]));
//! ```

use std::sync::Arc;

use axum::extract::{FromRef, FromRequest, Request};

use crate::error::OAuthError;
use crate::request::OAuthRequest;
use crate::storage::AccessTokenStorage;
use crate::token::{AuthorisedRequest, TokenValidationFlow};

// =============================================================================
// Resource State
// =============================================================================

/// State required for bearer token authentication.
///
/// Include it in your application state and expose it to [`BearerAuth`]
/// via `FromRef`.
///
/// ```ignore
/// #[derive(Clone)]
/// struct AppState {
///     resource: ResourceState,
/// }
///
/// impl FromRef<AppState> for ResourceState {
///     fn from_ref(state: &AppState) -> Self {
///         state.resource.clone()
///     }
/// }
/// ```
#[derive(Clone)]
pub struct ResourceState {
    flow: Arc<TokenValidationFlow>,
}

impl ResourceState {
    /// Creates a resource state that requires no particular scope.
    pub fn new(token_storage: Arc<dyn AccessTokenStorage>) -> Self {
        Self::from_flow(TokenValidationFlow::new(token_storage))
    }

    /// Wraps a configured validation flow.
    pub fn from_flow(flow: TokenValidationFlow) -> Self {
        Self {
            flow: Arc::new(flow),
        }
    }

    /// Sets the scopes every request must carry.
    #[must_use]
    pub fn with_required_scopes<S: Into<String>>(
        self,
        scopes: impl IntoIterator<Item = S>,
    ) -> Self {
        let flow = TokenValidationFlow::clone(&self.flow).with_required_scopes(scopes);
        Self::from_flow(flow)
    }

    /// Returns the validation flow.
    #[must_use]
    pub fn flow(&self) -> &TokenValidationFlow {
        &self.flow
    }
}

// =============================================================================
// Bearer Auth Extractor
// =============================================================================

/// Axum extractor that validates the bearer token on a request.
///
/// The whole request is consumed because the token may travel in a form
/// body, so this must be the last extractor of a handler.
///
/// # Errors
///
/// Rejects with [`OAuthError`], which renders as the JSON error object with
/// a `WWW-Authenticate` challenge for `invalid_token`.
pub struct BearerAuth(pub AuthorisedRequest);

impl<S> FromRequest<S> for BearerAuth
where
    S: Send + Sync,
    ResourceState: FromRef<S>,
{
    type Rejection = OAuthError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let resource = ResourceState::from_ref(state);
        let request = OAuthRequest::from_request(req, state).await?;

        let authorised = resource.flow.validate(&request).await?;

        tracing::debug!(
            user = authorised.user.as_ref().map(|u| u.id.as_str()),
            scopes = %authorised.scopes.join(" "),
            "Request authorised"
        );

        Ok(BearerAuth(authorised))
    }
}
