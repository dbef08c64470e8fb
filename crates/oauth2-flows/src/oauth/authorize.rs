//! Authorization code grant flow.
//!
//! [`AuthorizationGrantFlow`] handles requests to the authorization
//! endpoint:
//!
//! 1. `check_params` - read and validate the request parameters
//! 2. `check_client` - resolve the client, match redirect URI and scopes
//! 3. `check_user_approval` - ask the consent check
//! 4. `generate_code` - produce the authorization code
//! 5. `save_auth_code` - persist the code with its expiry
//! 6. `redirect` - redirect to the client or return the code directly
//!
//! Once `check_client` succeeds the redirect URI is trusted. From that
//! point on a failure carries the redirect URI so the caller can report it
//! to the client with an error redirect; before it, errors must be shown
//! directly.
//!
//! # Example
//!
//! ```ignore
//! let flow = AuthorizationGrantFlow::new(store.clone(), store, generator, consent)
//!     .with_config(&config);
//!
//! match flow.authorize(&request).await {
//!     Ok(AuthorizationOutcome::Redirect(url)) => redirect_to(url),
//!     Ok(AuthorizationOutcome::Direct(response)) => json(response),
//!     Err(failure) => match failure.redirect_url() {
//!         Some(url) => redirect_to(url),
//!         None => render_error(failure.into_error()),
//!     },
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use time::OffsetDateTime;

use crate::OAuthResult;
use crate::config::{OAuthConfig, ResponseMode};
use crate::error::{ErrorKind, OAuthError};
use crate::request::OAuthRequest;
use crate::runner::{StepContext, StepRunner};
use crate::scope::parse_scope;
use crate::storage::{AuthCodeStorage, ClientStorage};
use crate::types::{AuthorizationCode, Client, User};

use super::consent::ConsentCheck;
use super::generator::{TokenGenerator, TokenKind};

// =============================================================================
// Steps
// =============================================================================

/// Steps of the authorization code grant, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantStep {
    /// Read and validate request parameters.
    CheckParams,
    /// Resolve the client and validate redirect URI and scopes.
    CheckClient,
    /// Ask the consent check.
    CheckUserApproval,
    /// Generate the authorization code.
    GenerateCode,
    /// Persist the authorization code.
    SaveAuthCode,
    /// Produce the final redirect or direct result.
    Redirect,
}

const GRANT_STEPS: &[GrantStep] = &[
    GrantStep::CheckParams,
    GrantStep::CheckClient,
    GrantStep::CheckUserApproval,
    GrantStep::GenerateCode,
    GrantStep::SaveAuthCode,
    GrantStep::Redirect,
];

const GRANT_RUNNER: StepRunner<GrantStep> = StepRunner::new("authorization_code", GRANT_STEPS);

// =============================================================================
// Outcome
// =============================================================================

/// Code and state returned to callers that do not redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationResponse {
    /// The issued authorization code.
    #[serde(rename = "authCode")]
    pub code: String,

    /// The `state` parameter from the request, echoed verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl AuthorizationResponse {
    /// Builds the success redirect.
    ///
    /// Format: `<redirect_uri>?code=<code>[&state=<state>]`.
    #[must_use]
    pub fn to_redirect_url(&self, redirect_uri: &str) -> String {
        let mut url = format!("{}?code={}", redirect_uri, self.code);
        if let Some(state) = &self.state {
            url.push_str("&state=");
            url.push_str(state);
        }
        url
    }
}

/// Successful result of the grant flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationOutcome {
    /// Redirect the user agent to this URL.
    Redirect(String),
    /// Hand the code to the caller directly.
    Direct(AuthorizationResponse),
}

/// Failed result of the grant flow.
///
/// `redirect_uri` is present only when the failure happened after the
/// redirect URI was validated and the flow is configured for redirects.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct AuthorizationFailure {
    error: OAuthError,
    redirect_uri: Option<String>,
}

impl AuthorizationFailure {
    /// Returns the protocol error.
    #[must_use]
    pub fn error(&self) -> &OAuthError {
        &self.error
    }

    /// Consumes the failure, returning the protocol error.
    #[must_use]
    pub fn into_error(self) -> OAuthError {
        self.error
    }

    /// Returns the validated redirect URI the error should be sent to.
    #[must_use]
    pub fn redirect_uri(&self) -> Option<&str> {
        self.redirect_uri.as_deref()
    }

    /// Builds the error redirect, if the error must be delivered by redirect.
    #[must_use]
    pub fn redirect_url(&self) -> Option<String> {
        self.redirect_uri
            .as_deref()
            .map(|uri| self.error.to_redirect_url(uri))
    }
}

// =============================================================================
// Flow
// =============================================================================

/// Authorization code grant flow.
///
/// One instance serves any number of requests; every call to
/// [`authorize`](Self::authorize) gets its own [`GrantContext`].
pub struct AuthorizationGrantFlow {
    client_storage: Arc<dyn ClientStorage>,
    code_storage: Arc<dyn AuthCodeStorage>,
    generator: Arc<dyn TokenGenerator>,
    consent: Arc<dyn ConsentCheck>,
    code_lifetime: Duration,
    response_mode: ResponseMode,
    clock: fn() -> OffsetDateTime,
}

impl AuthorizationGrantFlow {
    /// Creates a flow with the default configuration.
    #[must_use]
    pub fn new(
        client_storage: Arc<dyn ClientStorage>,
        code_storage: Arc<dyn AuthCodeStorage>,
        generator: Arc<dyn TokenGenerator>,
        consent: Arc<dyn ConsentCheck>,
    ) -> Self {
        let defaults = OAuthConfig::default();
        Self {
            client_storage,
            code_storage,
            generator,
            consent,
            code_lifetime: defaults.authorization_code_lifetime,
            response_mode: defaults.response_mode,
            clock: OffsetDateTime::now_utc,
        }
    }

    /// Applies code lifetime and response mode from configuration.
    #[must_use]
    pub fn with_config(mut self, config: &OAuthConfig) -> Self {
        self.code_lifetime = config.authorization_code_lifetime;
        self.response_mode = config.response_mode;
        self
    }

    /// Sets the response mode.
    #[must_use]
    pub fn with_response_mode(mut self, mode: ResponseMode) -> Self {
        self.response_mode = mode;
        self
    }

    /// Replaces the clock used to compute code expiry.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> OffsetDateTime) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the configured response mode.
    #[must_use]
    pub fn response_mode(&self) -> ResponseMode {
        self.response_mode
    }

    /// Runs the grant flow for one authorization request.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthorizationFailure`] wrapping:
    /// - `invalid_request` for missing or malformed parameters, a
    ///   mismatched redirect URI, or scopes the client may not request
    /// - `invalid_client` if the client is unknown
    /// - `access_denied` if the resource owner refused
    /// - `server_error` if storage or the consent check failed
    /// - the generator's own error if code generation failed
    pub async fn authorize(
        &self,
        request: &OAuthRequest,
    ) -> Result<AuthorizationOutcome, AuthorizationFailure> {
        tracing::debug!(method = %request.method(), "Authorization request received");
        let mut context = GrantContext::new(self, request);

        match GRANT_RUNNER.run(&mut context).await {
            Ok(Some(outcome)) => {
                tracing::info!(
                    client_id = %context.client_id,
                    redirect = matches!(outcome, AuthorizationOutcome::Redirect(_)),
                    "Authorization code issued"
                );
                Ok(outcome)
            }
            Ok(None) => Err(context.fail(OAuthError::from_kind(ErrorKind::ServerError))),
            Err(error) => {
                match error.cause() {
                    Some(cause) => tracing::error!(
                        client_id = %context.client_id,
                        error = %cause,
                        "Authorization request failed"
                    ),
                    None => tracing::warn!(
                        client_id = %context.client_id,
                        error = %error.kind(),
                        description = error.description(),
                        "Authorization request rejected"
                    ),
                }
                Err(context.fail(error))
            }
        }
    }
}

// =============================================================================
// Context
// =============================================================================

/// Per-request state of the grant flow.
///
/// Exposed read-only to [`TokenGenerator`] implementations.
pub struct GrantContext<'a> {
    flow: &'a AuthorizationGrantFlow,
    request: &'a OAuthRequest,
    client_id: String,
    redirect_uri: String,
    scopes: Vec<String>,
    client: Option<Client>,
    user: Option<User>,
    code: Option<String>,
    redirect_eligible: bool,
}

impl<'a> GrantContext<'a> {
    fn new(flow: &'a AuthorizationGrantFlow, request: &'a OAuthRequest) -> Self {
        Self {
            flow,
            request,
            client_id: String::new(),
            redirect_uri: String::new(),
            scopes: Vec::new(),
            client: None,
            user: None,
            code: None,
            redirect_eligible: false,
        }
    }

    /// Returns the inbound request.
    #[must_use]
    pub fn request(&self) -> &OAuthRequest {
        self.request
    }

    /// Returns the requested client id.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the requested redirect URI.
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Returns the requested scopes, in request order.
    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Returns the resolved client, once `check_client` has run.
    #[must_use]
    pub fn client(&self) -> Option<&Client> {
        self.client.as_ref()
    }

    /// Returns the approving user, once `check_user_approval` has run.
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Returns `true` once the client and redirect URI have been validated.
    #[must_use]
    pub fn is_redirect_eligible(&self) -> bool {
        self.redirect_eligible
    }

    fn delivers_by_redirect(&self) -> bool {
        self.redirect_eligible && self.flow.response_mode == ResponseMode::Redirect
    }

    fn fail(&self, error: OAuthError) -> AuthorizationFailure {
        AuthorizationFailure {
            error,
            redirect_uri: self
                .delivers_by_redirect()
                .then(|| self.redirect_uri.clone()),
        }
    }

    fn state(&self) -> Option<&str> {
        self.request
            .query_param("state")
            .filter(|s| !s.is_empty())
            .or_else(|| self.request.body_param("state").filter(|s| !s.is_empty()))
    }

    fn check_params(&mut self) -> OAuthResult<()> {
        let request = self.request;
        if request.query().is_none() && request.body().is_none() {
            return Err(OAuthError::from_kind(ErrorKind::InvalidRequest));
        }

        if request.param("response_type") != Some("code") {
            return Err(OAuthError::invalid_request(
                "Invalid response_type parameter (must be \"code\")",
            ));
        }

        self.client_id = request
            .param("client_id")
            .ok_or_else(|| OAuthError::invalid_request("Invalid or missing client_id parameter"))?
            .to_string();

        self.redirect_uri = request
            .param("redirect_uri")
            .ok_or_else(|| {
                OAuthError::invalid_request("Invalid or missing redirect_uri parameter")
            })?
            .to_string();

        self.scopes = request.param("scope").map(parse_scope).unwrap_or_default();
        if self.scopes.is_empty() {
            return Err(OAuthError::invalid_request(
                "Invalid or missing scope parameter",
            ));
        }

        Ok(())
    }

    async fn check_client(&mut self) -> OAuthResult<()> {
        let client = self
            .flow
            .client_storage
            .get_client(&self.client_id)
            .await
            .map_err(OAuthError::server_error)?
            .ok_or_else(|| OAuthError::invalid_client("Invalid client credentials"))?;

        if !client.is_redirect_uri_allowed(&self.redirect_uri) {
            return Err(OAuthError::invalid_request("redirect_uri does not match"));
        }

        let invalid = client.invalid_scopes(&self.scopes);
        if !invalid.is_empty() {
            return Err(OAuthError::invalid_request(format!(
                "invalid scopes for this client {}",
                invalid.join(",")
            )));
        }

        // Redirect URI is trusted from here on
        self.redirect_eligible = true;
        self.client = Some(client);
        Ok(())
    }

    async fn check_user_approval(&mut self) -> OAuthResult<()> {
        let consent = self
            .flow
            .consent
            .check(self.request)
            .await
            .map_err(OAuthError::server_error)?;

        if !consent.allowed {
            return Err(OAuthError::access_denied(
                "The user denied access to your application",
            ));
        }

        self.user = consent.user;
        Ok(())
    }

    async fn generate_code(&mut self) -> OAuthResult<()> {
        let code = self
            .flow
            .generator
            .generate(TokenKind::AuthorizationCode, self)
            .await?;
        self.code = Some(code);
        Ok(())
    }

    async fn save_auth_code(&mut self) -> OAuthResult<()> {
        let record = AuthorizationCode {
            code: self.issued_code()?.to_string(),
            client_id: self.resolved_client()?.client_id.clone(),
            expires: self.code_expiry()?,
            user: self.user.clone(),
            scopes: self.scopes.clone(),
        };

        self.flow
            .code_storage
            .save_auth_code(&record)
            .await
            .map_err(OAuthError::server_error)
    }

    fn redirect(&self) -> OAuthResult<AuthorizationOutcome> {
        let response = AuthorizationResponse {
            code: self.issued_code()?.to_string(),
            state: self.state().map(String::from),
        };

        if self.delivers_by_redirect() {
            Ok(AuthorizationOutcome::Redirect(
                response.to_redirect_url(&self.redirect_uri),
            ))
        } else {
            Ok(AuthorizationOutcome::Direct(response))
        }
    }

    /// Current time plus the configured code lifetime.
    fn code_expiry(&self) -> OAuthResult<OffsetDateTime> {
        time::Duration::try_from(self.flow.code_lifetime)
            .ok()
            .and_then(|lifetime| (self.flow.clock)().checked_add(lifetime))
            .ok_or_else(|| OAuthError::server_error("authorization code expiry is out of range"))
    }

    fn issued_code(&self) -> OAuthResult<&str> {
        self.code
            .as_deref()
            .ok_or_else(|| OAuthError::server_error("authorization code was not generated"))
    }

    fn resolved_client(&self) -> OAuthResult<&Client> {
        self.client
            .as_ref()
            .ok_or_else(|| OAuthError::server_error("client was not resolved"))
    }
}

#[async_trait]
impl StepContext for GrantContext<'_> {
    type Step = GrantStep;
    type Output = AuthorizationOutcome;

    async fn run_step(&mut self, step: GrantStep) -> OAuthResult<Option<AuthorizationOutcome>> {
        match step {
            GrantStep::CheckParams => self.check_params().map(|()| None),
            GrantStep::CheckClient => self.check_client().await.map(|()| None),
            GrantStep::CheckUserApproval => self.check_user_approval().await.map(|()| None),
            GrantStep::GenerateCode => self.generate_code().await.map(|()| None),
            GrantStep::SaveAuthCode => self.save_auth_code().await.map(|()| None),
            GrantStep::Redirect => self.redirect().map(Some),
        }
    }
}
