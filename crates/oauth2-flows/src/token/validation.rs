//! Bearer token validation flow.
//!
//! [`TokenValidationFlow`] authorises a protected resource request:
//!
//! 1. `extract_bearer_token` - read the token from exactly one transmission
//!    method (RFC 6750 section 2)
//! 2. `check_token` - resolve the token and check its expiry
//! 3. `check_scope` - enforce the required scopes, if any
//!
//! # Example
//!
//! ```ignore
//! let flow = TokenValidationFlow::new(store).with_required_scopes(["read"]);
//! let authorised = flow.validate(&request).await?;
//! println!("user: {:?}", authorised.user);
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{Method, header::AUTHORIZATION};
use time::OffsetDateTime;

use crate::OAuthResult;
use crate::error::OAuthError;
use crate::request::{FORM_URLENCODED, OAuthRequest};
use crate::runner::{StepContext, StepRunner};
use crate::scope::{describe_missing, missing_scopes};
use crate::storage::AccessTokenStorage;
use crate::types::{AccessToken, User};

/// Parameter name for query and body transmitted tokens.
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

// =============================================================================
// Steps
// =============================================================================

/// Steps of bearer token validation, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStep {
    /// Extract the token from the request.
    ExtractBearerToken,
    /// Resolve the token and check expiry.
    CheckToken,
    /// Enforce required scopes.
    CheckScope,
}

const VALIDATION_STEPS: &[ValidationStep] = &[
    ValidationStep::ExtractBearerToken,
    ValidationStep::CheckToken,
    ValidationStep::CheckScope,
];

const VALIDATION_RUNNER: StepRunner<ValidationStep> =
    StepRunner::new("bearer_token", VALIDATION_STEPS);

// =============================================================================
// Result
// =============================================================================

/// Where a bearer token was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// `Authorization: Bearer <token>` header.
    Header,
    /// `access_token` query parameter.
    Query,
    /// `access_token` form body field.
    Body,
}

impl TokenSource {
    /// Returns a short name for logging.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Query => "query",
            Self::Body => "body",
        }
    }
}

/// A successfully authorised resource request.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorisedRequest {
    /// The stored token record.
    pub token: AccessToken,

    /// The token's user, or a minimal user built from the stored user id.
    pub user: Option<User>,

    /// Scopes granted to the token.
    pub scopes: Vec<String>,
}

// =============================================================================
// Flow
// =============================================================================

/// Bearer token validation flow.
#[derive(Clone)]
pub struct TokenValidationFlow {
    token_storage: Arc<dyn AccessTokenStorage>,
    required_scopes: Vec<String>,
    clock: fn() -> OffsetDateTime,
}

impl TokenValidationFlow {
    /// Creates a flow that requires no particular scope.
    #[must_use]
    pub fn new(token_storage: Arc<dyn AccessTokenStorage>) -> Self {
        Self {
            token_storage,
            required_scopes: Vec::new(),
            clock: OffsetDateTime::now_utc,
        }
    }

    /// Sets the scopes every authorised request must carry.
    #[must_use]
    pub fn with_required_scopes<S: Into<String>>(
        mut self,
        scopes: impl IntoIterator<Item = S>,
    ) -> Self {
        self.required_scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the clock used for expiry checks.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> OffsetDateTime) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the required scopes.
    #[must_use]
    pub fn required_scopes(&self) -> &[String] {
        &self.required_scopes
    }

    /// Validates the bearer token on a resource request.
    ///
    /// # Errors
    ///
    /// - `invalid_request` if the token is transmitted incorrectly or a
    ///   required scope is missing
    /// - `invalid_token` if the token is unknown or expired
    /// - `server_error` if token lookup failed
    pub async fn validate(&self, request: &OAuthRequest) -> OAuthResult<AuthorisedRequest> {
        tracing::trace!(
            method = %request.method(),
            required_scopes = self.required_scopes.len(),
            "Validating bearer token"
        );
        let mut context = ValidationContext::new(self, request);

        let result = VALIDATION_RUNNER.run(&mut context).await;
        match &result {
            Ok(_) => tracing::debug!(
                source = context.source.map(|s| s.as_str()),
                "Bearer token accepted"
            ),
            Err(error) => match error.cause() {
                Some(cause) => tracing::error!(error = %cause, "Bearer token lookup failed"),
                None => tracing::debug!(
                    error = %error.kind(),
                    description = error.description(),
                    "Bearer token rejected"
                ),
            },
        }

        result?.ok_or_else(|| OAuthError::invalid_token("The access token was not found"))
    }
}

// =============================================================================
// Context
// =============================================================================

struct ValidationContext<'a> {
    flow: &'a TokenValidationFlow,
    request: &'a OAuthRequest,
    bearer_token: String,
    source: Option<TokenSource>,
    token: Option<AccessToken>,
}

impl<'a> ValidationContext<'a> {
    fn new(flow: &'a TokenValidationFlow, request: &'a OAuthRequest) -> Self {
        Self {
            flow,
            request,
            bearer_token: String::new(),
            source: None,
            token: None,
        }
    }

    fn extract_bearer_token(&mut self) -> OAuthResult<()> {
        let request = self.request;
        let header_token = request.header(&AUTHORIZATION);
        let query_token = request.query_param(ACCESS_TOKEN_PARAM);
        let body_token = request.body_param(ACCESS_TOKEN_PARAM);

        let methods_used = [
            request.headers().contains_key(AUTHORIZATION),
            query_token.is_some(),
            body_token.is_some(),
        ]
        .into_iter()
        .filter(|used| *used)
        .count();

        if methods_used > 1 {
            return Err(OAuthError::invalid_request(
                "Only one method may be used to authenticate at a time (Auth header, GET or POST).",
            ));
        }
        if methods_used == 0 {
            return Err(OAuthError::invalid_request("The access token was not found"));
        }

        let (token, source) = if request.headers().contains_key(AUTHORIZATION) {
            let token = header_token
                .and_then(parse_bearer_header)
                .ok_or_else(|| OAuthError::invalid_request("Malformed auth header"))?;
            (token, TokenSource::Header)
        } else if let Some(token) = body_token {
            if request.method() == Method::GET {
                return Err(OAuthError::invalid_request(
                    "Method cannot be GET When putting the token in the body.",
                ));
            }
            if !request.is_content_type(FORM_URLENCODED) {
                return Err(OAuthError::invalid_request(
                    "When putting the token in the body, content type must be application/x-www-form-urlencoded.",
                ));
            }
            (token, TokenSource::Body)
        } else {
            (query_token.unwrap_or_default(), TokenSource::Query)
        };

        self.bearer_token = token.to_string();
        self.source = Some(source);
        Ok(())
    }

    async fn check_token(&mut self) -> OAuthResult<()> {
        let token = self
            .flow
            .token_storage
            .get_access_token(&self.bearer_token)
            .await
            .map_err(OAuthError::server_error)?
            .ok_or_else(|| OAuthError::invalid_token("The access token provided is invalid."))?;

        if !token.is_valid_at((self.flow.clock)()) {
            return Err(OAuthError::invalid_token(
                "The access token provided has expired.",
            ));
        }

        self.token = Some(token);
        Ok(())
    }

    fn check_scope(&mut self) -> OAuthResult<AuthorisedRequest> {
        let token = self
            .token
            .take()
            .ok_or_else(|| OAuthError::invalid_token("The access token provided is invalid."))?;

        let required = &self.flow.required_scopes;
        if !required.is_empty() {
            if token.scopes.is_empty() {
                return Err(OAuthError::invalid_request("Invalid or missing scope"));
            }

            let missing = missing_scopes(required, &token.scopes);
            if !missing.is_empty() {
                return Err(OAuthError::invalid_request(describe_missing(&missing)));
            }
        }

        Ok(AuthorisedRequest {
            user: token.resolved_user(),
            scopes: token.scopes.clone(),
            token,
        })
    }
}

/// Parses `Bearer <token>` with a case-insensitive scheme.
fn parse_bearer_header(value: &str) -> Option<&str> {
    let (scheme, rest) = value.trim_start().split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    rest.split_whitespace().next()
}

#[async_trait]
impl StepContext for ValidationContext<'_> {
    type Step = ValidationStep;
    type Output = AuthorisedRequest;

    async fn run_step(&mut self, step: ValidationStep) -> OAuthResult<Option<AuthorisedRequest>> {
        match step {
            ValidationStep::ExtractBearerToken => self.extract_bearer_token().map(|()| None),
            ValidationStep::CheckToken => self.check_token().await.map(|()| None),
            ValidationStep::CheckScope => self.check_scope().map(Some),
        }
    }
}
