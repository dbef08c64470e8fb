//! OAuth 2.0 authorization code grant.
//!
//! - [`authorize`] - the grant flow and its outcome types
//! - [`consent`] - resource owner consent hook
//! - [`generator`] - authorization code generation
//!
//! # Example
//!
//! ```ignore
//! use oauth2_flows::oauth::{AuthorizationGrantFlow, RandomTokenGenerator};
//!
//! let store = Arc::new(MemoryStore::new());
//! let flow = AuthorizationGrantFlow::new(
//!     store.clone(),
//!     store,
//!     Arc::new(RandomTokenGenerator),
//!     Arc::new(|_: &OAuthRequest| Ok(Consent::granted(None))),
//! );
//! ```

pub mod authorize;
pub mod consent;
pub mod generator;

pub use authorize::{
    AuthorizationFailure, AuthorizationGrantFlow, AuthorizationOutcome, AuthorizationResponse,
    GrantContext, GrantStep,
};
pub use consent::{Consent, ConsentCheck};
pub use generator::{RandomTokenGenerator, TokenGenerator, TokenKind};
