//! Bearer token validation for protected resources.
//!
//! - [`validation`] - the validation flow and its result type

pub mod validation;

pub use validation::{AuthorisedRequest, TokenSource, TokenValidationFlow, ValidationStep};
