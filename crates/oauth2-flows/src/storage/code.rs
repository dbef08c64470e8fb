//! Authorization code storage trait.

use async_trait::async_trait;

use crate::error::BoxError;
use crate::types::AuthorizationCode;

/// Persistence of issued authorization codes.
#[async_trait]
pub trait AuthCodeStorage: Send + Sync {
    /// Persist a newly issued authorization code.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn save_auth_code(&self, code: &AuthorizationCode) -> Result<(), BoxError>;
}
