//! Access token storage trait.

use async_trait::async_trait;

use crate::error::BoxError;
use crate::types::AccessToken;

/// Lookup of stored bearer access tokens.
#[async_trait]
pub trait AccessTokenStorage: Send + Sync {
    /// Find a token record by the presented token value.
    ///
    /// Returns `None` if the token is unknown. Expiry is checked by the
    /// caller, so expired records should still be returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn get_access_token(&self, token: &str) -> Result<Option<AccessToken>, BoxError>;
}
