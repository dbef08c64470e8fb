//! Client storage trait.

use async_trait::async_trait;

use crate::error::BoxError;
use crate::types::Client;

/// Lookup of registered OAuth 2.0 clients.
///
/// # Example
///
/// ```ignore
/// use oauth2_flows::storage::ClientStorage;
///
/// async fn example(storage: &impl ClientStorage) {
///     if let Some(client) = storage.get_client("my-app").await? {
///         println!("Found client: {}", client.client_id);
///     }
/// }
/// ```
#[async_trait]
pub trait ClientStorage: Send + Sync {
    /// Find a client by its OAuth `client_id`.
    ///
    /// Returns `None` if the client doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn get_client(&self, client_id: &str) -> Result<Option<Client>, BoxError>;
}
