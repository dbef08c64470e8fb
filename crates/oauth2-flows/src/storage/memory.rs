//! In-process storage backend.
//!
//! Uses DashMap for lock-free concurrent access so a single store can be
//! shared by any number of concurrent flow runs.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::BoxError;
use crate::types::{AccessToken, AuthorizationCode, Client};

use super::{AccessTokenStorage, AuthCodeStorage, ClientStorage};

/// In-memory implementation of every storage trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    clients: DashMap<String, Client>,
    codes: DashMap<String, AuthorizationCode>,
    tokens: DashMap<String, AccessToken>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a client.
    pub fn insert_client(&self, client: Client) {
        self.clients.insert(client.client_id.clone(), client);
    }

    /// Stores (or replaces) an access token.
    pub fn insert_access_token(&self, token: AccessToken) {
        self.tokens.insert(token.access_token.clone(), token);
    }

    /// Returns a previously saved authorization code.
    #[must_use]
    pub fn auth_code(&self, code: &str) -> Option<AuthorizationCode> {
        self.codes.get(code).map(|entry| entry.value().clone())
    }

    /// Returns the number of saved authorization codes.
    #[must_use]
    pub fn auth_code_count(&self) -> usize {
        self.codes.len()
    }
}

#[async_trait]
impl ClientStorage for MemoryStore {
    async fn get_client(&self, client_id: &str) -> Result<Option<Client>, BoxError> {
        Ok(self.clients.get(client_id).map(|entry| entry.value().clone()))
    }
}

#[async_trait]
impl AuthCodeStorage for MemoryStore {
    async fn save_auth_code(&self, code: &AuthorizationCode) -> Result<(), BoxError> {
        self.codes.insert(code.code.clone(), code.clone());
        Ok(())
    }
}

#[async_trait]
impl AccessTokenStorage for MemoryStore {
    async fn get_access_token(&self, token: &str) -> Result<Option<AccessToken>, BoxError> {
        Ok(self.tokens.get(token).map(|entry| entry.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TokenExpiry;
    use time::OffsetDateTime;

    #[tokio::test]
    async fn test_client_lookup() {
        let store = MemoryStore::new();
        store.insert_client(Client::new("abc", "https://app/cb"));

        let found = store.get_client("abc").await.unwrap();
        assert_eq!(found.unwrap().client_id, "abc");
        assert!(store.get_client("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_and_read_code() {
        let store = MemoryStore::new();
        let code = AuthorizationCode {
            code: "c-1".into(),
            client_id: "abc".into(),
            expires: OffsetDateTime::now_utc(),
            user: None,
            scopes: vec!["read".into()],
        };

        store.save_auth_code(&code).await.unwrap();

        assert_eq!(store.auth_code_count(), 1);
        assert_eq!(store.auth_code("c-1"), Some(code));
    }

    #[tokio::test]
    async fn test_token_lookup_returns_expired_records() {
        let store = MemoryStore::new();
        store.insert_access_token(AccessToken::new("old").expires(TokenExpiry::At(
            OffsetDateTime::UNIX_EPOCH,
        )));

        let token = store.get_access_token("old").await.unwrap().unwrap();
        assert!(!token.is_valid_at(OffsetDateTime::now_utc()));
        assert!(store.get_access_token("other").await.unwrap().is_none());
    }
}
