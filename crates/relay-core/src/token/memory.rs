//! In-memory token store

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{Token, TokenResolver};
use crate::error::{RelayError, Result};

/// Token store backed by a map, used as a fake in tests
#[derive(Default)]
pub struct MemoryTokenStore {
    entries: RwLock<HashMap<String, Token>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provision a token for an identifier, replacing any previous one
    pub async fn insert(&self, identifier: impl Into<String>, token: impl Into<String>) {
        self.entries
            .write()
            .await
            .insert(identifier.into(), Token::new(token));
    }

    pub async fn remove(&self, identifier: &str) {
        self.entries.write().await.remove(identifier);
    }
}

#[async_trait]
impl TokenResolver for MemoryTokenStore {
    async fn resolve(&self, identifier: &str) -> Result<Token> {
        self.entries
            .read()
            .await
            .get(identifier)
            .cloned()
            .ok_or_else(|| RelayError::CredentialNotFound(identifier.to_string()))
    }

    fn backend_name(&self) -> &'static str {
        "In-Memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_resolve_remove() {
        let store = MemoryTokenStore::new();
        store.insert("alice", "tok-1").await;

        assert_eq!(store.resolve("alice").await.unwrap().expose(), "tok-1");

        store.remove("alice").await;
        assert!(matches!(
            store.resolve("alice").await,
            Err(RelayError::CredentialNotFound(_))
        ));
    }
}
