//! Token file storage backend
//!
//! Reads tokens from a directory with one entry per identifier. An entry is
//! either `<id>.json` holding `{"value": "..."}` or a plain `<id>` file
//! holding the raw token. Entries are read on every lookup, never cached.

use async_trait::async_trait;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{validate_identifier, Token, TokenResolver};
use crate::error::{RelayError, Result};

/// Structured token record
#[derive(Deserialize)]
struct TokenRecord {
    value: String,
}

/// Directory-backed token store
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    /// Directory holding one entry per identifier
    tokens_dir: PathBuf,
}

impl FileTokenStore {
    /// Create a store reading from the given directory
    pub fn new(tokens_dir: impl Into<PathBuf>) -> Self {
        Self {
            tokens_dir: tokens_dir.into(),
        }
    }

    /// Get the tokens directory
    pub fn tokens_dir(&self) -> &Path {
        &self.tokens_dir
    }

    /// Path of the structured record for an identifier
    fn record_path(&self, identifier: &str) -> PathBuf {
        self.tokens_dir.join(format!("{}.json", identifier))
    }

    /// Path of the plain token file for an identifier
    fn plain_path(&self, identifier: &str) -> PathBuf {
        self.tokens_dir.join(identifier)
    }

    /// Read a file, mapping "not found" to `None`
    async fn read_optional(path: &Path) -> Result<Option<String>> {
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn unreadable(identifier: &str, reason: impl ToString) -> RelayError {
        RelayError::CredentialUnreadable {
            identifier: identifier.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl TokenResolver for FileTokenStore {
    async fn resolve(&self, identifier: &str) -> Result<Token> {
        validate_identifier(identifier)?;

        let record_path = self.record_path(identifier);
        let token = match Self::read_optional(&record_path)
            .await
            .map_err(|e| Self::unreadable(identifier, e))?
        {
            Some(contents) => {
                let record: TokenRecord = serde_json::from_str(&contents)
                    .map_err(|e| Self::unreadable(identifier, e))?;
                debug!("Resolved token record from {:?}", record_path);
                Token::new(record.value.trim())
            }
            None => {
                let plain_path = self.plain_path(identifier);
                let contents = Self::read_optional(&plain_path)
                    .await
                    .map_err(|e| Self::unreadable(identifier, e))?
                    .ok_or_else(|| RelayError::CredentialNotFound(identifier.to_string()))?;
                debug!("Resolved plain token from {:?}", plain_path);
                Token::new(contents.trim())
            }
        };

        if token.is_empty() {
            return Err(Self::unreadable(identifier, "token is empty"));
        }

        Ok(token)
    }

    fn backend_name(&self) -> &'static str {
        "Token Directory"
    }
}
