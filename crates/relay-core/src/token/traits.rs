//! Token resolver trait definition

use async_trait::async_trait;

use super::Token;
use crate::error::Result;

/// Trait for token lookup backends
#[async_trait]
pub trait TokenResolver: Send + Sync {
    /// Resolve the token stored for an identifier.
    ///
    /// Returns `RelayError::CredentialNotFound` when nothing is provisioned
    /// for the identifier.
    async fn resolve(&self, identifier: &str) -> Result<Token>;

    /// Get a human-readable name for this backend
    fn backend_name(&self) -> &'static str;
}
