//! Token and identifier definitions

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{RelayError, Result};

/// Longest identifier accepted from a request path
const MAX_IDENTIFIER_LEN: usize = 128;

/// Resolved upstream token - automatically zeroed when dropped
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Token {
    value: String,
}

impl Token {
    /// Create a new token
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Get the secret value (use carefully)
    pub fn expose(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Check that an identifier is safe to use as a file name.
///
/// Accepts ASCII letters, digits, `-`, `_` and `.`, and rejects a leading
/// `.` so neither `..` nor hidden files can be addressed.
pub fn validate_identifier(identifier: &str) -> Result<()> {
    if identifier.is_empty() {
        return Err(RelayError::InvalidIdentifier(
            "identifier is empty".to_string(),
        ));
    }

    if identifier.len() > MAX_IDENTIFIER_LEN {
        return Err(RelayError::InvalidIdentifier(format!(
            "identifier exceeds {} bytes",
            MAX_IDENTIFIER_LEN
        )));
    }

    if identifier.starts_with('.') {
        return Err(RelayError::InvalidIdentifier(identifier.to_string()));
    }

    let allowed = identifier
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if !allowed {
        return Err(RelayError::InvalidIdentifier(identifier.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers() {
        for id in ["alice", "user_01", "team-a.prod", "A1"] {
            assert!(validate_identifier(id).is_ok(), "{} should be valid", id);
        }
    }

    #[test]
    fn test_invalid_identifiers() {
        for id in ["", "..", "../etc/passwd", ".hidden", "a/b", "a\\b", "name with space", "tök"] {
            assert!(
                matches!(validate_identifier(id), Err(RelayError::InvalidIdentifier(_))),
                "{:?} should be rejected",
                id
            );
        }

        let long = "a".repeat(MAX_IDENTIFIER_LEN + 1);
        assert!(validate_identifier(&long).is_err());
    }

    #[test]
    fn test_debug_redacted() {
        let token = Token::new("super-secret");
        let debug = format!("{:?}", token);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("super-secret"));
    }
}
