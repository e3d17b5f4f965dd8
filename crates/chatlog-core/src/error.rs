//! Error types for the chatlog store.

use thiserror::Error;

/// A single key that `clear_all` could not remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearFailure {
    pub key: String,
    pub message: String,
}

/// A shared error type for the chatlog crates.
///
/// Storage failures never panic; every operation on the store reports one of
/// these variants and the front-end decides how to present it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatlogError {
    /// I/O or serialization failure while reading or writing a log.
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// An existing log file could not be parsed as a list of entries.
    #[error("Corrupt log '{key}': {message}")]
    Corrupt { key: String, message: String },

    /// No log exists for the key.
    #[error("Log not found: '{key}'")]
    NotFound { key: String },

    /// Normalization produced an unusable key.
    #[error("Invalid key derived from '{input}'")]
    InvalidKey { input: String },

    /// A free-text lookup matched more than one key by prefix.
    #[error("'{candidate}' matches several logs: {}", .matches.join(", "))]
    Ambiguous {
        candidate: String,
        matches: Vec<String>,
    },

    /// `clear_all` removed some logs but not all of them.
    #[error("Cleared {} log(s), failed to clear {}: {}", .cleared.len(), .failed.len(), failed_keys(.failed))]
    PartialClear {
        cleared: Vec<String>,
        failed: Vec<ClearFailure>,
    },

    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),
}

fn failed_keys(failed: &[ClearFailure]) -> String {
    failed
        .iter()
        .map(|f| f.key.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl ChatlogError {
    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a Corrupt error
    pub fn corrupt(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Corrupt {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Creates a NotFound error
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Creates an InvalidKey error
    pub fn invalid_key(input: impl Into<String>) -> Self {
        Self::InvalidKey {
            input: input.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }
}

impl From<toml::de::Error> for ChatlogError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// A type alias for `Result<T, ChatlogError>`.
pub type Result<T> = std::result::Result<T, ChatlogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_clear_message_names_failed_keys() {
        let err = ChatlogError::PartialClear {
            cleared: vec!["a".to_string(), "b".to_string()],
            failed: vec![ClearFailure {
                key: "Locked".to_string(),
                message: "Is a directory".to_string(),
            }],
        };

        assert_eq!(
            err.to_string(),
            "Cleared 2 log(s), failed to clear 1: Locked"
        );
    }

    #[test]
    fn test_type_checks() {
        assert!(ChatlogError::not_found("x").is_not_found());
        assert!(ChatlogError::corrupt("x", "bad").is_corrupt());
        assert!(ChatlogError::storage("disk").is_storage());
        assert!(!ChatlogError::invalid_key("!!").is_not_found());
    }
}
