//! Configuration model.
//!
//! Loaded from `config.toml` by the infrastructure crate; every field has a
//! default so a missing or partial file is valid.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatlogConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ChatlogConfig {
    /// Parses a TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Directory holding the log files. `None` means the platform data dir.
    #[serde(default)]
    pub root_dir: Option<PathBuf>,
    /// File extension of log files, without the dot.
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_dir: None,
            extension: default_extension(),
        }
    }
}

fn default_extension() -> String {
    "json".to_string()
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Filter directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = ChatlogConfig::from_toml("").unwrap();
        assert_eq!(config, ChatlogConfig::default());
        assert_eq!(config.storage.extension, "json");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_document() {
        let config = ChatlogConfig::from_toml(
            r#"
            [storage]
            root_dir = "/var/lib/chatlog"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.storage.root_dir,
            Some(PathBuf::from("/var/lib/chatlog"))
        );
        assert_eq!(config.storage.extension, "json");
    }

    #[test]
    fn test_invalid_document_is_config_error() {
        let err = ChatlogConfig::from_toml("[storage\nroot_dir = 1").unwrap_err();
        assert!(matches!(err, crate::error::ChatlogError::Config(_)));
    }
}
