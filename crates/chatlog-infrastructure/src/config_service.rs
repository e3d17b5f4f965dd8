//! Configuration loading.
//!
//! Reads `config.toml` from the chatlog config directory and resolves where
//! the log store lives.

use crate::paths::ChatlogPaths;
use chatlog_core::config::ChatlogConfig;
use chatlog_core::error::{ChatlogError, Result};
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Environment variable overriding `storage.root_dir`.
pub const STORE_DIR_ENV: &str = "CHATLOG_DIR";

pub struct ConfigService;

impl ConfigService {
    /// Loads the configuration from the default location.
    pub fn load() -> Result<ChatlogConfig> {
        let path = ChatlogPaths::config_file().map_err(|e| ChatlogError::config(e.to_string()))?;
        Self::load_from(&path)
    }

    /// Loads the configuration from `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<ChatlogConfig> {
        match std::fs::read_to_string(path) {
            Ok(content) => ChatlogConfig::from_toml(&content).map_err(|e| match e {
                ChatlogError::Config(message) => {
                    ChatlogError::config(format!("{}: {}", path.display(), message))
                }
                other => other,
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                Ok(ChatlogConfig::default())
            }
            Err(e) => Err(ChatlogError::config(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Resolves the store root: explicit override, then `CHATLOG_DIR`, then
    /// the config file, then the platform data directory.
    pub fn store_dir(config: &ChatlogConfig, explicit: Option<&Path>) -> Result<PathBuf> {
        Self::store_dir_with_env(config, explicit, std::env::var_os(STORE_DIR_ENV))
    }

    fn store_dir_with_env(
        config: &ChatlogConfig,
        explicit: Option<&Path>,
        env: Option<OsString>,
    ) -> Result<PathBuf> {
        if let Some(dir) = explicit {
            return Ok(dir.to_path_buf());
        }
        if let Some(dir) = env.filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(dir));
        }
        if let Some(dir) = &config.storage.root_dir {
            return Ok(dir.clone());
        }
        ChatlogPaths::default_store_dir().map_err(|e| ChatlogError::config(e.to_string()))
    }
}
