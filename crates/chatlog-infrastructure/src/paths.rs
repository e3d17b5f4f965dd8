//! Path management for chatlog configuration, data and logs.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/chatlog/           # Config directory
//! └── config.toml              # Application configuration
//!
//! ~/.local/share/chatlog/      # Data directory
//! └── logs/                    # Default log store root
//!     ├── Team Chat_.json
//!     └── Chat_42.json
//!
//! ~/.local/state/chatlog/      # Diagnostics
//! └── chatlog.log.YYYY-MM-DD
//! ```

use std::path::PathBuf;

const APP_DIR: &str = "chatlog";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

pub struct ChatlogPaths;

impl ChatlogPaths {
    /// Returns the configuration directory (e.g. `~/.config/chatlog/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the data directory (e.g. `~/.local/share/chatlog/`).
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|d| d.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the default root of the log store.
    pub fn default_store_dir() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("logs"))
    }

    /// Returns the directory for diagnostic logs.
    ///
    /// Platforms without a state directory fall back to the local data dir.
    pub fn state_dir() -> Result<PathBuf, PathError> {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .map(|d| d.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_end_with_app_dir() {
        if let Ok(dir) = ChatlogPaths::config_dir() {
            assert!(dir.ends_with("chatlog"));
        }
        if let Ok(file) = ChatlogPaths::config_file() {
            assert!(file.ends_with("chatlog/config.toml"));
        }
        if let Ok(dir) = ChatlogPaths::default_store_dir() {
            assert!(dir.ends_with("chatlog/logs"));
        }
    }
}
