//! JSON file based LogRepository implementation.

use crate::config_service::ConfigService;
use crate::storage::{AtomicJsonError, AtomicJsonFile, KeyLocks, is_temp_file_name};
use async_trait::async_trait;
use chatlog_core::config::ChatlogConfig;
use chatlog_core::error::{ChatlogError, ClearFailure, Result};
use chatlog_core::{Entry, LogRepository, StorageKey, normalize};
use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Log store keeping one JSON array file per conversation.
///
/// Directory structure:
/// ```text
/// root_dir/
/// ├── Team Chat_.json
/// └── Chat_42.json
/// ```
///
/// Appends load the whole log, push the entry and write the log back through
/// [`AtomicJsonFile`], all under the key's lock.
pub struct JsonLogRepository {
    root: PathBuf,
    extension: String,
    locks: KeyLocks,
}

impl JsonLogRepository {
    /// Creates a store rooted at `root` with the `json` extension.
    ///
    /// The directory is created on first append.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: "json".to_string(),
            locks: KeyLocks::new(),
        }
    }

    /// Creates a store from configuration, honoring `CHATLOG_DIR` and an
    /// optional explicit directory.
    pub fn from_config(config: &ChatlogConfig, explicit_dir: Option<&Path>) -> Result<Self> {
        let root = ConfigService::store_dir(config, explicit_dir)?;
        Ok(Self::new(root).with_extension(&config.storage.extension))
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn log_file(&self, key: &StorageKey) -> AtomicJsonFile<Vec<Entry>> {
        let file_name = format!("{}.{}", key.as_str(), self.extension);
        AtomicJsonFile::new(self.root.join(file_name))
    }

    /// Extracts the stem of a log file name, skipping hidden and temp files.
    fn stem_from_file_name<'a>(&self, name: &'a str) -> Option<&'a str> {
        if name.starts_with('.') {
            return None;
        }
        name.strip_suffix(self.extension.as_str())
            .and_then(|stem| stem.strip_suffix('.'))
            .filter(|stem| !stem.is_empty())
    }

    async fn load(&self, key: &StorageKey) -> Result<Option<Vec<Entry>>> {
        let file = self.log_file(key);
        file.load().await.map_err(|e| match e {
            AtomicJsonError::ParseError(err) => {
                tracing::warn!(key = %key, error = %err, "Log file is corrupt");
                ChatlogError::corrupt(key.as_str(), err.to_string())
            }
            other => ChatlogError::storage(format!(
                "Failed to read {}: {}",
                file.path().display(),
                other
            )),
        })
    }

    async fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await.map_err(|e| {
            ChatlogError::storage(format!(
                "Failed to create store directory {}: {}",
                self.root.display(),
                e
            ))
        })
    }

    /// Stems of every log file in the store, including files whose name no
    /// title normalizes to.
    async fn scan_stems(&self) -> Result<BTreeSet<String>> {
        let mut stems = BTreeSet::new();
        let mut dir = match fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(stems),
            Err(e) => {
                return Err(ChatlogError::storage(format!(
                    "Failed to list {}: {}",
                    self.root.display(),
                    e
                )));
            }
        };

        while let Some(item) = dir
            .next_entry()
            .await
            .map_err(|e| ChatlogError::storage(format!("Failed to list store: {}", e)))?
        {
            let name = item.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if let Some(stem) = self.stem_from_file_name(name) {
                stems.insert(stem.to_string());
            }
        }

        Ok(stems)
    }

    /// Removes temp files left behind by interrupted writes.
    async fn remove_stray_temp_files(&self) {
        let Ok(mut dir) = fs::read_dir(&self.root).await else {
            return;
        };
        while let Ok(Some(item)) = dir.next_entry().await {
            let name = item.file_name();
            if name.to_str().is_some_and(is_temp_file_name) {
                if let Err(e) = fs::remove_file(item.path()).await {
                    tracing::debug!(path = %item.path().display(), error = %e, "Failed to remove temp file");
                }
            }
        }
    }
}

#[async_trait]
impl LogRepository for JsonLogRepository {
    async fn append(&self, title: &str, entry: Entry) -> Result<()> {
        let key = StorageKey::from_title(title)?;
        let _guard = self.locks.lock(key.as_str()).await;

        let mut entries = match self.load(&key).await? {
            Some(entries) => entries,
            None => {
                self.ensure_root().await?;
                tracing::info!(key = %key, "Creating log");
                Vec::new()
            }
        };
        entries.push(entry);

        let file = self.log_file(&key);
        file.save(&entries).await.map_err(|e| {
            ChatlogError::storage(format!("Failed to write {}: {}", file.path().display(), e))
        })?;

        tracing::debug!(key = %key, entries = entries.len(), "Appended entry");
        Ok(())
    }

    async fn list_keys(&self) -> Result<BTreeSet<String>> {
        let mut keys = self.scan_stems().await?;
        // Files placed by hand under names like `a-b.json` cannot be read back.
        keys.retain(|stem| normalize(stem) == *stem);
        Ok(keys)
    }

    async fn read(&self, key: &str) -> Result<Vec<Entry>> {
        let key = StorageKey::from_title(key)?;
        let _guard = self.locks.lock(key.as_str()).await;

        let entries = self
            .load(&key)
            .await?
            .ok_or_else(|| ChatlogError::not_found(key.as_str()))?;

        tracing::debug!(key = %key, entries = entries.len(), "Read log");
        Ok(entries)
    }

    async fn clear_all(&self) -> Result<Vec<String>> {
        let _guard = self.locks.lock_all().await;

        let mut cleared = Vec::new();
        let mut failed = Vec::new();

        for key in self.scan_stems().await? {
            let path = self.root.join(format!("{}.{}", key, self.extension));
            match fs::remove_file(&path).await {
                Ok(()) => cleared.push(key),
                Err(e) if e.kind() == ErrorKind::NotFound => cleared.push(key),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Failed to clear log");
                    failed.push(ClearFailure {
                        key,
                        message: e.to_string(),
                    });
                }
            }
        }

        self.remove_stray_temp_files().await;

        if failed.is_empty() {
            tracing::info!(cleared = cleared.len(), "Cleared all logs");
            Ok(cleared)
        } else {
            Err(ChatlogError::PartialClear { cleared, failed })
        }
    }
}
