//! Atomic JSON file operations.
//!
//! Writes never truncate the target in place: content goes to a temporary
//! sibling file, is flushed to disk and then renamed over the target, so the
//! file on disk is always either the old or the new complete document.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::ser::PrettyFormatter;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

/// Prefix shared by every temporary file, so directory listings can skip them.
pub const TEMP_PREFIX: &str = ".";
const TEMP_SUFFIX: &str = ".tmp";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Errors that can occur during atomic JSON operations.
#[derive(Debug)]
pub enum AtomicJsonError {
    /// File I/O error.
    IoError(std::io::Error),
    /// Existing content is not a valid document.
    ParseError(serde_json::Error),
    /// Data could not be serialized.
    SerializeError(serde_json::Error),
}

impl std::fmt::Display for AtomicJsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AtomicJsonError::IoError(e) => write!(f, "I/O error: {}", e),
            AtomicJsonError::ParseError(e) => write!(f, "JSON parse error: {}", e),
            AtomicJsonError::SerializeError(e) => write!(f, "JSON serialization error: {}", e),
        }
    }
}

impl std::error::Error for AtomicJsonError {}

impl From<std::io::Error> for AtomicJsonError {
    fn from(e: std::io::Error) -> Self {
        AtomicJsonError::IoError(e)
    }
}

/// A handle to a JSON document on disk.
///
/// Provides:
/// - **Atomicity**: Updates are all-or-nothing via tmp file + atomic rename
/// - **Consistency**: Content is fully serialized before any file is touched
/// - **Durability**: Explicit fsync of the file before rename, and of the
///   directory after it on Unix
///
/// Isolation is the caller's job; see [`super::key_locks::KeyLocks`].
pub struct AtomicJsonFile<T> {
    path: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T> AtomicJsonFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and deserializes the file.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: Successfully loaded
    /// - `Ok(None)`: File doesn't exist
    /// - `Err(ParseError)`: File exists but is empty or malformed
    /// - `Err(IoError)`: File could not be read
    pub async fn load(&self) -> Result<Option<T>, AtomicJsonError> {
        let content = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&content)
            .map(Some)
            .map_err(AtomicJsonError::ParseError)
    }

    /// Saves data atomically.
    ///
    /// On failure the previous file content is untouched and the temporary
    /// file is removed.
    pub async fn save(&self, data: &T) -> Result<(), AtomicJsonError> {
        let bytes = to_pretty_json(data).map_err(AtomicJsonError::SerializeError)?;

        let tmp_path = self.temp_path()?;
        if let Err(e) = write_synced(&tmp_path, &bytes).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&tmp_path, &self.path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }

        self.sync_parent().await;
        Ok(())
    }

    /// Temporary sibling path, unique per process and call.
    fn temp_path(&self) -> Result<PathBuf, AtomicJsonError> {
        let parent = self.path.parent().ok_or_else(|| {
            AtomicJsonError::IoError(std::io::Error::new(
                ErrorKind::InvalidInput,
                "Path has no parent directory",
            ))
        })?;

        let file_name = self.path.file_name().ok_or_else(|| {
            AtomicJsonError::IoError(std::io::Error::new(
                ErrorKind::InvalidInput,
                "Path has no file name",
            ))
        })?;

        let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let tmp_name = format!(
            "{TEMP_PREFIX}{}.{}-{seq}{TEMP_SUFFIX}",
            file_name.to_string_lossy(),
            std::process::id()
        );
        Ok(parent.join(tmp_name))
    }

    #[cfg(unix)]
    async fn sync_parent(&self) {
        let Some(parent) = self.path.parent() else {
            return;
        };
        match File::open(parent).await {
            Ok(dir) => {
                if let Err(e) = dir.sync_all().await {
                    tracing::warn!(dir = %parent.display(), error = %e, "Failed to sync directory");
                }
            }
            Err(e) => {
                tracing::warn!(dir = %parent.display(), error = %e, "Failed to open directory for sync");
            }
        }
    }

    #[cfg(not(unix))]
    async fn sync_parent(&self) {}
}

/// Returns true for file names produced by [`AtomicJsonFile::save`] in flight.
pub fn is_temp_file_name(name: &str) -> bool {
    name.starts_with(TEMP_PREFIX) && name.ends_with(TEMP_SUFFIX)
}

/// Serializes with four-space indentation, leaving non-ASCII text unescaped.
fn to_pretty_json<T: Serialize>(data: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    data.serialize(&mut serializer)?;
    Ok(out)
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    Ok(())
}
