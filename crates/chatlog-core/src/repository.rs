//! Log repository trait.
//!
//! Defines the interface front-ends use to archive and retrieve logs.

use crate::entry::Entry;
use crate::error::Result;
use crate::key::resolve_key;
use async_trait::async_trait;
use std::collections::BTreeSet;

/// An abstract store of per-conversation logs.
///
/// Logs are addressed by the normalized form of a conversation title.
/// Implementations must serialize operations on the same key and keep every
/// persisted log a valid, complete container.
#[async_trait]
pub trait LogRepository: Send + Sync {
    /// Appends an entry to the log for `title`, creating the log if needed.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Entry durably written
    /// - `Err(InvalidKey)`: Title normalizes to an empty key
    /// - `Err(Corrupt)`: Existing log cannot be parsed; it is left untouched
    /// - `Err(Storage)`: Write failed; previous content is still intact
    async fn append(&self, title: &str, entry: Entry) -> Result<()>;

    /// Lists every key currently present.
    async fn list_keys(&self) -> Result<BTreeSet<String>>;

    /// Reads all entries of a log in append order.
    ///
    /// # Returns
    ///
    /// - `Ok(entries)`: Possibly empty list of entries
    /// - `Err(NotFound)`: No log for the key
    /// - `Err(Corrupt)`: The stored log cannot be parsed
    async fn read(&self, key: &str) -> Result<Vec<Entry>>;

    /// Deletes every log.
    ///
    /// # Returns
    ///
    /// - `Ok(cleared)`: Keys removed
    /// - `Err(PartialClear)`: Keys removed and keys that could not be removed
    async fn clear_all(&self) -> Result<Vec<String>>;

    /// Resolves free text against the known keys and reads the match.
    ///
    /// Returns the resolved key alongside its entries.
    async fn resolve_and_read(&self, free_text: &str) -> Result<(String, Vec<Entry>)> {
        let keys = self.list_keys().await?;
        let key = resolve_key(free_text, &keys)?;
        let entries = self.read(key.as_str()).await?;
        Ok((key.into_string(), entries))
    }
}
