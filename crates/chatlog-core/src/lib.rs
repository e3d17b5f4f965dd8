pub mod config;
pub mod entry;
pub mod error;
pub mod key;
pub mod repository;

// Re-export common types
pub use entry::{Entry, Timestamp};
pub use error::{ChatlogError, ClearFailure, Result};
pub use key::{StorageKey, conversation_title, normalize, resolve_key};
pub use repository::LogRepository;
