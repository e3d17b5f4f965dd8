//! Low-level file storage primitives.
//!
//! - `atomic_json`: tmp-file + rename writes of whole JSON documents
//! - `key_locks`: per-key mutual exclusion with a store-wide gate

pub mod atomic_json;
pub mod key_locks;

pub use atomic_json::{AtomicJsonError, AtomicJsonFile, is_temp_file_name};
pub use key_locks::{KeyGuard, KeyLocks, StoreGuard};
