//! Storage key normalization.
//!
//! A conversation title becomes a file-name-safe key by keeping
//! alphanumerics, spaces and underscores and replacing everything else with
//! `_`. Different titles may collapse onto the same key; they then share one
//! log.

use crate::error::{ChatlogError, Result};
use std::collections::BTreeSet;
use std::fmt;

/// Upper bound on key length in bytes, leaving room for the extension.
pub const MAX_KEY_BYTES: usize = 200;

/// Converts an arbitrary title into a storage key.
///
/// The result contains no path separators or reserved characters and never
/// ends in whitespace. Empty input yields an empty key.
pub fn normalize(title: &str) -> String {
    let mut key: String = title
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == ' ' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if key.len() > MAX_KEY_BYTES {
        let mut cut = MAX_KEY_BYTES;
        while !key.is_char_boundary(cut) {
            cut -= 1;
        }
        key.truncate(cut);
    }

    let trimmed = key.trim_end().len();
    key.truncate(trimmed);
    key
}

/// A normalized, non-empty storage key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    /// Normalizes `title`, rejecting titles that leave nothing behind.
    pub fn from_title(title: &str) -> Result<Self> {
        let key = normalize(title);
        if key.is_empty() {
            return Err(ChatlogError::invalid_key(title));
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Returns the title a chat is logged under.
///
/// Chats without a usable title (private chats, titles made only of
/// punctuation) are logged as `Chat_<id>` so they never share the empty key.
pub fn conversation_title(title: Option<&str>, chat_id: i64) -> String {
    match title {
        Some(t) if !normalize(t).is_empty() => t.to_string(),
        _ => format!("Chat_{chat_id}"),
    }
}

/// Resolves free text (e.g. a button label) against the known keys.
///
/// An exact match after normalization wins. Otherwise a single key starting
/// with the candidate is accepted; several such keys are reported as
/// ambiguous instead of picking one.
pub fn resolve_key(candidate: &str, keys: &BTreeSet<String>) -> Result<StorageKey> {
    let wanted = StorageKey::from_title(candidate)?;

    if keys.contains(wanted.as_str()) {
        return Ok(wanted);
    }

    let matches: Vec<&String> = keys
        .iter()
        .filter(|k| k.starts_with(wanted.as_str()))
        .collect();

    match matches.as_slice() {
        [] => Err(ChatlogError::not_found(wanted.into_string())),
        [only] => Ok(StorageKey((*only).clone())),
        _ => Err(ChatlogError::Ambiguous {
            candidate: wanted.into_string(),
            matches: matches.iter().map(|k| k.to_string()).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_replaces_unsafe_characters() {
        assert_eq!(normalize("Team Chat!"), "Team Chat_");
        assert_eq!(normalize("a/b\\c:d"), "a_b_c_d");
        assert_eq!(normalize("../etc/passwd"), "___etc_passwd");
        assert_eq!(normalize("snake_case ok"), "snake_case ok");
    }

    #[test]
    fn test_normalize_keeps_unicode_letters_and_drops_emoji() {
        assert_eq!(normalize("Привет мир"), "Привет мир");
        assert_eq!(normalize("party 🎉"), "party _");
        assert_eq!(normalize("日本語2024"), "日本語2024");
    }

    #[test]
    fn test_normalize_trims_trailing_whitespace_only() {
        assert_eq!(normalize("  chat   "), "  chat");
        assert_eq!(normalize("chat\t"), "chat_");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for title in ["Team Chat!", "  x  ", "a.b.c", "Привет, мир!", ""] {
            let once = normalize(title);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_normalize_limits_length_on_char_boundary() {
        let title = "ж".repeat(150);
        let key = normalize(&title);
        assert!(key.len() <= MAX_KEY_BYTES);
        assert_eq!(key, "ж".repeat(100));
    }

    #[test]
    fn test_storage_key_rejects_empty() {
        assert!(matches!(
            StorageKey::from_title(""),
            Err(ChatlogError::InvalidKey { .. })
        ));
        assert!(matches!(
            StorageKey::from_title("   "),
            Err(ChatlogError::InvalidKey { .. })
        ));
        assert_eq!(StorageKey::from_title("!!!").unwrap().as_str(), "___");
    }

    #[test]
    fn test_conversation_title_falls_back_to_chat_id() {
        assert_eq!(conversation_title(Some("Team"), 7), "Team");
        assert_eq!(conversation_title(None, -1001), "Chat_-1001");
        assert_eq!(conversation_title(Some(""), 42), "Chat_42");
        assert_eq!(conversation_title(Some("   "), 42), "Chat_42");
    }

    #[test]
    fn test_resolve_prefers_exact_match() {
        let known = keys(&["Team", "Team Chat_"]);
        assert_eq!(resolve_key("Team", &known).unwrap().as_str(), "Team");
    }

    #[test]
    fn test_resolve_accepts_unique_prefix() {
        let known = keys(&["Team Chat_", "Family"]);
        assert_eq!(
            resolve_key("Team Chat!", &known).unwrap().as_str(),
            "Team Chat_"
        );
        assert_eq!(resolve_key("Fam", &known).unwrap().as_str(), "Family");
    }

    #[test]
    fn test_resolve_reports_ambiguous_prefix() {
        let known = keys(&["Team A", "Team B"]);
        match resolve_key("Team", &known) {
            Err(ChatlogError::Ambiguous { matches, .. }) => {
                assert_eq!(matches, vec!["Team A".to_string(), "Team B".to_string()]);
            }
            other => panic!("expected ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_missing_is_not_found() {
        let known = keys(&["Team"]);
        assert!(resolve_key("Other", &known).unwrap_err().is_not_found());
        assert!(matches!(
            resolve_key("", &known),
            Err(ChatlogError::InvalidKey { .. })
        ));
    }
}
