//! Subcommand implementations.
//!
//! Each command returns the text to print so it can be tested without a
//! terminal.

use anyhow::{Context, Result, anyhow, bail};
use chatlog_core::{
    ChatlogError, Entry, LogRepository, StorageKey, Timestamp, conversation_title,
};

pub struct NewMessage<'a> {
    pub chat: Option<&'a str>,
    pub chat_id: i64,
    pub author: String,
    pub author_id: i64,
    pub date: Option<&'a str>,
    pub text: String,
}

pub async fn append(repo: &dyn LogRepository, message: NewMessage<'_>) -> Result<String> {
    let timestamp = match message.date {
        Some(raw) => Timestamp::parse(raw).ok_or_else(|| anyhow!("Invalid date: {raw}"))?,
        None => Timestamp::now(),
    };
    let title = conversation_title(message.chat, message.chat_id);
    let key = StorageKey::from_title(&title)?;

    let entry = Entry::new(message.author, message.author_id, message.text, timestamp);
    repo.append(&title, entry)
        .await
        .with_context(|| format!("Failed to log message to '{key}'"))?;

    tracing::debug!(key = %key, "Message archived from CLI");
    Ok(format!("Logged to {key}"))
}

pub async fn list(repo: &dyn LogRepository) -> Result<String> {
    let keys = repo.list_keys().await?;
    if keys.is_empty() {
        return Ok("No logs available.".to_string());
    }
    Ok(keys.into_iter().collect::<Vec<_>>().join("\n"))
}

pub async fn show(repo: &dyn LogRepository, name: &str) -> Result<String> {
    match repo.resolve_and_read(name).await {
        Ok((_, entries)) if entries.is_empty() => Ok("Log is empty.".to_string()),
        Ok((_, entries)) => Ok(entries.iter().map(format_entry).collect::<Vec<_>>().join("\n")),
        Err(ChatlogError::NotFound { .. } | ChatlogError::InvalidKey { .. }) => {
            bail!("File not found: {name}")
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn clear(repo: &dyn LogRepository) -> Result<String> {
    match repo.clear_all().await {
        Ok(cleared) => Ok(format!("Message history cleared ({} log(s)).", cleared.len())),
        Err(ChatlogError::PartialClear { cleared, failed }) => {
            let details: Vec<String> = failed
                .iter()
                .map(|f| format!("  {}: {}", f.key, f.message))
                .collect();
            bail!(
                "Cleared {} log(s), could not clear {}:\n{}",
                cleared.len(),
                failed.len(),
                details.join("\n")
            )
        }
        Err(e) => Err(e.into()),
    }
}

/// Markdown emphasis, as chat clients render log lines.
fn format_entry(entry: &Entry) -> String {
    entry.display_line(|s| format!("**{s}**"))
}
