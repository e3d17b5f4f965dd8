//! One simulated chat conversation driving the log store.

use std::sync::Arc;

use chatlog_core::{ChatlogError, Entry, LogRepository, Timestamp, conversation_title, normalize};

use crate::command::{COMMANDS, ChatCommand};

/// What the REPL shows in response to one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Notice(String),
    Error(String),
    /// Choices the user can type next (menu entries or log names).
    Buttons(Vec<String>),
    Log { key: String, entries: Vec<Entry> },
    Logged { key: String },
    Quit,
}

pub struct ChatSession {
    repo: Arc<dyn LogRepository>,
    title: String,
    chat_id: i64,
    author_name: String,
    author_id: i64,
}

impl ChatSession {
    pub fn new(
        repo: Arc<dyn LogRepository>,
        title: Option<&str>,
        chat_id: i64,
        author_name: impl Into<String>,
        author_id: i64,
    ) -> Self {
        Self {
            repo,
            title: conversation_title(title, chat_id),
            chat_id,
            author_name: author_name.into(),
            author_id,
        }
    }

    /// Title messages are currently archived under.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> (&str, i64) {
        (&self.author_name, self.author_id)
    }

    pub async fn handle(&mut self, line: &str) -> Vec<Output> {
        match ChatCommand::parse(line) {
            ChatCommand::Start => vec![
                Output::Notice("Choose an action:".to_string()),
                Output::Buttons(vec!["/list".to_string(), "/clear".to_string()]),
            ],
            ChatCommand::ListLogs => self.list_logs().await,
            ChatCommand::ClearHistory => self.clear_history().await,
            ChatCommand::View(name) => self.view(&name).await,
            ChatCommand::As { name, id } => {
                self.author_name = name;
                self.author_id = id;
                vec![Output::Notice(format!(
                    "Now writing as {} ({})",
                    self.author_name, self.author_id
                ))]
            }
            ChatCommand::Chat(title) => {
                self.title = conversation_title(Some(&title), self.chat_id);
                vec![Output::Notice(format!("Switched to chat '{}'", self.title))]
            }
            ChatCommand::Help => vec![
                Output::Notice("Commands:".to_string()),
                Output::Buttons(COMMANDS.iter().map(|c| c.to_string()).collect()),
            ],
            ChatCommand::Quit => vec![Output::Quit],
            ChatCommand::Message(text) => self.log_message(text).await,
            ChatCommand::Invalid(message) => vec![Output::Error(message)],
        }
    }

    async fn list_logs(&self) -> Vec<Output> {
        match self.repo.list_keys().await {
            Ok(keys) if keys.is_empty() => vec![Output::Notice("No logs available.".to_string())],
            Ok(keys) => vec![
                Output::Notice("Choose a chat to view:".to_string()),
                Output::Buttons(keys.into_iter().map(|k| format!("/view {k}")).collect()),
            ],
            Err(e) => {
                tracing::error!(error = %e, "Error listing logs");
                vec![Output::Error("Failed to list logs.".to_string())]
            }
        }
    }

    async fn clear_history(&self) -> Vec<Output> {
        match self.repo.clear_all().await {
            Ok(_) => vec![Output::Notice("Message history cleared.".to_string())],
            Err(ChatlogError::PartialClear { cleared, failed }) => {
                let keys: Vec<&str> = failed.iter().map(|f| f.key.as_str()).collect();
                vec![Output::Error(format!(
                    "Cleared {} log(s); could not clear: {}",
                    cleared.len(),
                    keys.join(", ")
                ))]
            }
            Err(e) => {
                tracing::error!(error = %e, "Error clearing history");
                vec![Output::Error("Failed to clear history.".to_string())]
            }
        }
    }

    async fn view(&self, name: &str) -> Vec<Output> {
        tracing::info!(name, "Opening log");
        match self.repo.resolve_and_read(name).await {
            Ok((_, entries)) if entries.is_empty() => {
                vec![Output::Notice("Log is empty.".to_string())]
            }
            Ok((key, entries)) => vec![Output::Log { key, entries }],
            Err(ChatlogError::NotFound { .. } | ChatlogError::InvalidKey { .. }) => {
                vec![Output::Error("File not found.".to_string())]
            }
            Err(ChatlogError::Ambiguous { matches, .. }) => vec![
                Output::Error("Several logs match, pick one:".to_string()),
                Output::Buttons(matches.into_iter().map(|k| format!("/view {k}")).collect()),
            ],
            Err(e) => {
                tracing::error!(error = %e, "Error viewing log");
                vec![Output::Error(
                    "An error occurred while opening the file.".to_string(),
                )]
            }
        }
    }

    async fn log_message(&self, text: String) -> Vec<Output> {
        let entry = Entry::new(
            self.author_name.clone(),
            self.author_id,
            text,
            Timestamp::now(),
        );
        match self.repo.append(&self.title, entry).await {
            Ok(()) => vec![Output::Logged {
                key: normalize(&self.title),
            }],
            Err(e) => {
                tracing::error!(error = %e, "Error logging message");
                vec![Output::Error(format!("Failed to log message: {e}"))]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatlog_infrastructure::JsonLogRepository;
    use tempfile::TempDir;

    fn create_session(title: Option<&str>) -> (ChatSession, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let repo = Arc::new(JsonLogRepository::new(temp_dir.path()));
        (ChatSession::new(repo, title, 42, "Alice", 1), temp_dir)
    }

    #[tokio::test]
    async fn test_messages_are_logged_and_viewable() {
        let (mut session, _temp_dir) = create_session(Some("Team Chat!"));

        let out = session.handle("hi").await;
        assert_eq!(
            out,
            vec![Output::Logged {
                key: "Team Chat_".to_string()
            }]
        );

        match session.handle("/view Team Chat!").await.as_slice() {
            [Output::Log { key, entries }] => {
                assert_eq!(key, "Team Chat_");
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].author_name, "Alice");
                assert_eq!(entries[0].text, "hi");
            }
            other => panic!("unexpected output {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_untitled_chat_uses_chat_id() {
        let (mut session, _temp_dir) = create_session(None);
        assert_eq!(session.title(), "Chat_42");

        session.handle("hello").await;
        let out = session.handle("/list").await;
        assert_eq!(
            out[1],
            Output::Buttons(vec!["/view Chat_42".to_string()])
        );
    }

    #[tokio::test]
    async fn test_menu_labels_are_just_messages() {
        let (mut session, _temp_dir) = create_session(Some("t"));
        session.handle("/as Bob 2").await;
        session.handle("/clear").await;

        let out = session.handle("/list").await;
        assert_eq!(out, vec![Output::Notice("No logs available.".to_string())]);

        session.handle("t").await;
        let (_, entries) = session.repo.resolve_and_read("t").await.unwrap();
        assert_eq!(entries[0].text, "t");
        assert_eq!(entries[0].author_id, 2);
    }

    #[tokio::test]
    async fn test_view_missing_and_empty_logs() {
        let (mut session, temp_dir) = create_session(Some("t"));
        assert_eq!(
            session.handle("/view ghost").await,
            vec![Output::Error("File not found.".to_string())]
        );

        std::fs::write(temp_dir.path().join("Quiet.json"), "[]").unwrap();
        assert_eq!(
            session.handle("/view Quiet").await,
            vec![Output::Notice("Log is empty.".to_string())]
        );

        std::fs::write(temp_dir.path().join("Broken.json"), "[").unwrap();
        assert_eq!(
            session.handle("/view Broken").await,
            vec![Output::Error(
                "An error occurred while opening the file.".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_ambiguous_view_offers_choices() {
        let (mut session, _temp_dir) = create_session(Some("Team A"));
        session.handle("a").await;
        session.handle("/chat Team B").await;
        session.handle("b").await;

        let out = session.handle("/view Team").await;
        assert_eq!(
            out[1],
            Output::Buttons(vec![
                "/view Team A".to_string(),
                "/view Team B".to_string()
            ])
        );
    }
}
