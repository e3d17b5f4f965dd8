//! Chat commands.
//!
//! Every input line maps to exactly one [`ChatCommand`]. Only lines starting
//! with `/` are commands; anything else is a message to archive, even if it
//! happens to look like a log name or a menu label.

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Show the action menu.
    Start,
    /// List every archived log.
    ListLogs,
    /// Delete every archived log.
    ClearHistory,
    /// Show the log matching the given name.
    View(String),
    /// Switch the current author.
    As { name: String, id: i64 },
    /// Switch the current conversation.
    Chat(String),
    /// Show command help.
    Help,
    /// Leave the REPL.
    Quit,
    /// Archive a message in the current conversation.
    Message(String),
    /// A `/` command that could not be parsed.
    Invalid(String),
}

/// Command names offered for completion.
pub const COMMANDS: &[&str] = &[
    "/start", "/list", "/clear", "/view", "/as", "/chat", "/help", "/quit",
];

/// Argument placeholder shown for commands that take arguments.
pub fn usage(command: &str) -> Option<&'static str> {
    match command {
        "/view" => Some("<name>"),
        "/chat" => Some("<title>"),
        "/as" => Some("<name> <id>"),
        _ => None,
    }
}

impl ChatCommand {
    pub fn parse(line: &str) -> Self {
        let Some(rest) = line.strip_prefix('/') else {
            return Self::Message(line.to_string());
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        match (name, arg) {
            ("start", "") => Self::Start,
            ("list", "") => Self::ListLogs,
            ("clear", "") => Self::ClearHistory,
            ("help", "") => Self::Help,
            ("quit" | "exit", "") => Self::Quit,
            ("view", "") => Self::usage_error("/view"),
            ("view", name) => Self::View(name.to_string()),
            ("chat", "") => Self::usage_error("/chat"),
            ("chat", title) => Self::Chat(title.to_string()),
            ("as", arg) => parse_author(arg).unwrap_or_else(|| Self::usage_error("/as")),
            _ => Self::Invalid(format!("Unknown command: /{name}")),
        }
    }

    fn usage_error(command: &str) -> Self {
        Self::Invalid(format!(
            "Usage: {command} {}",
            usage(command).unwrap_or_default()
        ))
    }
}

/// Parses `<name> <id>`; the name may contain spaces.
fn parse_author(arg: &str) -> Option<ChatCommand> {
    let (name, id) = arg.rsplit_once(char::is_whitespace)?;
    let id = id.parse().ok()?;
    Some(ChatCommand::As {
        name: name.trim().to_string(),
        id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_a_message() {
        assert_eq!(
            ChatCommand::parse("hello"),
            ChatCommand::Message("hello".to_string())
        );
        assert_eq!(
            ChatCommand::parse("View all files"),
            ChatCommand::Message("View all files".to_string())
        );
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(ChatCommand::parse("/start"), ChatCommand::Start);
        assert_eq!(ChatCommand::parse("/list"), ChatCommand::ListLogs);
        assert_eq!(ChatCommand::parse("/clear"), ChatCommand::ClearHistory);
        assert_eq!(ChatCommand::parse("/exit"), ChatCommand::Quit);
    }

    #[test]
    fn test_commands_with_arguments() {
        assert_eq!(
            ChatCommand::parse("/view Team Chat_"),
            ChatCommand::View("Team Chat_".to_string())
        );
        assert_eq!(
            ChatCommand::parse("/chat Team Chat!"),
            ChatCommand::Chat("Team Chat!".to_string())
        );
        assert_eq!(
            ChatCommand::parse("/as Mary Ann 42"),
            ChatCommand::As {
                name: "Mary Ann".to_string(),
                id: 42
            }
        );
    }

    #[test]
    fn test_invalid_commands() {
        assert_eq!(
            ChatCommand::parse("/as Bob"),
            ChatCommand::Invalid("Usage: /as <name> <id>".to_string())
        );
        assert!(matches!(ChatCommand::parse("/view"), ChatCommand::Invalid(_)));
        assert!(matches!(ChatCommand::parse("/as Bob"), ChatCommand::Invalid(_)));
        assert!(matches!(ChatCommand::parse("/as Bob x"), ChatCommand::Invalid(_)));
        assert!(matches!(ChatCommand::parse("/list all"), ChatCommand::Invalid(_)));
        assert!(matches!(ChatCommand::parse("/nope"), ChatCommand::Invalid(_)));
    }
}
