//! Terminal rendering of session output.

use chatlog_core::Entry;
use colored::Colorize;

use crate::session::Output;

/// One log line with the author and message in bold.
pub fn format_entry(entry: &Entry) -> String {
    entry.display_line(|s| s.bold().to_string())
}

pub fn render(output: &Output) -> Option<String> {
    let text = match output {
        Output::Notice(message) => message.bright_yellow().to_string(),
        Output::Error(message) => message.red().to_string(),
        Output::Buttons(labels) => labels
            .iter()
            .map(|label| format!("  [{}]", label.bright_cyan()))
            .collect::<Vec<_>>()
            .join("\n"),
        Output::Log { key, entries } => {
            let mut lines = vec![format!("== {} ==", key).green().to_string()];
            lines.extend(entries.iter().map(format_entry));
            lines.join("\n")
        }
        Output::Logged { key } => format!("(logged to {key})").dimmed().to_string(),
        Output::Quit => return None,
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatlog_core::Timestamp;

    #[test]
    fn test_format_entry_plain() {
        colored::control::set_override(false);
        let entry = Entry::new(
            "Alice",
            1,
            "hi",
            Timestamp::parse("2024-01-01T10:00:00").unwrap(),
        );
        assert_eq!(format_entry(&entry), "Alice (1): hi [2024-01-01T10:00:00]");
    }

    #[test]
    fn test_render_buttons_and_quit() {
        colored::control::set_override(false);
        let out = Output::Buttons(vec!["/list".to_string(), "/clear".to_string()]);
        assert_eq!(render(&out).unwrap(), "  [/list]\n  [/clear]");
        assert!(render(&Output::Quit).is_none());
    }
}
