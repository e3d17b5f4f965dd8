//! Line editing support for the chat prompt.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::collections::BTreeSet;

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::command::{COMMANDS, usage};

/// Completes command names and, after `/view` or `/chat`, the names of
/// archived logs.
#[derive(Default)]
pub struct ChatHelper {
    keys: BTreeSet<String>,
}

impl ChatHelper {
    /// Replaces the log names offered for completion.
    pub fn set_keys(&mut self, keys: BTreeSet<String>) {
        self.keys = keys;
    }

    /// Start of the span being completed and the candidates for it.
    fn candidates(&self, line: &str) -> (usize, Vec<String>) {
        if !line.starts_with('/') {
            return (0, Vec::new());
        }
        match line.split_once(' ') {
            None => (
                0,
                COMMANDS
                    .iter()
                    .filter(|cmd| cmd.starts_with(line))
                    .map(|cmd| cmd.to_string())
                    .collect(),
            ),
            Some((command @ ("/view" | "/chat"), arg)) => (
                command.len() + 1,
                self.keys
                    .iter()
                    .filter(|key| key.starts_with(arg))
                    .cloned()
                    .collect(),
            ),
            Some(_) => (0, Vec::new()),
        }
    }

    fn hint_for(&self, line: &str) -> Option<String> {
        let (start, candidates) = self.candidates(line);
        let typed = &line[start..];
        if let Some(first) = candidates.first().filter(|c| c.len() > typed.len()) {
            return Some(first[typed.len()..].to_string());
        }

        // A complete command with nothing after it: show its arguments.
        let command = line.trim_end();
        if command.contains(' ') {
            return None;
        }
        let args = usage(command)?;
        let separator = if line.ends_with(' ') { "" } else { " " };
        Some(format!("{separator}{args}"))
    }
}

impl Helper for ChatHelper {}

impl Completer for ChatHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, candidates) = self.candidates(&line[..pos]);
        let pairs = candidates
            .into_iter()
            .map(|candidate| Pair {
                display: candidate.clone(),
                replacement: candidate,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Highlighter for ChatHelper {
    /// Known commands in cyan, unknown ones in red; messages stay plain.
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if !line.starts_with('/') {
            return Borrowed(line);
        }
        let (command, rest) = line.split_at(line.find(' ').unwrap_or(line.len()));
        let known = command == "/exit" || COMMANDS.iter().any(|cmd| *cmd == command);
        let styled = if known {
            command.bright_cyan()
        } else {
            command.red()
        };
        Owned(format!("{styled}{rest}"))
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned(hint.dimmed().to_string())
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for ChatHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos < line.len() {
            return None;
        }
        self.hint_for(line)
    }
}

impl Validator for ChatHelper {}

#[cfg(test)]
mod tests {
    use super::*;

    fn helper_with_keys(keys: &[&str]) -> ChatHelper {
        let mut helper = ChatHelper::default();
        helper.set_keys(keys.iter().map(|k| k.to_string()).collect());
        helper
    }

    #[test]
    fn test_completes_command_names() {
        let helper = ChatHelper::default();
        assert_eq!(helper.candidates("/c"), (0, vec!["/clear".to_string(), "/chat".to_string()]));
        assert_eq!(helper.candidates("hello"), (0, vec![]));
    }

    #[test]
    fn test_completes_log_names_after_view_and_chat() {
        let helper = helper_with_keys(&["Chat_42", "Team A", "Team B"]);

        assert_eq!(
            helper.candidates("/view Te"),
            (6, vec!["Team A".to_string(), "Team B".to_string()])
        );
        assert_eq!(helper.candidates("/chat C"), (6, vec!["Chat_42".to_string()]));
        assert_eq!(helper.candidates("/as Te"), (0, vec![]));
    }

    #[test]
    fn test_hints() {
        let helper = helper_with_keys(&["Team Chat_"]);

        assert_eq!(helper.hint_for("/vi").as_deref(), Some("ew"));
        assert_eq!(helper.hint_for("/view Te").as_deref(), Some("am Chat_"));
        assert_eq!(helper.hint_for("/as").as_deref(), Some(" <name> <id>"));
        assert_eq!(helper.hint_for("/as ").as_deref(), Some("<name> <id>"));
        assert_eq!(helper.hint_for("/as Bob"), None);
        assert_eq!(helper.hint_for("/list"), None);
        assert_eq!(helper.hint_for("hi"), None);
    }

    #[test]
    fn test_view_without_logs_hints_usage() {
        let helper = ChatHelper::default();
        assert_eq!(helper.hint_for("/view").as_deref(), Some(" <name>"));
        assert_eq!(helper.hint_for("/view ").as_deref(), Some("<name>"));
    }
}
