use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;

use chatlog_core::LogRepository;
use chatlog_infrastructure::{ConfigService, JsonLogRepository, logging};

mod command;
mod helper;
mod render;
mod session;

use helper::ChatHelper;
use session::{ChatSession, Output};

/// Interactive chat that archives every message it receives.
#[derive(Parser)]
#[command(name = "chatlog-chat")]
struct Args {
    /// Log store directory (overrides CHATLOG_DIR and config.toml)
    #[arg(long)]
    dir: Option<PathBuf>,
    /// Conversation title; untitled chats are logged as Chat_<id>
    #[arg(long)]
    chat: Option<String>,
    #[arg(long, default_value_t = 1)]
    chat_id: i64,
    #[arg(long, default_value = "")]
    author: String,
    #[arg(long, default_value_t = 0)]
    author_id: i64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ConfigService::load()?;
    let _log_guard = match logging::init(&config.logging) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("{}", format!("Logging disabled: {}", e).yellow());
            None
        }
    };

    let repo = Arc::new(JsonLogRepository::from_config(&config, args.dir.as_deref())?);
    tracing::info!(root = %repo.root().display(), "Chat session started");

    let mut session = ChatSession::new(
        Arc::clone(&repo) as Arc<dyn LogRepository>,
        args.chat.as_deref(),
        args.chat_id,
        args.author,
        args.author_id,
    );

    let mut rl: Editor<ChatHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(ChatHelper::default()));
    refresh_log_names(&mut rl, &*repo).await;

    println!("{}", "Type /start for the menu, /help for commands.".bright_yellow());

    loop {
        let (author, _) = session.author();
        let prompt = format!("{}@{}> ", author, session.title());
        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim_end();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                let outputs = session.handle(line).await;
                if outputs.contains(&Output::Quit) {
                    break;
                }
                for output in &outputs {
                    if let Some(text) = render::render(output) {
                        println!("{}", text);
                    }
                }
                refresh_log_names(&mut rl, &*repo).await;
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}", format!("Input error: {:?}", e).red());
                break;
            }
        }
    }

    Ok(())
}

/// Reloads the log names offered after `/view` and `/chat`.
async fn refresh_log_names(
    rl: &mut Editor<ChatHelper, DefaultHistory>,
    repo: &dyn LogRepository,
) {
    match repo.list_keys().await {
        Ok(keys) => {
            if let Some(helper) = rl.helper_mut() {
                helper.set_keys(keys);
            }
        }
        Err(e) => tracing::debug!(error = %e, "Could not refresh log names"),
    }
}
