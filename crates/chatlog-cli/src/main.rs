use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use chatlog_infrastructure::{ConfigService, JsonLogRepository, logging};

mod commands;

#[derive(Parser)]
#[command(name = "chatlog")]
#[command(about = "chatlog - per-conversation message archive", long_about = None)]
struct Cli {
    /// Log store directory (overrides CHATLOG_DIR and config.toml)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Configuration file (default: ~/.config/chatlog/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Archive one message
    Append {
        /// Conversation title
        #[arg(long)]
        chat: Option<String>,
        /// Conversation id, used when the chat has no usable title
        #[arg(long, default_value_t = 0)]
        chat_id: i64,
        #[arg(long, default_value = "")]
        author: String,
        #[arg(long)]
        author_id: i64,
        /// ISO-8601 send time (default: now)
        #[arg(long)]
        date: Option<String>,
        text: String,
    },
    /// List archived logs
    List,
    /// Print a log, resolving a name or unique prefix
    Show { name: String },
    /// Delete every archived log
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ConfigService::load_from(path)?,
        None => ConfigService::load()?,
    };
    let _log_guard = match logging::init(&config.logging) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Logging disabled: {}", e);
            None
        }
    };

    let repo = JsonLogRepository::from_config(&config, cli.dir.as_deref())?;

    let output = match cli.command {
        Commands::Append {
            chat,
            chat_id,
            author,
            author_id,
            date,
            text,
        } => {
            let message = commands::NewMessage {
                chat: chat.as_deref(),
                chat_id,
                author,
                author_id,
                date: date.as_deref(),
                text,
            };
            commands::append(&repo, message).await?
        }
        Commands::List => commands::list(&repo).await?,
        Commands::Show { name } => commands::show(&repo, &name).await?,
        Commands::Clear => commands::clear(&repo).await?,
    };

    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}
