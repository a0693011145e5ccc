//! LawDesk CLI — the main entry point.
//!
//! Commands:
//! - `onboard`  — Write a default config file
//! - `chat`     — Interactive session with uploads, statutes and chat
//! - `ask`      — One-shot question with optional files and statutes
//! - `laws`     — List statutes in a registry category
//! - `law`      — Print one statute's full text
//! - `extract`  — Print the text extracted from a PDF or Markdown file
//! - `doctor`   — Diagnose configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lawdesk_core::{ChatModel, LawCategory, StatuteMode};

mod commands;

#[derive(Parser)]
#[command(
    name = "lawdesk",
    about = "LawDesk — chat with your documents and Japanese statutes",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Onboard,

    /// Start an interactive session
    Chat {
        /// Upload a PDF or Markdown file before the session starts (repeatable)
        #[arg(short, long = "file")]
        files: Vec<PathBuf>,

        /// Attach one statute at a time (single) or many (multi)
        #[arg(long)]
        mode: Option<StatuteMode>,

        /// Override the configured model
        #[arg(short, long)]
        model: Option<ChatModel>,
    },

    /// Ask a single question and print the streamed answer
    Ask {
        question: String,

        /// Use a PDF or Markdown file as context (repeatable)
        #[arg(short, long = "file")]
        files: Vec<PathBuf>,

        /// Attach a statute by registry id (repeatable)
        #[arg(short, long = "law")]
        laws: Vec<String>,

        /// Override the configured model
        #[arg(short, long)]
        model: Option<ChatModel>,

        /// Print the assembled prompt after the answer
        #[arg(long)]
        show_prompt: bool,
    },

    /// List statutes: 1 = all, 2 = constitution & acts, 3 = cabinet & imperial orders, 4 = ministerial ordinances
    Laws { category: LawCategory },

    /// Print the full text of a statute
    Law { id: String },

    /// Print the text extracted from a PDF or Markdown file
    Extract { file: PathBuf },

    /// Diagnose configuration
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Chat { files, mode, model } => commands::chat::run(files, mode, model).await?,
        Commands::Ask {
            question,
            files,
            laws,
            model,
            show_prompt,
        } => commands::ask::run(question, files, laws, model, show_prompt).await?,
        Commands::Laws { category } => commands::laws::run(category).await?,
        Commands::Law { id } => commands::law::run(id).await?,
        Commands::Extract { file } => commands::extract::run(file).await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
