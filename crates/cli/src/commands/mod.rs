//! Subcommand implementations and the helpers they share.

pub mod ask;
pub mod chat;
pub mod doctor;
pub mod extract;
pub mod law;
pub mod laws;
pub mod onboard;

use std::error::Error;
use std::io::Write;
use std::path::Path;

use lawdesk_agent::{TurnStream, UploadReport};
use lawdesk_config::AppConfig;
use lawdesk_core::{ChatModel, UploadItem};
use tracing::debug;

/// Load the config, applying a `--model` override.
pub(crate) fn load_config(model: Option<ChatModel>) -> Result<AppConfig, Box<dyn Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    if let Some(model) = model {
        config.model = model;
    }
    debug!(?config, "Loaded configuration");
    Ok(config)
}

/// Read a file from disk as an upload, named by its file name.
pub(crate) async fn read_upload(path: &Path) -> Result<UploadItem, Box<dyn Error>> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| format!("Invalid file name: {}", path.display()))?;
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    Ok(UploadItem::new(name, bytes))
}

/// Read every path, reporting unreadable files and keeping the rest.
pub(crate) async fn read_uploads(paths: &[impl AsRef<Path>]) -> Vec<UploadItem> {
    let mut items = Vec::with_capacity(paths.len());
    for path in paths {
        match read_upload(path.as_ref()).await {
            Ok(item) => items.push(item),
            Err(e) => eprintln!("  ⚠️  {e}"),
        }
    }
    items
}

pub(crate) fn print_upload_report(report: &UploadReport) {
    for name in &report.added {
        println!("  ✅ Added {name}");
    }
    for warning in &report.warnings {
        eprintln!("  ⚠️  Skipped {}: {warning}", warning.file_name());
    }
}

/// Print an answer as it streams. The partial answer stays on screen if the
/// stream fails.
pub(crate) async fn print_stream(mut stream: TurnStream<'_>) -> Result<(), Box<dyn Error>> {
    let mut stdout = std::io::stdout();
    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(text) => {
                print!("{text}");
                stdout.flush()?;
            }
            Err(e) => {
                println!();
                return Err(e.into());
            }
        }
    }
    println!();
    Ok(())
}

pub(crate) fn print_missing_credential() {
    eprintln!();
    eprintln!("  ERROR: No API key configured!");
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    eprintln!("    LAWDESK_API_KEY=...   (highest priority)");
    eprintln!("    GEMINI_API_KEY=...");
    eprintln!("    GOOGLE_API_KEY=...");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", AppConfig::config_path().display());
    eprintln!();
    eprintln!("  Get a Gemini key at: https://aistudio.google.com/app/apikey");
    eprintln!();
}
