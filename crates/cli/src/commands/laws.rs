//! `lawdesk laws` — List statutes in a registry category.

use lawdesk_core::{LawCategory, StatuteSummary};
use lawdesk_statutes::StatuteClient;

use super::load_config;

pub async fn run(category: LawCategory) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(None)?;
    let client = StatuteClient::from_config(&config);

    let list = client
        .list_statutes(category)
        .await
        .map_err(|e| format!("Failed to fetch statute list: {e}"))?;

    println!("📚 {category} — {} statutes\n", list.len());
    print_list(&list);
    Ok(())
}

/// Numbered listing shared with the chat REPL. Numbers start at 1.
pub(crate) fn print_list(list: &[StatuteSummary]) {
    for (i, summary) in list.iter().enumerate() {
        println!("  {:>5}. {summary}  [{}]", i + 1, summary.id);
    }
}
