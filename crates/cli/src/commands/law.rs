//! `lawdesk law` — Print the full text of one statute.

use lawdesk_core::StatuteError;
use lawdesk_statutes::StatuteClient;

use super::load_config;

pub async fn run(id: String) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(None)?;
    let client = StatuteClient::from_config(&config);

    match client.fetch_statute_content(&id).await {
        Ok(text) => {
            println!("{text}");
            Ok(())
        }
        Err(StatuteError::NotFound { .. }) => {
            Err(format!("Statute {id} returned no content. Check the id with `lawdesk laws`.").into())
        }
        Err(e) => Err(format!("Failed to fetch statute {id}: {e}").into()),
    }
}
