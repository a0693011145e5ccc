//! HTTP client for the e-Gov statute registry.
//!
//! - `GET {base}/lawlists/{category}` lists statutes in a category
//! - `GET {base}/lawdata/{id}` returns one statute's full XML
//!
//! Failures are returned to the caller once and never retried.

use std::time::Duration;

use lawdesk_config::AppConfig;
use lawdesk_core::{LawCategory, StatuteError, StatuteSummary};
use tracing::{debug, info, warn};

use crate::xml::{extract_statute_text, parse_law_list};

pub struct StatuteClient {
    base_url: String,
    client: reqwest::Client,
}

impl StatuteClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to build HTTP client, falling back to defaults");
                reqwest::Client::default()
            });

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.registry.base_url.clone(),
            Duration::from_secs(config.registry.timeout_secs),
        )
    }

    /// URL of the list query for `category`. The suffix is the category code.
    pub fn list_url(&self, category: LawCategory) -> String {
        format!("{}/lawlists/{}", self.base_url, category.code())
    }

    pub fn content_url(&self, id: &str) -> String {
        format!("{}/lawdata/{}", self.base_url, id)
    }

    /// Fetch the summaries of every statute in `category`.
    pub async fn list_statutes(
        &self,
        category: LawCategory,
    ) -> Result<Vec<StatuteSummary>, StatuteError> {
        let body = self.get(&self.list_url(category)).await?;
        let list = parse_law_list(&body).inspect_err(|e| {
            warn!(category = category.code(), error = %e, "Failed to parse statute list");
        })?;

        info!(category = category.code(), count = list.len(), "Fetched statute list");
        Ok(list)
    }

    /// Fetch the full text of one statute as newline-joined text runs.
    ///
    /// A payload that parses but holds no text is reported as
    /// [`StatuteError::NotFound`], never as an empty string.
    pub async fn fetch_statute_content(&self, id: &str) -> Result<String, StatuteError> {
        let body = self.get(&self.content_url(id)).await?;
        let text = extract_statute_text(&body).inspect_err(|e| {
            warn!(statute_id = id, error = %e, "Failed to parse statute content");
        })?;

        if text.is_empty() {
            warn!(statute_id = id, "Statute content is empty");
            return Err(StatuteError::NotFound { id: id.to_string() });
        }

        info!(statute_id = id, chars = text.chars().count(), "Fetched statute content");
        Ok(text)
    }

    async fn get(&self, url: &str) -> Result<Vec<u8>, StatuteError> {
        debug!(url, "Querying statute registry");

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(url, error = %e, "Statute registry request failed");
            StatuteError::Network(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url, status = status.as_u16(), "Statute registry returned error");
            return Err(StatuteError::Network(format!("HTTP {status} from {url}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| StatuteError::Network(e.to_string()))?;
        Ok(body.to_vec())
    }
}
