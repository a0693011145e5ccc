//! Gemini provider implementation.
//!
//! Talks to the Generative Language REST API:
//! - `models/{model}:generateContent` for one-shot completions
//! - `models/{model}:streamGenerateContent?alt=sse` for streamed turns
//!
//! Each request carries exactly one user content part holding the whole
//! assembled prompt.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use lawdesk_config::AppConfig;
use lawdesk_core::error::ProviderError;
use lawdesk_core::provider::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// A Gemini LLM provider.
pub struct GeminiProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a new Gemini provider.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to build HTTP client, falling back to defaults");
                reqwest::Client::default()
            });

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Build a provider from the loaded configuration.
    ///
    /// A missing key yields an unconfigured provider rather than an error so
    /// that the caller can report `MissingCredential` at turn time.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.api_key.clone().unwrap_or_default(),
            config.llm.base_url.clone(),
            Duration::from_secs(config.llm.timeout_secs),
        )
    }

    fn endpoint(&self, model: ChatModel, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, model.as_str(), method)
    }

    fn request_body(prompt: &str) -> GenerateRequest<'_> {
        GenerateRequest {
            contents: vec![ApiContent {
                role: "user",
                parts: vec![ApiPart { text: prompt }],
            }],
        }
    }

    async fn send(
        &self,
        request: &ProviderRequest,
        method: &str,
        query: &[(&str, &str)],
    ) -> Result<reqwest::Response, ProviderError> {
        let url = self.endpoint(request.model, method);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .query(query)
            .header("Content-Type", "application/json")
            .json(&Self::request_body(&request.prompt))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        if (200..300).contains(&status) {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        warn!(status, body = %error_body, "Gemini returned error");
        Err(status_error(status, error_body))
    }
}

#[async_trait]
impl lawdesk_core::Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        debug!(model = %request.model, prompt_chars = request.prompt.chars().count(), "Sending completion request");

        let response = self.send(&request, "generateContent", &[]).await?;

        let api_response: GenerateResponse =
            response.json().await.map_err(|e| ProviderError::Api {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        if api_response.candidates.is_empty() {
            return Err(ProviderError::Api {
                status_code: 200,
                message: "No candidates in response".into(),
            });
        }

        Ok(ProviderResponse {
            text: api_response.text(),
            usage: api_response.usage(),
            model: api_response
                .model_version
                .unwrap_or_else(|| request.model.to_string()),
        })
    }

    async fn stream(&self, request: ProviderRequest) -> Result<ChunkReceiver, ProviderError> {
        debug!(model = %request.model, prompt_chars = request.prompt.chars().count(), "Sending streaming request");

        let response = self
            .send(&request, "streamGenerateContent", &[("alt", "sse")])
            .await?;

        let (tx, rx) = tokio::sync::mpsc::channel(64);

        // Spawn task to read the SSE byte stream and parse chunks
        tokio::spawn(async move {
            let mut byte_stream = response.bytes_stream();
            let mut lines = SseLineBuffer::default();
            let mut usage = None;

            while let Some(chunk_result) = byte_stream.next().await {
                let bytes = match chunk_result {
                    Ok(b) => b,
                    Err(e) => {
                        let _ = tx
                            .send(Err(ProviderError::StreamInterrupted(
                                e.without_url().to_string(),
                            )))
                            .await;
                        return;
                    }
                };

                lines.push(&bytes);
                while let Some(line) = lines.next_line() {
                    match handle_line(&line) {
                        LineOutcome::Skip => {}
                        LineOutcome::Chunk { text, usage: seen } => {
                            if seen.is_some() {
                                usage = seen;
                            }
                            if !text.is_empty() && tx.send(Ok(StreamChunk::text(text))).await.is_err() {
                                return; // receiver dropped
                            }
                        }
                        LineOutcome::Failed(e) => {
                            let _ = tx.send(Err(e)).await;
                            return;
                        }
                    }
                }
            }

            // A final event may arrive without a trailing newline
            if let Some(line) = lines.finish() {
                match handle_line(&line) {
                    LineOutcome::Chunk { text, usage: seen } => {
                        if seen.is_some() {
                            usage = seen;
                        }
                        if !text.is_empty() && tx.send(Ok(StreamChunk::text(text))).await.is_err() {
                            return;
                        }
                    }
                    LineOutcome::Failed(e) => {
                        let _ = tx.send(Err(e)).await;
                        return;
                    }
                    LineOutcome::Skip => {}
                }
            }

            let _ = tx.send(Ok(StreamChunk::done(usage))).await;
        });

        Ok(rx)
    }
}

/// Map a transport-level reqwest failure.
///
/// The URL is stripped from the message because it carries the API key.
fn transport_error(e: reqwest::Error) -> ProviderError {
    let e = e.without_url();
    if e.is_timeout() {
        ProviderError::Timeout(e.to_string())
    } else {
        ProviderError::Network(e.to_string())
    }
}

/// Map a non-2xx response to the matching error.
///
/// Gemini reports a bad key as `400 INVALID_ARGUMENT` rather than 401, so the
/// body is inspected as well as the status.
fn status_error(status: u16, body: String) -> ProviderError {
    let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
        .map(|envelope| envelope.error.message)
        .unwrap_or(body);

    match status {
        401 | 403 => ProviderError::AuthenticationFailed(message),
        400 if message.to_lowercase().contains("api key") => {
            ProviderError::AuthenticationFailed(message)
        }
        429 => ProviderError::QuotaExceeded(message),
        _ => ProviderError::Api {
            status_code: status,
            message,
        },
    }
}

enum LineOutcome {
    Skip,
    Chunk { text: String, usage: Option<Usage> },
    Failed(ProviderError),
}

fn handle_line(line: &str) -> LineOutcome {
    // Skip empty lines and SSE comments
    if line.is_empty() || line.starts_with(':') {
        return LineOutcome::Skip;
    }

    let Some(data) = line.strip_prefix("data:") else {
        trace!(line, "Ignoring non-data SSE line");
        return LineOutcome::Skip;
    };

    match serde_json::from_str::<GenerateResponse>(data.trim()) {
        Ok(event) => LineOutcome::Chunk {
            text: event.text(),
            usage: event.usage(),
        },
        Err(e) => {
            warn!(error = %e, "Unparseable SSE event");
            LineOutcome::Failed(ProviderError::StreamInterrupted(format!(
                "Malformed stream event: {e}"
            )))
        }
    }
}

/// Splits an SSE byte stream into lines.
///
/// Bytes are buffered until a newline so that multi-byte characters split
/// across network reads are decoded whole.
#[derive(Default)]
struct SseLineBuffer {
    buffer: Vec<u8>,
}

impl SseLineBuffer {
    fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    fn next_line(&mut self) -> Option<String> {
        let line_end = self.buffer.iter().position(|&b| b == b'\n')?;
        let line: Vec<u8> = self.buffer.drain(..=line_end).collect();
        let line = String::from_utf8_lossy(&line[..line_end]);
        Some(line.trim_end_matches('\r').to_string())
    }

    fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let line = String::from_utf8_lossy(&self.buffer).trim_end_matches('\r').to_string();
        self.buffer.clear();
        Some(line)
    }
}

// --- API request types ---

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<ApiContent<'a>>,
}

#[derive(Debug, Serialize)]
struct ApiContent<'a> {
    role: &'a str,
    parts: Vec<ApiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct ApiPart<'a> {
    text: &'a str,
}

// --- API response types ---

/// Body of `generateContent`, and of each `streamGenerateContent` SSE event.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
    #[serde(default)]
    usage_metadata: Option<ApiUsage>,
    #[serde(default)]
    model_version: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate's parts.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    fn usage(&self) -> Option<Usage> {
        self.usage_metadata.as_ref().map(|u| Usage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApiCandidate {
    #[serde(default)]
    content: Option<ApiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ApiResponseContent {
    #[serde(default)]
    parts: Vec<ApiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ApiResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}
