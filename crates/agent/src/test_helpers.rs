//! Shared test helpers: scripted providers.

use std::collections::VecDeque;
use std::sync::Mutex;

use lawdesk_core::error::ProviderError;
use lawdesk_core::provider::{
    ChatModel, ChunkReceiver, Provider, ProviderRequest, ProviderResponse, StreamChunk, Usage,
};
use tokio::sync::mpsc;

/// What one call to `stream` should do.
pub enum Script {
    /// Reject the request before any chunk is produced.
    Reject(ProviderError),

    /// Deliver these items in order, then close the channel.
    Items(Vec<Result<StreamChunk, ProviderError>>),
}

impl Script {
    /// Stream `parts` as text chunks followed by a done chunk.
    pub fn text(parts: &[&str]) -> Self {
        let mut items: Vec<_> = parts.iter().map(|p| Ok(StreamChunk::text(*p))).collect();
        items.push(Ok(StreamChunk::done(Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }))));
        Self::Items(items)
    }
}

/// A mock provider that plays back one script per `stream` call and records
/// every prompt and model it receives.
///
/// Panics if more calls are made than scripts provided.
pub struct ScriptedProvider {
    scripts: Mutex<VecDeque<Script>>,
    prompts: Mutex<Vec<String>>,
    models: Mutex<Vec<ChatModel>>,
    configured: bool,
}

impl ScriptedProvider {
    pub fn new(scripts: Vec<Script>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            prompts: Mutex::new(Vec::new()),
            models: Mutex::new(Vec::new()),
            configured: true,
        }
    }

    /// A provider with no credential. Any call panics.
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new(Vec::new())
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn models(&self) -> Vec<ChatModel> {
        self.models.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        panic!("ScriptedProvider: complete() is not scripted");
    }

    async fn stream(&self, request: ProviderRequest) -> Result<ChunkReceiver, ProviderError> {
        self.models.lock().unwrap().push(request.model);
        self.prompts.lock().unwrap().push(request.prompt);

        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .expect("ScriptedProvider: no more scripts");

        match script {
            Script::Reject(e) => Err(e),
            Script::Items(items) => {
                let (tx, rx) = mpsc::channel(items.len().max(1));
                for item in items {
                    tx.send(item).await.unwrap();
                }
                Ok(rx)
            }
        }
    }
}
