//! The chat turn cycle.
//!
//! One user question becomes one streamed model answer:
//!
//! 1. **Check** that the provider has a credential
//! 2. **Record** the user turn in the session history
//! 3. **Assemble** the prompt from the selected documents and statutes
//! 4. **Stream** the answer from the provider through a [`TurnStream`]
//! 5. **Record** the assistant turn once the stream ends
//!
//! The assistant turn is recorded exactly once per user turn, whatever
//! happens to the stream: normal completion, a mid-stream error, an early
//! rejection by the provider, or the caller dropping the stream. Chat
//! history therefore always alternates user/assistant.

use std::sync::Arc;

use lawdesk_core::error::ChatError;
use lawdesk_core::provider::{ChatModel, ChunkReceiver, Provider, ProviderRequest, Usage};
use lawdesk_core::session::Session;
use tracing::{debug, info, warn};

use crate::prompt;

/// Drives chat turns against a provider.
pub struct ChatOrchestrator {
    provider: Arc<dyn Provider>,
    model: ChatModel,
    last_prompt: Option<String>,
}

impl ChatOrchestrator {
    pub fn new(provider: Arc<dyn Provider>, model: ChatModel) -> Self {
        Self {
            provider,
            model,
            last_prompt: None,
        }
    }

    pub fn model(&self) -> ChatModel {
        self.model
    }

    pub fn set_model(&mut self, model: ChatModel) {
        self.model = model;
    }

    /// The prompt sent with the most recent turn, for display.
    pub fn last_prompt(&self) -> Option<&str> {
        self.last_prompt.as_deref()
    }

    /// Start a chat turn.
    ///
    /// Fails with [`ChatError::MissingCredential`] before touching the
    /// session when the provider has no credential. If the provider rejects
    /// the request outright, an empty assistant turn is recorded and the
    /// provider error is returned.
    pub async fn handle_user_turn<'s>(
        &mut self,
        session: &'s mut Session,
        system_prompt: &str,
        question: &str,
    ) -> Result<TurnStream<'s>, ChatError> {
        if !self.provider.is_configured() {
            warn!(provider = self.provider.name(), "Chat turn rejected: no credential");
            return Err(ChatError::MissingCredential);
        }

        info!(
            session_id = %session.id(),
            documents = session.selected_documents().count(),
            statutes = session.selected_statutes().len(),
            history = session.chat_history().len(),
            "Handling chat turn"
        );

        session.record_user_turn(question);

        let context = prompt::document_context(session.selected_documents());
        let assembled = prompt::assemble(
            system_prompt,
            &context,
            Some(session.selected_statutes()),
            question,
        );
        debug!(prompt_chars = assembled.chars().count(), "Assembled prompt");
        self.last_prompt = Some(assembled.clone());

        let request = ProviderRequest {
            model: self.model,
            prompt: assembled,
            stream: true,
        };

        match self.provider.stream(request).await {
            Ok(receiver) => Ok(TurnStream::new(session, receiver)),
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "Provider rejected chat turn");
                session.record_assistant_turn(String::new());
                Err(e.into())
            }
        }
    }
}

/// The streamed answer of one chat turn.
///
/// A finite, non-restartable sequence of text chunks. The running answer is
/// available through [`TurnStream::partial`] at any point, and is written to
/// the session history when the stream ends or is dropped.
pub struct TurnStream<'s> {
    session: &'s mut Session,
    receiver: Option<ChunkReceiver>,
    partial: String,
    usage: Option<Usage>,
    committed: bool,
}

impl<'s> TurnStream<'s> {
    fn new(session: &'s mut Session, receiver: ChunkReceiver) -> Self {
        Self {
            session,
            receiver: Some(receiver),
            partial: String::new(),
            usage: None,
            committed: false,
        }
    }

    /// Wait for the next text chunk.
    ///
    /// Returns `None` once the answer is complete. A provider error is
    /// yielded once as the final item; the partial answer is kept.
    pub async fn next(&mut self) -> Option<Result<String, ChatError>> {
        loop {
            let receiver = self.receiver.as_mut()?;
            match receiver.recv().await {
                Some(Ok(chunk)) => {
                    if chunk.usage.is_some() {
                        self.usage = chunk.usage;
                    }
                    if chunk.done {
                        self.commit();
                        return None;
                    }
                    match chunk.content {
                        Some(text) if !text.is_empty() => {
                            self.partial.push_str(&text);
                            return Some(Ok(text));
                        }
                        _ => continue,
                    }
                }
                Some(Err(e)) => {
                    warn!(error = %e, partial_chars = self.partial.chars().count(), "Chat stream failed");
                    self.commit();
                    return Some(Err(e.into()));
                }
                None => {
                    self.commit();
                    return None;
                }
            }
        }
    }

    /// The answer received so far.
    pub fn partial(&self) -> &str {
        &self.partial
    }

    /// Token usage, once the provider has reported it.
    pub fn usage(&self) -> Option<&Usage> {
        self.usage.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.committed
    }

    /// Drain the stream and return the full answer.
    pub async fn finish(mut self) -> Result<String, ChatError> {
        while let Some(item) = self.next().await {
            item?;
        }
        Ok(std::mem::take(&mut self.partial))
    }

    fn commit(&mut self) {
        if self.committed {
            return;
        }
        self.committed = true;
        self.receiver = None;
        self.session.record_assistant_turn(self.partial.clone());
        debug!(
            session_id = %self.session.id(),
            chars = self.partial.chars().count(),
            "Recorded assistant turn"
        );
    }
}

impl Drop for TurnStream<'_> {
    fn drop(&mut self) {
        self.commit();
    }
}
