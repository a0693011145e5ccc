//! Session store — everything scoped to one interactive session.
//!
//! The presentation layer owns a [`Session`] for the lifetime of one user's
//! session and passes it by `&mut` into every component call. There is no
//! global state.
//!
//! Invariants kept here:
//! - documents are unique by name; re-uploading a name replaces it in place
//! - the statute list is replaced wholesale, never merged
//! - selected statutes are unique by name (multi mode) or at most one (single mode)
//! - chat history is append-only and alternates user/assistant

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::document::Document;
use crate::message::{ChatTurn, Role};
use crate::statute::{StatuteContent, StatuteSummary};

/// Unique identifier for a session, used to correlate log lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How many statutes may be attached to the prompt at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatuteMode {
    /// One active statute; a new fetch replaces the previous one.
    Single,
    /// Any number of statutes keyed by name.
    #[default]
    Multi,
}

impl std::str::FromStr for StatuteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "multi" => Ok(Self::Multi),
            other => Err(format!("unknown statute mode '{other}', expected single or multi")),
        }
    }
}

/// Per-session state: documents, statutes and chat history.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    mode: StatuteMode,
    documents: Vec<Document>,
    selected_documents: HashSet<String>,
    statute_list: Vec<StatuteSummary>,
    statutes: Vec<StatuteContent>,
    chat_history: Vec<ChatTurn>,
}

impl Session {
    /// Create an empty session.
    pub fn new(mode: StatuteMode) -> Self {
        Self {
            id: SessionId::new(),
            mode,
            documents: Vec::new(),
            selected_documents: HashSet::new(),
            statute_list: Vec::new(),
            statutes: Vec::new(),
            chat_history: Vec::new(),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn mode(&self) -> StatuteMode {
        self.mode
    }

    /// Drop all state and start over under a fresh id.
    pub fn reset(&mut self) {
        debug!(session_id = %self.id, "Resetting session");
        *self = Self::new(self.mode);
    }

    // ── Documents ──

    /// Add a document and select it.
    ///
    /// Returns `true` when a document with the same name was replaced.
    pub fn add_document(&mut self, document: Document) -> bool {
        self.selected_documents.insert(document.name.clone());
        match self.documents.iter_mut().find(|d| d.name == document.name) {
            Some(existing) => {
                *existing = document;
                true
            }
            None => {
                self.documents.push(document);
                false
            }
        }
    }

    /// All uploaded documents, in upload order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn document(&self, name: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.name == name)
    }

    /// Mark a document as prompt context. Returns `false` for unknown names.
    pub fn select_document(&mut self, name: &str) -> bool {
        if self.document(name).is_none() {
            return false;
        }
        self.selected_documents.insert(name.to_string());
        true
    }

    /// Stop using a document as prompt context. The document itself is kept.
    pub fn deselect_document(&mut self, name: &str) -> bool {
        self.selected_documents.remove(name)
    }

    pub fn is_document_selected(&self, name: &str) -> bool {
        self.selected_documents.contains(name)
    }

    /// Selected documents, in upload order.
    pub fn selected_documents(&self) -> impl Iterator<Item = &Document> {
        self.documents
            .iter()
            .filter(|d| self.selected_documents.contains(&d.name))
    }

    // ── Statutes ──

    /// Replace the statute list with the result of a new query.
    pub fn replace_statute_list(&mut self, list: Vec<StatuteSummary>) {
        self.statute_list = list;
    }

    pub fn statute_list(&self) -> &[StatuteSummary] {
        &self.statute_list
    }

    pub fn find_summary(&self, id: &str) -> Option<&StatuteSummary> {
        self.statute_list.iter().find(|s| s.id == id)
    }

    /// Attach fetched statute content to the session.
    ///
    /// In single mode the previous statute is replaced; in multi mode a
    /// statute with the same name is overwritten in place.
    pub fn select_statute(&mut self, content: StatuteContent) {
        match self.mode {
            StatuteMode::Single => {
                self.statutes.clear();
                self.statutes.push(content);
            }
            StatuteMode::Multi => {
                match self.statutes.iter_mut().find(|s| s.name == content.name) {
                    Some(existing) => *existing = content,
                    None => self.statutes.push(content),
                }
            }
        }
    }

    /// Detach a statute by name. Returns `false` if it was not selected.
    pub fn deselect_statute(&mut self, name: &str) -> bool {
        let before = self.statutes.len();
        self.statutes.retain(|s| s.name != name);
        self.statutes.len() != before
    }

    /// Selected statute contents, in selection order.
    pub fn selected_statutes(&self) -> &[StatuteContent] {
        &self.statutes
    }

    pub fn statute(&self, name: &str) -> Option<&StatuteContent> {
        self.statutes.iter().find(|s| s.name == name)
    }

    // ── Chat history ──

    pub fn chat_history(&self) -> &[ChatTurn] {
        &self.chat_history
    }

    /// Append a user turn. Must follow an assistant turn or start the history.
    pub fn record_user_turn(&mut self, content: impl Into<String>) {
        debug_assert!(self.chat_history.last().is_none_or(|t| t.role == Role::Assistant));
        self.chat_history.push(ChatTurn::user(content));
    }

    /// Append an assistant turn. Must follow a user turn.
    pub fn record_assistant_turn(&mut self, content: impl Into<String>) {
        debug_assert!(self.chat_history.last().is_some_and(|t| t.role == Role::User));
        self.chat_history.push(ChatTurn::assistant(content));
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(StatuteMode::default())
    }
}
