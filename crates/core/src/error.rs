//! Error types for the LawDesk domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; [`Error`] joins them.

use thiserror::Error;

/// The top-level error type for all LawDesk operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Statute registry ---
    #[error("Statute error: {0}")]
    Statute(#[from] StatuteError),

    // --- Document extraction ---
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    // --- Chat turn ---
    #[error("Chat error: {0}")]
    Chat(#[from] ChatError),

    // --- LLM provider ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures talking to the statute registry.
///
/// None of these are retried. Callers surface them as warnings and carry on
/// with an empty or absent result.
#[derive(Debug, Clone, Error)]
pub enum StatuteError {
    /// The request failed in transport or returned a non-2xx status.
    #[error("Statute registry request failed: {0}")]
    Network(String),

    /// The response body was not the XML we expected.
    #[error("Malformed statute registry response: {0}")]
    Parse(String),

    /// The statute payload parsed but carried no text at all.
    #[error("Statute {id} has no content")]
    NotFound { id: String },
}

impl StatuteError {
    /// True when the registry answered but the statute body was empty.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Per-file failures while turning an upload into text.
#[derive(Debug, Clone, Error)]
pub enum DocumentError {
    #[error("Unsupported file format: {name} (.{extension})")]
    UnsupportedFormat { name: String, extension: String },

    #[error("Failed to extract text from {name}: {reason}")]
    Extraction { name: String, reason: String },

    #[error("Failed to decode {name} as UTF-8: {reason}")]
    Decode { name: String, reason: String },
}

impl DocumentError {
    /// Name of the file the error refers to.
    pub fn file_name(&self) -> &str {
        match self {
            Self::UnsupportedFormat { name, .. }
            | Self::Extraction { name, .. }
            | Self::Decode { name, .. } => name,
        }
    }
}

/// Failures of a single chat turn.
#[derive(Debug, Clone, Error)]
pub enum ChatError {
    #[error("No LLM credential configured")]
    MissingCredential,

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}
