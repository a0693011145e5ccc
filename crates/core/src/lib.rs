//! # LawDesk Core
//!
//! Domain types, traits, and error definitions for LawDesk, a chat pipeline
//! that grounds LLM answers in uploaded documents and statutes fetched from
//! the e-Gov statute registry.
//!
//! This crate has no I/O of its own. It defines the domain model that the
//! extractor, registry client, provider and orchestrator crates implement
//! against:
//! - [`Session`] holds everything scoped to one interactive session
//! - [`Provider`] abstracts the hosted LLM
//! - [`Error`] joins the per-context error enums

pub mod document;
pub mod error;
pub mod message;
pub mod provider;
pub mod session;
pub mod statute;

// Re-export key types at crate root for ergonomics
pub use document::{Document, UploadItem};
pub use error::{ChatError, DocumentError, Error, ProviderError, Result, StatuteError};
pub use message::{ChatTurn, Role};
pub use provider::{ChatModel, ChunkReceiver, Provider, ProviderRequest, ProviderResponse, StreamChunk, Usage};
pub use session::{Session, SessionId, StatuteMode};
pub use statute::{LawCategory, StatuteContent, StatuteSummary};
