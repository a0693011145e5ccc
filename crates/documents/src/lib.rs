//! Upload text extraction for LawDesk.
//!
//! Turns uploaded PDF and Markdown files into [`Document`]s usable as prompt
//! context. Extraction is a pure transform; nothing here touches the session.
//!
//! [`Document`]: lawdesk_core::Document

pub mod extractor;
pub mod markdown;
pub mod pdf;

pub use extractor::{BatchOutcome, Format, extract, extract_batch};
