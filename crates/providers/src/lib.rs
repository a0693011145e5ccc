//! LLM Provider implementations for LawDesk.
//!
//! All providers implement the `lawdesk_core::Provider` trait. LawDesk talks
//! to exactly one hosted model family, so there is no router here.

pub mod gemini;

pub use gemini::GeminiProvider;
