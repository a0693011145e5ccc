//! The chat pipeline of LawDesk.
//!
//! A turn follows a fixed path:
//!
//! 1. **Receive** a user question for a [`Session`]
//! 2. **Build context** from the selected documents and statutes
//! 3. **Send to LLM** as one assembled prompt, streaming the answer
//! 4. **Record** both turns in the session history
//!
//! [`Workbench`] is the façade presentation layers talk to; it also covers
//! uploads and statute lookups.
//!
//! [`Session`]: lawdesk_core::Session

pub mod orchestrator;
pub mod prompt;
pub mod workbench;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use orchestrator::{ChatOrchestrator, TurnStream};
pub use prompt::{CLOSING_INSTRUCTIONS, assemble, document_context};
pub use workbench::{UploadReport, Workbench};
