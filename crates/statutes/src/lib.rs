//! Statute registry access for LawDesk.
//!
//! [`StatuteClient`] wraps the two read endpoints of the e-Gov statute API
//! (version 1). The XML handling lives in [`xml`] as pure functions so it can
//! be exercised without a network.

pub mod client;
pub mod xml;

pub use client::StatuteClient;
pub use xml::{TextNode, collect_text_nodes, extract_statute_text, join_text_nodes, parse_law_list};
