//! Markdown sources are stored as rendered HTML.

use lawdesk_core::DocumentError;
use pulldown_cmark::{Parser, html};

/// Decode `bytes` as UTF-8 and render CommonMark to HTML.
pub fn markdown_to_html(name: &str, bytes: &[u8]) -> Result<String, DocumentError> {
    let source = std::str::from_utf8(bytes).map_err(|e| DocumentError::Decode {
        name: name.to_string(),
        reason: e.to_string(),
    })?;

    let parser = Parser::new(source);
    let mut rendered = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut rendered, parser);
    Ok(rendered)
}
