//! PDF text extraction.
//!
//! The file is opened with `lopdf` first to reject malformed and encrypted
//! documents, then `pdf-extract` pulls the text page by page.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use lawdesk_core::DocumentError;
use tracing::{debug, warn};

/// Extract the text of every page, in page order, with no separator.
///
/// Page boundaries are deliberately left unmarked.
pub fn pdf_to_text(name: &str, bytes: &[u8]) -> Result<String, DocumentError> {
    let extraction = |reason: String| DocumentError::Extraction {
        name: name.to_string(),
        reason,
    };

    let document = lopdf::Document::load_mem(bytes).map_err(|e| extraction(e.to_string()))?;
    if document.is_encrypted() {
        return Err(extraction("PDF is password protected".into()));
    }

    // pdf-extract panics on some font and encoding shapes
    let pages = guard_panics(name, || pdf_extract::extract_text_from_mem_by_pages(bytes))?
        .map_err(|e| extraction(e.to_string()))?;

    debug!(name, pages = pages.len(), "Extracted PDF text");
    Ok(pages.concat())
}

/// Run `extract`, turning a panic inside it into an extraction error.
fn guard_panics<T>(name: &str, extract: impl FnOnce() -> T) -> Result<T, DocumentError> {
    catch_unwind(AssertUnwindSafe(extract)).map_err(|payload| {
        let reason = panic_message(payload.as_ref());
        warn!(name, reason = %reason, "PDF extractor panicked");
        DocumentError::Extraction {
            name: name.to_string(),
            reason: format!("unsupported PDF content: {reason}"),
        }
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
