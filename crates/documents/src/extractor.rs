//! Dispatch uploads to the matching extractor by file extension.

use lawdesk_core::{Document, DocumentError, UploadItem};
use tracing::{info, warn};

use crate::markdown::markdown_to_html;
use crate::pdf::pdf_to_text;

/// The upload formats LawDesk understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Pdf,
    Markdown,
}

impl Format {
    /// Match a lower-cased extension. Only `pdf` and `md` are accepted.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "pdf" => Some(Self::Pdf),
            "md" => Some(Self::Markdown),
            _ => None,
        }
    }
}

/// Turn one upload into a document.
pub fn extract(item: &UploadItem) -> Result<Document, DocumentError> {
    let extension = item.extension();
    let format = Format::from_extension(&extension).ok_or_else(|| {
        DocumentError::UnsupportedFormat {
            name: item.name.clone(),
            extension: extension.clone(),
        }
    })?;

    let content = match format {
        Format::Pdf => pdf_to_text(&item.name, &item.bytes)?,
        Format::Markdown => markdown_to_html(&item.name, &item.bytes)?,
    };

    Ok(Document::new(item.name.clone(), content))
}

/// Result of a batch upload: what was extracted and what was skipped.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub documents: Vec<Document>,
    pub warnings: Vec<DocumentError>,
}

/// Extract each item independently. A failure never stops the batch.
pub fn extract_batch(items: impl IntoIterator<Item = UploadItem>) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for item in items {
        match extract(&item) {
            Ok(document) => {
                info!(name = %document.name, chars = document.content.chars().count(), "Extracted document");
                outcome.documents.push(document);
            }
            Err(e) => {
                warn!(name = %item.name, error = %e, "Skipping upload");
                outcome.warnings.push(e);
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::tests::sample_pdf;

    #[test]
    fn unsupported_extensions_are_rejected() {
        for name in ["notes.txt", "契約書.docx", "README"] {
            let err = extract(&UploadItem::new(name, b"text".to_vec())).unwrap_err();
            assert!(
                matches!(err, DocumentError::UnsupportedFormat { .. }),
                "{name} should be unsupported"
            );
            assert_eq!(err.file_name(), name);
        }
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let doc = extract(&UploadItem::new("NOTES.MD", b"*hi*".to_vec())).unwrap();
        assert_eq!(doc.name, "NOTES.MD");
        assert!(doc.content.contains("<em>hi</em>"));
    }

    #[test]
    fn batch_continues_past_failures() {
        let outcome = extract_batch(vec![
            UploadItem::new("判例.pdf", sample_pdf(&["Judgment"])),
            UploadItem::new("memo.docx", b"PK\x03\x04".to_vec()),
        ]);

        assert_eq!(outcome.documents.len(), 1);
        assert_eq!(outcome.documents[0].name, "判例.pdf");
        assert!(outcome.documents[0].content.contains("Judgment"));
        assert_eq!(outcome.warnings.len(), 1);
        assert!(matches!(
            &outcome.warnings[0],
            DocumentError::UnsupportedFormat { extension, .. } if extension == "docx"
        ));
    }

    #[test]
    fn batch_keeps_input_order() {
        let outcome = extract_batch(vec![
            UploadItem::new("b.md", b"# B".to_vec()),
            UploadItem::new("bad.md", vec![0xff]),
            UploadItem::new("a.md", b"# A".to_vec()),
        ]);

        let names: Vec<&str> = outcome.documents.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["b.md", "a.md"]);
        assert!(matches!(outcome.warnings[0], DocumentError::Decode { .. }));
    }
}
