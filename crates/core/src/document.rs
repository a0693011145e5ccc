//! Uploaded documents.

use serde::{Deserialize, Serialize};

/// Plain text extracted from one uploaded file.
///
/// Created only by a successful extraction and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// The uploaded file name, which also identifies the document within a session
    pub name: String,

    /// Extracted text (rendered HTML for Markdown sources)
    pub content: String,
}

impl Document {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// One item handed over by the upload boundary: a file name and its raw bytes.
#[derive(Clone)]
pub struct UploadItem {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadItem {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Lower-cased extension of the file name, without the dot.
    ///
    /// Returns an empty string when the name has no extension.
    pub fn extension(&self) -> String {
        std::path::Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_lowercase()
    }
}

impl std::fmt::Debug for UploadItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadItem")
            .field("name", &self.name)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}
