use serde::{Deserialize, Serialize};

pub const UNKNOWN_DOCUMENT: &str = "Unknown Document";

/// Display metadata for a document: what a reader sees when a chunk is cited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentLabel {
    filename: String,
    file_type: String,
}

impl DocumentLabel {
    pub fn new(filename: impl Into<String>, file_type: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            file_type: file_type.into(),
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn file_type(&self) -> &str {
        &self.file_type
    }
}

/// Resolves the filename for `label`, falling back to the placeholder.
pub fn display_name(label: Option<&DocumentLabel>) -> &str {
    label.map(DocumentLabel::filename).unwrap_or(UNKNOWN_DOCUMENT)
}
