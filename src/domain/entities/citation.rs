use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationKind {
    Document,
}

/// A source reference found in generated answer text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    #[serde(rename = "type")]
    pub kind: CitationKind,
    pub reference: String,
}

impl Citation {
    pub fn document(reference: impl Into<String>) -> Self {
        Self {
            kind: CitationKind::Document,
            reference: reference.into(),
        }
    }
}
