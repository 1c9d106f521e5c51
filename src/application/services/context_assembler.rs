use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::entities::RetrievalResult;
use crate::domain::value_objects::{DocumentLabel, display_name};

pub const BLOCK_SEPARATOR: &str = "\n---\n";

/// Builds the prompt context: one `[Document: <filename>]` block per
/// retrieval result, in the order given. Nothing is dropped or re-ranked.
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    separator: String,
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self {
            separator: BLOCK_SEPARATOR.to_string(),
        }
    }
}

impl ContextAssembler {
    pub fn with_separator(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }

    pub fn assemble(
        &self,
        results: &[RetrievalResult],
        labels: &HashMap<Uuid, DocumentLabel>,
    ) -> String {
        results
            .iter()
            .map(|result| {
                let name = display_name(labels.get(&result.document_id));
                format!("[Document: {}]\n{}\n", name, result.content)
            })
            .collect::<Vec<_>>()
            .join(&self.separator)
    }
}
