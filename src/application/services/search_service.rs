use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::application::services::embedding_service::EmbeddingService;
use crate::application::services::retriever::RetrievalError;
use crate::domain::repositories::DocumentRepository;
use crate::domain::repositories::document_repository::DocumentRepositoryError;
use crate::domain::value_objects::display_name;

#[derive(Debug, Error)]
pub enum SearchServiceError {
    #[error("Search failed: {0}")]
    Retrieval(#[from] RetrievalError),
    #[error("Document lookup failed: {0}")]
    Documents(#[from] DocumentRepositoryError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub document_id: Uuid,
    pub document_name: String,
    pub content_snippet: String,
    pub similarity_score: f32,
}

/// Semantic search over a notebook without answer generation.
pub struct SearchService {
    embedding_service: Arc<EmbeddingService>,
    document_repository: Arc<dyn DocumentRepository>,
    snippet_max_chars: usize,
}

impl SearchService {
    pub fn new(
        embedding_service: Arc<EmbeddingService>,
        document_repository: Arc<dyn DocumentRepository>,
        snippet_max_chars: usize,
    ) -> Self {
        Self {
            embedding_service,
            document_repository,
            snippet_max_chars,
        }
    }

    #[instrument(skip_all, fields(notebook_id = %notebook_id, limit))]
    pub async fn search_content(
        &self,
        query: &str,
        notebook_id: Uuid,
        user_id: Uuid,
        limit: i64,
        selected_document_ids: Option<&[Uuid]>,
    ) -> Result<Vec<SearchHit>, SearchServiceError> {
        let results = self
            .embedding_service
            .search_similar(query, notebook_id, user_id, limit, selected_document_ids)
            .await?;

        if results.is_empty() {
            debug!("search returned no hits");
            return Ok(Vec::new());
        }

        let labels = self.document_repository.labels_by_notebook(notebook_id).await?;

        Ok(results
            .into_iter()
            .map(|result| SearchHit {
                document_name: display_name(labels.get(&result.document_id)).to_string(),
                content_snippet: snippet(&result.content, self.snippet_max_chars),
                document_id: result.document_id,
                similarity_score: result.similarity,
            })
            .collect())
    }
}

/// The first `max_chars` characters of `content`, with `...` appended when
/// anything was cut.
pub fn snippet(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}
