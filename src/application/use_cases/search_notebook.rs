use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::application::services::SearchService;
use crate::application::services::search_service::{SearchHit, SearchServiceError};

const MAX_LIMIT: i64 = 100;

#[derive(Debug, Error)]
pub enum SearchNotebookError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error(transparent)]
    Search(#[from] SearchServiceError),
}

#[derive(Debug, Clone)]
pub struct SearchNotebookRequest {
    pub query: String,
    pub notebook_id: Uuid,
    pub user_id: Uuid,
    pub limit: Option<i64>,
    pub document_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone)]
pub struct SearchNotebookResponse {
    pub query: String,
    pub results: Vec<SearchHit>,
    pub total_results: usize,
    pub search_time_ms: u64,
}

pub struct SearchNotebookUseCase {
    search_service: Arc<SearchService>,
    default_limit: i64,
}

impl SearchNotebookUseCase {
    pub fn new(search_service: Arc<SearchService>, default_limit: i64) -> Self {
        Self {
            search_service,
            default_limit,
        }
    }

    pub async fn execute(
        &self,
        request: SearchNotebookRequest,
    ) -> Result<SearchNotebookResponse, SearchNotebookError> {
        let start_time = std::time::Instant::now();

        if request.query.trim().is_empty() {
            return Err(SearchNotebookError::ValidationError(
                "Query cannot be empty".to_string(),
            ));
        }

        let limit = request.limit.unwrap_or(self.default_limit);
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(SearchNotebookError::ValidationError(format!(
                "Limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }

        let results = self
            .search_service
            .search_content(
                &request.query,
                request.notebook_id,
                request.user_id,
                limit,
                request.document_ids.as_deref(),
            )
            .await?;

        Ok(SearchNotebookResponse {
            query: request.query,
            total_results: results.len(),
            results,
            search_time_ms: start_time.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::{EmbeddingService, WordWindowChunker};
    use crate::domain::repositories::chunk_repository::SimilarityMatch;
    use crate::test_support::{
        FakeEmbeddingProvider, InMemoryBatchRepository, InMemoryChunkRepository,
        InMemoryDocumentRepository,
    };

    fn use_case(chunks: Arc<InMemoryChunkRepository>) -> SearchNotebookUseCase {
        let embedding_service = Arc::new(EmbeddingService::new(
            Arc::new(FakeEmbeddingProvider::default()),
            chunks,
            Arc::new(InMemoryBatchRepository::default()),
            WordWindowChunker::new(512, 50).unwrap(),
            0.5,
        ));
        let search = Arc::new(SearchService::new(
            embedding_service,
            Arc::new(InMemoryDocumentRepository::default()),
            500,
        ));
        SearchNotebookUseCase::new(search, 10)
    }

    fn request(query: &str, limit: Option<i64>) -> SearchNotebookRequest {
        SearchNotebookRequest {
            query: query.to_string(),
            notebook_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            limit,
            document_ids: None,
        }
    }

    #[tokio::test]
    async fn test_rejects_blank_query() {
        let result = use_case(Arc::new(InMemoryChunkRepository::default()))
            .execute(request("   ", None))
            .await;

        assert!(matches!(result, Err(SearchNotebookError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_rejects_out_of_range_limits() {
        let use_case = use_case(Arc::new(InMemoryChunkRepository::default()));

        for limit in [0, -3, 101] {
            let result = use_case.execute(request("query", Some(limit))).await;
            assert!(
                matches!(result, Err(SearchNotebookError::ValidationError(_))),
                "limit {}",
                limit
            );
        }
    }

    #[tokio::test]
    async fn test_default_limit_reaches_store() {
        let chunks = Arc::new(InMemoryChunkRepository::default());
        chunks.script_matches(vec![SimilarityMatch {
            chunk_id: Uuid::new_v4(),
            document_id: Uuid::new_v4(),
            chunk_index: 0,
            content: "hit".to_string(),
            similarity: 0.8,
        }]);

        let response = use_case(chunks.clone())
            .execute(request("query", None))
            .await
            .unwrap();

        assert_eq!(response.total_results, 1);
        assert_eq!(response.query, "query");
        assert_eq!(chunks.last_query().unwrap().limit, 10);
    }
}
