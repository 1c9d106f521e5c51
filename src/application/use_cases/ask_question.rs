use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::application::services::RagService;
use crate::application::services::rag_service::RagError;
use crate::domain::entities::GenerationMetadata;

#[derive(Debug, Error)]
pub enum AskQuestionError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error(transparent)]
    Rag(#[from] RagError),
}

#[derive(Debug, Clone)]
pub struct AskQuestionRequest {
    pub question: String,
    pub notebook_id: Uuid,
    pub user_id: Uuid,
    pub document_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone)]
pub struct AskQuestionResponse {
    pub answer: String,
    pub metadata: GenerationMetadata,
    pub response_time_ms: u64,
}

pub struct AskQuestionUseCase {
    rag_service: Arc<RagService>,
}

impl AskQuestionUseCase {
    pub fn new(rag_service: Arc<RagService>) -> Self {
        Self { rag_service }
    }

    pub async fn execute(
        &self,
        request: AskQuestionRequest,
    ) -> Result<AskQuestionResponse, AskQuestionError> {
        let start_time = std::time::Instant::now();

        let question = request.question.trim();
        if question.is_empty() {
            return Err(AskQuestionError::ValidationError(
                "Question cannot be empty".to_string(),
            ));
        }

        let response = self
            .rag_service
            .generate_response(
                question,
                request.notebook_id,
                request.user_id,
                request.document_ids.as_deref(),
            )
            .await?;

        Ok(AskQuestionResponse {
            answer: response.answer,
            metadata: response.metadata,
            response_time_ms: start_time.elapsed().as_millis() as u64,
        })
    }
}
