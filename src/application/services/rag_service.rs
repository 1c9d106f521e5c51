use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::application::services::answer_generator::{AnswerGenerator, GenerationError};
use crate::application::services::context_assembler::ContextAssembler;
use crate::application::services::retriever::{RetrievalError, Retriever};
use crate::domain::entities::GenerationMetadata;
use crate::domain::repositories::DocumentRepository;
use crate::domain::repositories::document_repository::DocumentRepositoryError;

#[derive(Debug, Error)]
pub enum RagError {
    #[error("Retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),
    #[error("Document metadata lookup failed: {0}")]
    Documents(#[from] DocumentRepositoryError),
    #[error("Answer generation failed: {0}")]
    Generation(#[from] GenerationError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagResponse {
    pub answer: String,
    pub metadata: GenerationMetadata,
}

pub struct RagService {
    retriever: Arc<Retriever>,
    document_repository: Arc<dyn DocumentRepository>,
    context_assembler: ContextAssembler,
    answer_generator: Arc<AnswerGenerator>,
}

impl RagService {
    pub fn new(
        retriever: Arc<Retriever>,
        document_repository: Arc<dyn DocumentRepository>,
        context_assembler: ContextAssembler,
        answer_generator: Arc<AnswerGenerator>,
    ) -> Self {
        Self {
            retriever,
            document_repository,
            context_assembler,
            answer_generator,
        }
    }

    /// One full question/answer cycle. Either every stage succeeds or the
    /// first failure is returned; there are no partial answers.
    #[instrument(skip_all, fields(notebook_id = %notebook_id))]
    pub async fn generate_response(
        &self,
        question: &str,
        notebook_id: Uuid,
        user_id: Uuid,
        selected_document_ids: Option<&[Uuid]>,
    ) -> Result<RagResponse, RagError> {
        let chunks = self
            .retriever
            .retrieve(question, notebook_id, user_id, selected_document_ids)
            .await?;

        let labels = self.document_repository.labels_by_notebook(notebook_id).await?;
        let context = self.context_assembler.assemble(&chunks, &labels);

        let answer = self.answer_generator.generate(question, &context).await?;
        let metadata = GenerationMetadata::new(answer.citations, &chunks, answer.model_used);

        info!(
            retrieved_chunks = metadata.retrieved_chunks,
            citations = metadata.citations.len(),
            model = %metadata.model_used,
            "answered question"
        );

        Ok(RagResponse {
            answer: answer.text,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::application::ports::generation_provider::GenerationProviderError;
    use crate::application::services::answer_generator::GenerationSettings;
    use crate::application::services::chunker::WordWindowChunker;
    use crate::application::services::embedding_service::EmbeddingService;
    use crate::application::services::retriever::FallbackPolicy;
    use crate::domain::entities::{Citation, Document};
    use crate::domain::repositories::ChunkRepository;
    use crate::domain::repositories::chunk_repository::SimilarityMatch;
    use crate::test_support::{
        FakeEmbeddingProvider, InMemoryBatchRepository, InMemoryChunkRepository,
        InMemoryDocumentRepository, ScriptedGenerationProvider, ScriptedOutcome, words,
    };

    struct Fixture {
        documents: Arc<InMemoryDocumentRepository>,
        chunks: Arc<InMemoryChunkRepository>,
        embedding_service: Arc<EmbeddingService>,
        rag: RagService,
    }

    fn fixture(generation: ScriptedGenerationProvider, models: &[&str]) -> Fixture {
        let documents = Arc::new(InMemoryDocumentRepository::default());
        let chunks = Arc::new(InMemoryChunkRepository::default());
        let embedding_service = Arc::new(EmbeddingService::new(
            Arc::new(FakeEmbeddingProvider::default()),
            chunks.clone(),
            Arc::new(InMemoryBatchRepository::default()),
            WordWindowChunker::new(512, 50).unwrap(),
            0.5,
        ));
        let retriever = Arc::new(Retriever::new(
            embedding_service.clone(),
            documents.clone(),
            5,
            FallbackPolicy::default(),
        ));
        let generator = Arc::new(AnswerGenerator::new(
            Arc::new(generation),
            GenerationSettings {
                candidate_models: models.iter().map(|m| m.to_string()).collect(),
                max_output_tokens: 1024,
                temperature: 0.7,
                attempt_timeout: Duration::from_secs(5),
            },
        ));
        let rag = RagService::new(
            retriever,
            documents.clone(),
            ContextAssembler::default(),
            generator,
        );

        Fixture {
            documents,
            chunks,
            embedding_service,
            rag,
        }
    }

    #[tokio::test]
    async fn test_end_to_end_single_document() {
        let fx = fixture(
            ScriptedGenerationProvider::default().with(
                "model-a",
                ScriptedOutcome::Answer("It does X [Document: spec.txt].".into()),
            ),
            &["model-a"],
        );
        let notebook_id = Uuid::new_v4();
        let document = Document::new(
            notebook_id,
            "spec.txt".to_string(),
            "txt".to_string(),
            words(600),
        );
        fx.documents.insert(document.clone());

        let batch = fx
            .embedding_service
            .create_embeddings(document.id(), document.content())
            .await
            .unwrap();
        assert_eq!(batch.chunk_count(), 2);

        let stored = fx.chunks.find_by_batch_id(batch.id()).await.unwrap();
        let second = &stored[1];
        fx.chunks.script_matches(vec![SimilarityMatch {
            chunk_id: second.id(),
            document_id: document.id(),
            chunk_index: second.chunk_index(),
            content: second.content().to_string(),
            similarity: 0.82,
        }]);

        let response = fx
            .rag
            .generate_response("What does it do?", notebook_id, Uuid::new_v4(), None)
            .await
            .unwrap();

        assert_eq!(response.answer, "It does X [Document: spec.txt].");
        assert_eq!(response.metadata.retrieved_chunks, 1);
        assert_eq!(response.metadata.documents_referenced, vec![document.id()]);
        assert_eq!(
            response.metadata.citations,
            vec![Citation::document("spec.txt")]
        );
        assert_eq!(response.metadata.model_used, "model-a");

        let json = serde_json::to_value(&response.metadata).unwrap();
        assert_eq!(
            json["citations"],
            serde_json::json!([{"type": "document", "reference": "spec.txt"}])
        );
    }

    #[tokio::test]
    async fn test_uses_document_fallback_when_index_is_empty() {
        let fx = fixture(
            ScriptedGenerationProvider::default()
                .with("model-a", ScriptedOutcome::Answer("From notes [Document: notes.md]".into())),
            &["model-a"],
        );
        let notebook_id = Uuid::new_v4();
        let document = Document::new(
            notebook_id,
            "notes.md".to_string(),
            "md".to_string(),
            words(300),
        );
        fx.documents.insert(document.clone());

        let response = fx
            .rag
            .generate_response("Summarise", notebook_id, Uuid::new_v4(), None)
            .await
            .unwrap();

        assert_eq!(response.metadata.retrieved_chunks, 1);
        assert_eq!(response.metadata.documents_referenced, vec![document.id()]);
    }

    #[tokio::test]
    async fn test_generation_failure_is_terminal() {
        let fx = fixture(
            ScriptedGenerationProvider::default().with(
                "model-a",
                ScriptedOutcome::Fail(GenerationProviderError::Unavailable("503".into())),
            ),
            &["model-a"],
        );

        let error = fx
            .rag
            .generate_response("q", Uuid::new_v4(), Uuid::new_v4(), None)
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            RagError::Generation(GenerationError::AllModelsFailed { attempts: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_retrieval_failure_is_terminal() {
        let documents = Arc::new(InMemoryDocumentRepository::default());
        let embedding_service = Arc::new(EmbeddingService::new(
            Arc::new(FakeEmbeddingProvider::default()),
            Arc::new(InMemoryChunkRepository::default().failing_searches()),
            Arc::new(InMemoryBatchRepository::default()),
            WordWindowChunker::new(512, 50).unwrap(),
            0.5,
        ));
        let rag = RagService::new(
            Arc::new(Retriever::new(
                embedding_service,
                documents.clone(),
                5,
                FallbackPolicy::default(),
            )),
            documents,
            ContextAssembler::default(),
            Arc::new(AnswerGenerator::new(
                Arc::new(ScriptedGenerationProvider::default()),
                GenerationSettings {
                    candidate_models: vec!["model-a".to_string()],
                    max_output_tokens: 16,
                    temperature: 0.0,
                    attempt_timeout: Duration::from_secs(1),
                },
            )),
        );

        let error = rag
            .generate_response("q", Uuid::new_v4(), Uuid::new_v4(), None)
            .await
            .unwrap_err();

        assert!(matches!(error, RagError::Retrieval(RetrievalError::Store(_))));
    }
}
