use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::{
    application::{
        ports::{EmbeddingProvider, GenerationProvider},
        services::{
            AnswerGenerator, ContextAssembler, EmbeddingService, RagService, Retriever,
            SearchService, WordWindowChunker, answer_generator::GenerationSettings,
            chunker::ChunkerError, retriever::FallbackPolicy,
        },
        use_cases::{
            AskQuestionUseCase, DeleteDocumentUseCase, IngestDocumentUseCase,
            SearchNotebookUseCase,
        },
    },
    config::{ConfigError, RagSettings},
    domain::repositories::{ChunkRepository, DocumentRepository, EmbeddingBatchRepository},
    infrastructure::{
        database::{
            DatabaseError, VECTOR_DIMENSION, create_connection_pool_from_env,
            repositories::{
                PostgresChunkRepository, PostgresDocumentRepository,
                PostgresEmbeddingBatchRepository,
            },
            run_migrations,
        },
        external_services::{GeminiClient, gemini_client::GeminiClientError},
    },
};

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Chunker configuration error: {0}")]
    Chunker(#[from] ChunkerError),
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("Gemini client error: {0}")]
    Gemini(#[from] GeminiClientError),
    #[error("Embedding model produces {provider}-dimensional vectors but the chunk store holds {column}")]
    DimensionMismatch { provider: usize, column: usize },
}

/// The vector column has a fixed width; a provider configured for another
/// dimension would fail on every chunk insert.
pub fn check_vector_dimension(provider: &dyn EmbeddingProvider) -> Result<(), ContainerError> {
    match provider.embedding_dimension() {
        VECTOR_DIMENSION => Ok(()),
        dimension => Err(ContainerError::DimensionMismatch {
            provider: dimension,
            column: VECTOR_DIMENSION,
        }),
    }
}

pub struct Repositories {
    pub documents: Arc<dyn DocumentRepository>,
    pub chunks: Arc<dyn ChunkRepository>,
    pub batches: Arc<dyn EmbeddingBatchRepository>,
}

pub struct Providers {
    pub embedding: Arc<dyn EmbeddingProvider>,
    pub generation: Arc<dyn GenerationProvider>,
}

pub struct AppContainer {
    pub settings: RagSettings,

    // Repositories
    pub document_repository: Arc<dyn DocumentRepository>,
    pub chunk_repository: Arc<dyn ChunkRepository>,
    pub batch_repository: Arc<dyn EmbeddingBatchRepository>,

    // External Services
    pub embedding_provider: Arc<dyn EmbeddingProvider>,
    pub generation_provider: Arc<dyn GenerationProvider>,

    // Application Services
    pub embedding_service: Arc<EmbeddingService>,
    pub retriever: Arc<Retriever>,
    pub answer_generator: Arc<AnswerGenerator>,
    pub rag_service: Arc<RagService>,
    pub search_service: Arc<SearchService>,

    // Use Cases
    pub ingest_document_use_case: Arc<IngestDocumentUseCase>,
    pub delete_document_use_case: Arc<DeleteDocumentUseCase>,
    pub ask_question_use_case: Arc<AskQuestionUseCase>,
    pub search_notebook_use_case: Arc<SearchNotebookUseCase>,
}

impl AppContainer {
    /// Wires Postgres and Gemini from the environment and applies pending
    /// migrations.
    pub fn from_env() -> Result<Self, ContainerError> {
        let settings = RagSettings::from_env()?;

        let db_pool = create_connection_pool_from_env()?;
        run_migrations(&db_pool)?;

        let repositories = Repositories {
            documents: Arc::new(PostgresDocumentRepository::new(db_pool.clone())),
            chunks: Arc::new(PostgresChunkRepository::new(db_pool.clone())),
            batches: Arc::new(PostgresEmbeddingBatchRepository::new(db_pool)),
        };

        let gemini = Arc::new(GeminiClient::from_env()?);
        check_vector_dimension(gemini.as_ref())?;
        let providers = Providers {
            embedding: gemini.clone(),
            generation: gemini,
        };

        Self::build(settings, repositories, providers)
    }

    pub fn build(
        settings: RagSettings,
        repositories: Repositories,
        providers: Providers,
    ) -> Result<Self, ContainerError> {
        settings.validate()?;
        let chunker = WordWindowChunker::new(settings.chunk_size, settings.chunk_overlap)?;

        // Create application services
        let embedding_service = Arc::new(EmbeddingService::new(
            providers.embedding.clone(),
            repositories.chunks.clone(),
            repositories.batches.clone(),
            chunker,
            settings.similarity_threshold,
        ));

        let retriever = Arc::new(Retriever::new(
            embedding_service.clone(),
            repositories.documents.clone(),
            settings.retrieval_limit,
            FallbackPolicy::from_settings(&settings),
        ));

        let answer_generator = Arc::new(AnswerGenerator::new(
            providers.generation.clone(),
            GenerationSettings::from_settings(&settings),
        ));

        let rag_service = Arc::new(RagService::new(
            retriever.clone(),
            repositories.documents.clone(),
            ContextAssembler::default(),
            answer_generator.clone(),
        ));

        let search_service = Arc::new(SearchService::new(
            embedding_service.clone(),
            repositories.documents.clone(),
            settings.snippet_max_chars,
        ));

        // Create use cases
        let ingest_document_use_case = Arc::new(IngestDocumentUseCase::new(
            repositories.documents.clone(),
            embedding_service.clone(),
        ));
        let delete_document_use_case = Arc::new(DeleteDocumentUseCase::new(
            repositories.documents.clone(),
            embedding_service.clone(),
        ));
        let ask_question_use_case = Arc::new(AskQuestionUseCase::new(rag_service.clone()));
        let search_notebook_use_case = Arc::new(SearchNotebookUseCase::new(
            search_service.clone(),
            settings.search_limit,
        ));

        info!(
            embedding_model = embedding_service.model_name(),
            candidate_models = ?answer_generator.candidate_models(),
            chunk_size = settings.chunk_size,
            chunk_overlap = settings.chunk_overlap,
            "application container ready"
        );

        Ok(Self {
            settings,
            document_repository: repositories.documents,
            chunk_repository: repositories.chunks,
            batch_repository: repositories.batches,
            embedding_provider: providers.embedding,
            generation_provider: providers.generation,
            embedding_service,
            retriever,
            answer_generator,
            rag_service,
            search_service,
            ingest_document_use_case,
            delete_document_use_case,
            ask_question_use_case,
            search_notebook_use_case,
        })
    }
}
