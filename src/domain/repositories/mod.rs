pub mod chunk_repository;
pub mod document_repository;
pub mod embedding_batch_repository;

pub use chunk_repository::ChunkRepository;
pub use document_repository::DocumentRepository;
pub use embedding_batch_repository::EmbeddingBatchRepository;
