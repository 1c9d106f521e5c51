pub mod citation;
pub mod document;
pub mod document_chunk;
pub mod embedding_batch;
pub mod generation_metadata;
pub mod retrieval_result;

pub use citation::{Citation, CitationKind};
pub use document::Document;
pub use document_chunk::DocumentChunk;
pub use embedding_batch::EmbeddingBatch;
pub use generation_metadata::GenerationMetadata;
pub use retrieval_result::{RetrievalResult, RetrievalSource};
