pub mod answer_generator;
pub mod chunker;
pub mod context_assembler;
pub mod embedding_service;
pub mod rag_service;
pub mod retriever;
pub mod search_service;

pub use answer_generator::AnswerGenerator;
pub use chunker::WordWindowChunker;
pub use context_assembler::ContextAssembler;
pub use embedding_service::EmbeddingService;
pub use rag_service::RagService;
pub use retriever::Retriever;
pub use search_service::SearchService;
