pub mod embedding_provider;
pub mod generation_provider;

pub use embedding_provider::EmbeddingProvider;
pub use generation_provider::GenerationProvider;
