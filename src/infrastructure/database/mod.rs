pub mod connection;
pub mod models;
pub mod repositories;
pub mod schema;

pub use connection::*;

/// Width of `document_chunks.embedding`, fixed by the migration.
pub const VECTOR_DIMENSION: usize = 768;
