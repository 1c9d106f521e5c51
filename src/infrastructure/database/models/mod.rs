pub mod batch_model;
pub mod chunk_model;
pub mod document_model;

pub use batch_model::*;
pub use chunk_model::*;
pub use document_model::*;
