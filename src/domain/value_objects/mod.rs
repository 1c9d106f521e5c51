pub mod batch_status;
pub mod document_label;

pub use batch_status::BatchStatus;
pub use document_label::{DocumentLabel, UNKNOWN_DOCUMENT, display_name};
