pub mod ask_question;
pub mod delete_document;
pub mod ingest_document;
pub mod search_notebook;

pub use ask_question::AskQuestionUseCase;
pub use delete_document::DeleteDocumentUseCase;
pub use ingest_document::IngestDocumentUseCase;
pub use search_notebook::SearchNotebookUseCase;
