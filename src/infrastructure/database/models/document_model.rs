use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::entities::Document as DomainDocument;
use crate::infrastructure::database::schema::documents;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DocumentModel {
    pub id: Uuid,
    pub notebook_id: Uuid,
    pub filename: String,
    pub file_type: String,
    pub content: String,
    pub embedding_batch_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewDocumentModel {
    pub id: Uuid,
    pub notebook_id: Uuid,
    pub filename: String,
    pub file_type: String,
    pub content: String,
    pub embedding_batch_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<&DomainDocument> for NewDocumentModel {
    fn from(document: &DomainDocument) -> Self {
        Self {
            id: document.id(),
            notebook_id: document.notebook_id(),
            filename: document.filename().to_string(),
            file_type: document.file_type().to_string(),
            content: document.content().to_string(),
            embedding_batch_id: document.embedding_batch_id(),
            created_at: document.created_at(),
        }
    }
}

impl From<DocumentModel> for DomainDocument {
    fn from(model: DocumentModel) -> Self {
        DomainDocument::restore(
            model.id,
            model.notebook_id,
            model.filename,
            model.file_type,
            model.content,
            model.embedding_batch_id,
            model.created_at,
        )
    }
}
