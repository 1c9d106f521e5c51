use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::entities::Document;
use crate::domain::repositories::{DocumentRepository, document_repository::DocumentRepositoryError};
use crate::domain::value_objects::DocumentLabel;
use crate::infrastructure::database::models::{DocumentModel, NewDocumentModel};
use crate::infrastructure::database::schema::{documents, notebooks};
use crate::infrastructure::database::{DatabaseError, DbPool, run_blocking};

pub struct PostgresDocumentRepository {
    pool: DbPool,
}

impl PostgresDocumentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_repository_error(error: DatabaseError) -> DocumentRepositoryError {
    DocumentRepositoryError::DatabaseError(error.to_string())
}

#[async_trait]
impl DocumentRepository for PostgresDocumentRepository {
    async fn save(&self, document: &Document) -> Result<(), DocumentRepositoryError> {
        let new_document = NewDocumentModel::from(document);

        run_blocking(&self.pool, move |conn| {
            diesel::insert_into(documents::table)
                .values(&new_document)
                .execute(conn)
        })
        .await
        .map_err(to_repository_error)?;

        Ok(())
    }

    async fn find_by_id(&self, document_id: Uuid) -> Result<Option<Document>, DocumentRepositoryError> {
        let result = run_blocking(&self.pool, move |conn| {
            documents::table
                .find(document_id)
                .select(DocumentModel::as_select())
                .first::<DocumentModel>(conn)
                .optional()
        })
        .await
        .map_err(to_repository_error)?;

        Ok(result.map(Document::from))
    }

    async fn list_by_notebook(
        &self,
        notebook_id: Uuid,
        user_id: Uuid,
        id_filter: Option<&[Uuid]>,
    ) -> Result<Vec<Document>, DocumentRepositoryError> {
        let id_filter = id_filter.map(<[Uuid]>::to_vec);

        let models = run_blocking(&self.pool, move |conn| {
            let mut query = documents::table
                .inner_join(notebooks::table)
                .filter(documents::notebook_id.eq(notebook_id))
                .filter(notebooks::user_id.eq(user_id))
                .order(documents::created_at.asc())
                .select(DocumentModel::as_select())
                .into_boxed();

            if let Some(ids) = id_filter {
                query = query.filter(documents::id.eq_any(ids));
            }

            query.load::<DocumentModel>(conn)
        })
        .await
        .map_err(to_repository_error)?;

        Ok(models.into_iter().map(Document::from).collect())
    }

    async fn labels_by_notebook(
        &self,
        notebook_id: Uuid,
    ) -> Result<HashMap<Uuid, DocumentLabel>, DocumentRepositoryError> {
        let rows = run_blocking(&self.pool, move |conn| {
            documents::table
                .filter(documents::notebook_id.eq(notebook_id))
                .select((documents::id, documents::filename, documents::file_type))
                .load::<(Uuid, String, String)>(conn)
        })
        .await
        .map_err(to_repository_error)?;

        Ok(rows
            .into_iter()
            .map(|(id, filename, file_type)| (id, DocumentLabel::new(filename, file_type)))
            .collect())
    }

    async fn set_embedding_batch(
        &self,
        document_id: Uuid,
        batch_id: Option<Uuid>,
    ) -> Result<(), DocumentRepositoryError> {
        let updated = run_blocking(&self.pool, move |conn| {
            diesel::update(documents::table.find(document_id))
                .set(documents::embedding_batch_id.eq(batch_id))
                .execute(conn)
        })
        .await
        .map_err(to_repository_error)?;

        if updated == 0 {
            return Err(DocumentRepositoryError::NotFound(document_id));
        }
        Ok(())
    }

    async fn delete(&self, document_id: Uuid) -> Result<bool, DocumentRepositoryError> {
        let deleted_count = run_blocking(&self.pool, move |conn| {
            diesel::delete(documents::table.find(document_id)).execute(conn)
        })
        .await
        .map_err(to_repository_error)?;

        Ok(deleted_count > 0)
    }
}
