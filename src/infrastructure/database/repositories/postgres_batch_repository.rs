use async_trait::async_trait;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::entities::EmbeddingBatch;
use crate::domain::repositories::{
    EmbeddingBatchRepository, embedding_batch_repository::EmbeddingBatchRepositoryError,
};
use crate::infrastructure::database::models::{
    EmbeddingBatchModel, NewEmbeddingBatchModel, UpdateEmbeddingBatchModel,
};
use crate::infrastructure::database::schema::embedding_batches;
use crate::infrastructure::database::{DatabaseError, DbPool, run_blocking};

pub struct PostgresEmbeddingBatchRepository {
    pool: DbPool,
}

impl PostgresEmbeddingBatchRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_repository_error(error: DatabaseError) -> EmbeddingBatchRepositoryError {
    EmbeddingBatchRepositoryError::DatabaseError(error.to_string())
}

#[async_trait]
impl EmbeddingBatchRepository for PostgresEmbeddingBatchRepository {
    async fn save(&self, batch: &EmbeddingBatch) -> Result<(), EmbeddingBatchRepositoryError> {
        let new_batch = NewEmbeddingBatchModel::from(batch);

        run_blocking(&self.pool, move |conn| {
            diesel::insert_into(embedding_batches::table)
                .values(&new_batch)
                .execute(conn)
        })
        .await
        .map_err(to_repository_error)?;

        Ok(())
    }

    async fn find_by_id(
        &self,
        batch_id: Uuid,
    ) -> Result<Option<EmbeddingBatch>, EmbeddingBatchRepositoryError> {
        let result = run_blocking(&self.pool, move |conn| {
            embedding_batches::table
                .find(batch_id)
                .select(EmbeddingBatchModel::as_select())
                .first::<EmbeddingBatchModel>(conn)
                .optional()
        })
        .await
        .map_err(to_repository_error)?;

        result
            .map(EmbeddingBatch::try_from)
            .transpose()
            .map_err(EmbeddingBatchRepositoryError::ValidationError)
    }

    async fn update(&self, batch: &EmbeddingBatch) -> Result<(), EmbeddingBatchRepositoryError> {
        let batch_id = batch.id();
        let changes = UpdateEmbeddingBatchModel::from(batch);

        let updated = run_blocking(&self.pool, move |conn| {
            diesel::update(embedding_batches::table.find(batch_id))
                .set(&changes)
                .execute(conn)
        })
        .await
        .map_err(to_repository_error)?;

        if updated == 0 {
            return Err(EmbeddingBatchRepositoryError::NotFound(batch_id));
        }
        Ok(())
    }

    async fn delete(&self, batch_id: Uuid) -> Result<bool, EmbeddingBatchRepositoryError> {
        let deleted_count = run_blocking(&self.pool, move |conn| {
            diesel::delete(embedding_batches::table.find(batch_id)).execute(conn)
        })
        .await
        .map_err(to_repository_error)?;

        Ok(deleted_count > 0)
    }
}
