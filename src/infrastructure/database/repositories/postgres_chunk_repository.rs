use async_trait::async_trait;
use diesel::prelude::*;
use pgvector::VectorExpressionMethods;
use tracing::debug;
use uuid::Uuid;

use crate::domain::entities::DocumentChunk;
use crate::domain::repositories::chunk_repository::{
    ChunkRepositoryError, SimilarityMatch, SimilarityQuery,
};
use crate::domain::repositories::ChunkRepository;
use crate::infrastructure::database::models::{DocumentChunkModel, NewDocumentChunkModel};
use crate::infrastructure::database::schema::{document_chunks, documents, notebooks};
use crate::infrastructure::database::{DatabaseError, DbPool, run_blocking};

/// Rows per INSERT statement; keeps each statement under the Postgres bind
/// parameter limit.
const INSERT_ROWS_PER_STATEMENT: usize = 1000;

pub struct PostgresChunkRepository {
    pool: DbPool,
}

impl PostgresChunkRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_repository_error(error: DatabaseError) -> ChunkRepositoryError {
    ChunkRepositoryError::DatabaseError(error.to_string())
}

/// pgvector reports cosine distance in `[0, 2]`.
fn similarity_from_distance(distance: f64) -> f32 {
    (1.0 - distance).clamp(0.0, 1.0) as f32
}

/// Largest cosine distance that still meets `threshold`. A zero threshold
/// admits every distance, including opposed vectors past 1.0.
fn max_distance_for(threshold: f32) -> Option<f64> {
    (threshold > 0.0).then(|| 1.0 - f64::from(threshold))
}

#[async_trait]
impl ChunkRepository for PostgresChunkRepository {
    async fn save_batch(&self, chunks: &[DocumentChunk]) -> Result<(), ChunkRepositoryError> {
        let new_chunks: Vec<NewDocumentChunkModel> =
            chunks.iter().map(NewDocumentChunkModel::from).collect();

        let inserted = run_blocking(&self.pool, move |conn| {
            conn.transaction(|conn| {
                let mut inserted = 0;
                for rows in new_chunks.chunks(INSERT_ROWS_PER_STATEMENT) {
                    inserted += diesel::insert_into(document_chunks::table)
                        .values(rows)
                        .execute(conn)?;
                }
                Ok(inserted)
            })
        })
        .await
        .map_err(to_repository_error)?;

        debug!(inserted, "stored chunk batch");
        Ok(())
    }

    async fn find_by_batch_id(
        &self,
        batch_id: Uuid,
    ) -> Result<Vec<DocumentChunk>, ChunkRepositoryError> {
        let models = run_blocking(&self.pool, move |conn| {
            document_chunks::table
                .filter(document_chunks::embedding_batch_id.eq(batch_id))
                .order(document_chunks::chunk_index.asc())
                .select(DocumentChunkModel::as_select())
                .load::<DocumentChunkModel>(conn)
        })
        .await
        .map_err(to_repository_error)?;

        models
            .into_iter()
            .map(|model| DocumentChunk::try_from(model).map_err(ChunkRepositoryError::VectorError))
            .collect()
    }

    async fn similarity_search(
        &self,
        query: SimilarityQuery,
    ) -> Result<Vec<SimilarityMatch>, ChunkRepositoryError> {
        let SimilarityQuery {
            embedding,
            notebook_id,
            user_id,
            document_ids,
            threshold,
            limit,
        } = query;
        let max_distance = max_distance_for(threshold);

        let rows = run_blocking(&self.pool, move |conn| {
            let mut sql = document_chunks::table
                .inner_join(documents::table.inner_join(notebooks::table))
                .filter(documents::notebook_id.eq(notebook_id))
                .filter(notebooks::user_id.eq(user_id))
                .order(
                    document_chunks::embedding
                        .cosine_distance(embedding.clone())
                        .asc(),
                )
                .limit(limit)
                .select((
                    document_chunks::id,
                    document_chunks::document_id,
                    document_chunks::chunk_index,
                    document_chunks::content,
                    document_chunks::embedding.cosine_distance(embedding.clone()),
                ))
                .into_boxed();

            if let Some(max_distance) = max_distance {
                sql = sql.filter(
                    document_chunks::embedding
                        .cosine_distance(embedding)
                        .le(max_distance),
                );
            }

            if let Some(ids) = document_ids {
                sql = sql.filter(document_chunks::document_id.eq_any(ids));
            }

            sql.load::<(Uuid, Uuid, i32, String, Option<f64>)>(conn)
        })
        .await
        .map_err(to_repository_error)?;

        Ok(rows
            .into_iter()
            .filter_map(|(chunk_id, document_id, chunk_index, content, distance)| {
                distance.map(|distance| SimilarityMatch {
                    chunk_id,
                    document_id,
                    chunk_index,
                    content,
                    similarity: similarity_from_distance(distance),
                })
            })
            .collect())
    }

    async fn delete_by_batch_id(&self, batch_id: Uuid) -> Result<i64, ChunkRepositoryError> {
        let deleted_count = run_blocking(&self.pool, move |conn| {
            diesel::delete(
                document_chunks::table.filter(document_chunks::embedding_batch_id.eq(batch_id)),
            )
            .execute(conn)
        })
        .await
        .map_err(to_repository_error)?;

        Ok(deleted_count as i64)
    }

    async fn count_by_batch_id(&self, batch_id: Uuid) -> Result<i64, ChunkRepositoryError> {
        run_blocking(&self.pool, move |conn| {
            document_chunks::table
                .filter(document_chunks::embedding_batch_id.eq(batch_id))
                .count()
                .get_result::<i64>(conn)
        })
        .await
        .map_err(to_repository_error)
    }
}
