//! In-memory stand-ins for the repositories and model providers.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use pgvector::Vector;
use uuid::Uuid;

use crate::application::ports::embedding_provider::{
    EmbeddingProvider, EmbeddingProviderError, EmbeddingRequest, EmbeddingResponse,
};
use crate::application::ports::generation_provider::{
    GenerationProvider, GenerationProviderError, GenerationRequest, GenerationResponse,
};
use crate::domain::entities::{Document, DocumentChunk, EmbeddingBatch};
use crate::domain::repositories::chunk_repository::{
    ChunkRepositoryError, SimilarityMatch, SimilarityQuery,
};
use crate::domain::repositories::document_repository::DocumentRepositoryError;
use crate::domain::repositories::embedding_batch_repository::EmbeddingBatchRepositoryError;
use crate::domain::repositories::{ChunkRepository, DocumentRepository, EmbeddingBatchRepository};
use crate::domain::value_objects::DocumentLabel;

pub const FAKE_DIMENSION: usize = 8;

/// `count` distinct whitespace-separated words.
pub fn words(count: usize) -> String {
    (0..count)
        .map(|i| format!("word{}", i))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Default)]
pub struct InMemoryDocumentRepository {
    documents: Mutex<Vec<Document>>,
    owners: Mutex<HashMap<Uuid, Uuid>>,
}

impl InMemoryDocumentRepository {
    /// Notebooks without a recorded owner are listed for every user.
    pub fn set_owner(&self, notebook_id: Uuid, user_id: Uuid) {
        self.owners.lock().unwrap().insert(notebook_id, user_id);
    }

    pub fn insert(&self, document: Document) {
        self.documents.lock().unwrap().push(document);
    }

    pub fn get(&self, id: Uuid) -> Option<Document> {
        self.documents
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.id() == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.documents.lock().unwrap().len()
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn save(&self, document: &Document) -> Result<(), DocumentRepositoryError> {
        let mut documents = self.documents.lock().unwrap();
        documents.retain(|d| d.id() != document.id());
        documents.push(document.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Document>, DocumentRepositoryError> {
        Ok(self.get(id))
    }

    async fn list_by_notebook(
        &self,
        notebook_id: Uuid,
        user_id: Uuid,
        id_filter: Option<&[Uuid]>,
    ) -> Result<Vec<Document>, DocumentRepositoryError> {
        let owned = self
            .owners
            .lock()
            .unwrap()
            .get(&notebook_id)
            .is_none_or(|owner| *owner == user_id);
        if !owned {
            return Ok(Vec::new());
        }

        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.notebook_id() == notebook_id)
            .filter(|d| id_filter.is_none_or(|ids| ids.contains(&d.id())))
            .cloned()
            .collect())
    }

    async fn labels_by_notebook(
        &self,
        notebook_id: Uuid,
    ) -> Result<HashMap<Uuid, DocumentLabel>, DocumentRepositoryError> {
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.notebook_id() == notebook_id)
            .map(|d| (d.id(), d.label()))
            .collect())
    }

    async fn set_embedding_batch(
        &self,
        document_id: Uuid,
        batch_id: Option<Uuid>,
    ) -> Result<(), DocumentRepositoryError> {
        let mut documents = self.documents.lock().unwrap();
        let document = documents
            .iter_mut()
            .find(|d| d.id() == document_id)
            .ok_or(DocumentRepositoryError::NotFound(document_id))?;
        match batch_id {
            Some(batch_id) => document.attach_embedding_batch(batch_id),
            None => {
                document.detach_embedding_batch();
            }
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DocumentRepositoryError> {
        let mut documents = self.documents.lock().unwrap();
        let before = documents.len();
        documents.retain(|d| d.id() != id);
        Ok(documents.len() != before)
    }
}

/// Vector store fake. Searches run cosine similarity over stored chunks
/// (without notebook or user scoping) unless matches were scripted.
#[derive(Default)]
pub struct InMemoryChunkRepository {
    chunks: Mutex<Vec<DocumentChunk>>,
    scripted: Mutex<Option<Vec<SimilarityMatch>>>,
    last_query: Mutex<Option<SimilarityQuery>>,
    fail_saves: bool,
    fail_deletes: bool,
    fail_searches: bool,
}

impl InMemoryChunkRepository {
    pub fn failing_saves(mut self) -> Self {
        self.fail_saves = true;
        self
    }

    pub fn failing_deletes(mut self) -> Self {
        self.fail_deletes = true;
        self
    }

    pub fn failing_searches(mut self) -> Self {
        self.fail_searches = true;
        self
    }

    pub fn script_matches(&self, matches: Vec<SimilarityMatch>) {
        *self.scripted.lock().unwrap() = Some(matches);
    }

    pub fn last_query(&self) -> Option<SimilarityQuery> {
        self.last_query.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.chunks.lock().unwrap().len()
    }
}

#[async_trait]
impl ChunkRepository for InMemoryChunkRepository {
    async fn save_batch(&self, chunks: &[DocumentChunk]) -> Result<(), ChunkRepositoryError> {
        if self.fail_saves {
            return Err(ChunkRepositoryError::DatabaseError("insert rejected".to_string()));
        }
        self.chunks.lock().unwrap().extend_from_slice(chunks);
        Ok(())
    }

    async fn find_by_batch_id(
        &self,
        batch_id: Uuid,
    ) -> Result<Vec<DocumentChunk>, ChunkRepositoryError> {
        let mut found: Vec<DocumentChunk> = self
            .chunks
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.embedding_batch_id() == batch_id)
            .cloned()
            .collect();
        found.sort_by_key(DocumentChunk::chunk_index);
        Ok(found)
    }

    async fn similarity_search(
        &self,
        query: SimilarityQuery,
    ) -> Result<Vec<SimilarityMatch>, ChunkRepositoryError> {
        *self.last_query.lock().unwrap() = Some(query.clone());

        if self.fail_searches {
            return Err(ChunkRepositoryError::DatabaseError("search rejected".to_string()));
        }
        if let Some(scripted) = self.scripted.lock().unwrap().clone() {
            return Ok(scripted);
        }

        let mut matches: Vec<SimilarityMatch> = self
            .chunks
            .lock()
            .unwrap()
            .iter()
            .filter(|c| {
                query
                    .document_ids
                    .as_ref()
                    .is_none_or(|ids| ids.contains(&c.document_id()))
            })
            .filter_map(|c| {
                let similarity = c.cosine_similarity(&query.embedding)?.clamp(0.0, 1.0);
                (similarity >= query.threshold).then(|| SimilarityMatch {
                    chunk_id: c.id(),
                    document_id: c.document_id(),
                    chunk_index: c.chunk_index(),
                    content: c.content().to_string(),
                    similarity,
                })
            })
            .collect();
        matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        matches.truncate(query.limit.max(0) as usize);
        Ok(matches)
    }

    async fn delete_by_batch_id(&self, batch_id: Uuid) -> Result<i64, ChunkRepositoryError> {
        if self.fail_deletes {
            return Err(ChunkRepositoryError::DatabaseError("delete rejected".to_string()));
        }
        let mut chunks = self.chunks.lock().unwrap();
        let before = chunks.len();
        chunks.retain(|c| c.embedding_batch_id() != batch_id);
        Ok((before - chunks.len()) as i64)
    }

    async fn count_by_batch_id(&self, batch_id: Uuid) -> Result<i64, ChunkRepositoryError> {
        Ok(self
            .chunks
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.embedding_batch_id() == batch_id)
            .count() as i64)
    }
}

#[derive(Default)]
pub struct InMemoryBatchRepository {
    batches: Mutex<Vec<EmbeddingBatch>>,
    failing_updates: AtomicUsize,
}

impl InMemoryBatchRepository {
    /// The next `count` calls to `update` fail without touching the record.
    pub fn failing_updates(self, count: usize) -> Self {
        self.failing_updates.store(count, Ordering::SeqCst);
        self
    }

    pub fn all(&self) -> Vec<EmbeddingBatch> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmbeddingBatchRepository for InMemoryBatchRepository {
    async fn save(&self, batch: &EmbeddingBatch) -> Result<(), EmbeddingBatchRepositoryError> {
        self.batches.lock().unwrap().push(batch.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<EmbeddingBatch>, EmbeddingBatchRepositoryError> {
        Ok(self
            .batches
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.id() == id)
            .cloned())
    }

    async fn update(&self, batch: &EmbeddingBatch) -> Result<(), EmbeddingBatchRepositoryError> {
        let remaining = self.failing_updates.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_updates.store(remaining - 1, Ordering::SeqCst);
            return Err(EmbeddingBatchRepositoryError::DatabaseError(
                "update rejected".to_string(),
            ));
        }

        let mut batches = self.batches.lock().unwrap();
        let stored = batches
            .iter_mut()
            .find(|b| b.id() == batch.id())
            .ok_or(EmbeddingBatchRepositoryError::NotFound(batch.id()))?;
        *stored = batch.clone();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, EmbeddingBatchRepositoryError> {
        let mut batches = self.batches.lock().unwrap();
        let before = batches.len();
        batches.retain(|b| b.id() != id);
        Ok(batches.len() != before)
    }
}

/// Deterministic embeddings derived from the bytes of the input text.
#[derive(Default)]
pub struct FakeEmbeddingProvider {
    calls: AtomicUsize,
    fail_on_call: Option<usize>,
    empty_vectors: bool,
}

impl FakeEmbeddingProvider {
    /// The `call`-th request (1-based) fails with a network error.
    pub fn failing_on_call(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    pub fn returning_empty_vectors(mut self) -> Self {
        self.empty_vectors = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for FakeEmbeddingProvider {
    async fn generate_embedding(
        &self,
        request: EmbeddingRequest,
    ) -> Result<EmbeddingResponse, EmbeddingProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_call == Some(call) {
            return Err(EmbeddingProviderError::NetworkError("connection reset".to_string()));
        }
        if self.empty_vectors {
            return Ok(EmbeddingResponse {
                embedding: Vector::from(Vec::new()),
                model_name: self.model_name().to_string(),
            });
        }

        let mut values = vec![1.0f32; FAKE_DIMENSION];
        for (i, byte) in request.text.bytes().enumerate() {
            values[i % FAKE_DIMENSION] += f32::from(byte) / 255.0;
        }

        Ok(EmbeddingResponse {
            embedding: Vector::from(values),
            model_name: self.model_name().to_string(),
        })
    }

    fn model_name(&self) -> &str {
        "fake-embedding"
    }

    fn embedding_dimension(&self) -> usize {
        FAKE_DIMENSION
    }
}

#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    Answer(String),
    Fail(GenerationProviderError),
    /// Never completes; only a caller-side timeout ends the attempt.
    Hang,
}

/// Answers per model name. Models without a script are reported as not
/// found.
#[derive(Default)]
pub struct ScriptedGenerationProvider {
    outcomes: HashMap<String, ScriptedOutcome>,
    attempts: Mutex<Vec<String>>,
}

impl ScriptedGenerationProvider {
    pub fn with(mut self, model: &str, outcome: ScriptedOutcome) -> Self {
        self.outcomes.insert(model.to_string(), outcome);
        self
    }

    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationProvider for ScriptedGenerationProvider {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, GenerationProviderError> {
        self.attempts.lock().unwrap().push(request.model.clone());

        match self.outcomes.get(&request.model).cloned() {
            Some(ScriptedOutcome::Answer(text)) => Ok(GenerationResponse {
                text,
                model: request.model,
            }),
            Some(ScriptedOutcome::Fail(error)) => Err(error),
            Some(ScriptedOutcome::Hang) => std::future::pending().await,
            None => Err(GenerationProviderError::ModelNotFound(request.model)),
        }
    }
}
