//! Deterministic doubles for the provider and vector index seams, used by
//! unit tests across the workspace.

use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    error::AppError,
    llm::LanguageModelProvider,
    vector::{IndexRecord, ScoredRecord, VectorIndex},
};

/// Embedding provider producing normalized token-bucket vectors. Texts that
/// share vocabulary land near each other, which is enough signal for
/// retrieval round-trip tests without a network call.
pub struct HashedProvider {
    dimension: usize,
    completion: String,
    pub embed_calls: AtomicUsize,
    pub complete_calls: AtomicUsize,
}

impl HashedProvider {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
            completion: "stub completion".to_owned(),
            embed_calls: AtomicUsize::new(0),
            complete_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_completion(mut self, completion: impl Into<String>) -> Self {
        self.completion = completion.into();
        self
    }

    pub fn total_calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst) + self.complete_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LanguageModelProvider for HashedProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AppError> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        Ok(hashed_embedding(text, self.dimension))
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, AppError> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts
            .into_iter()
            .map(|text| hashed_embedding(&text, self.dimension))
            .collect())
    }

    async fn complete(&self, _system: &str, _user: &str) -> Result<String, AppError> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.completion.clone())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embedding_model(&self) -> &str {
        "hashed-test-embedder"
    }

    fn chat_model(&self) -> &str {
        "hashed-test-chat"
    }
}

/// In-memory vector index scoring by cosine similarity. Mirrors the
/// append-only semantics of the real store.
pub struct InMemoryIndex {
    records: Mutex<Vec<IndexRecord>>,
    dimension: std::sync::Mutex<Option<usize>>,
    pub ensure_calls: AtomicUsize,
    pub upsert_calls: AtomicUsize,
    pub query_calls: AtomicUsize,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            dimension: std::sync::Mutex::new(None),
            ensure_calls: AtomicUsize::new(0),
            upsert_calls: AtomicUsize::new(0),
            query_calls: AtomicUsize::new(0),
        }
    }

    /// An index that already exists with a fixed dimension, as if created by
    /// an earlier run.
    pub fn with_dimension(dimension: usize) -> Self {
        let index = Self::new();
        *index.dimension.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = Some(dimension);
        index
    }

    pub async fn record_count(&self) -> usize {
        self.records.lock().await.len()
    }

    pub fn total_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst) + self.query_calls.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn ensure_index(&self, dimension: usize) -> Result<(), AppError> {
        self.ensure_calls.fetch_add(1, Ordering::SeqCst);
        let mut current = self
            .dimension
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if current.is_none() {
            *current = Some(dimension);
        }
        Ok(())
    }

    async fn dimension(&self) -> Result<usize, AppError> {
        let current = *self
            .dimension
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        current.ok_or_else(|| AppError::VectorStore("index does not exist".into()))
    }

    async fn upsert(&self, records: Vec<IndexRecord>) -> Result<(), AppError> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        self.records.lock().await.extend(records);
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredRecord>, AppError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        let records = self.records.lock().await;
        let mut scored: Vec<ScoredRecord> = records
            .iter()
            .map(|record| ScoredRecord {
                id: record.id.clone(),
                score: cosine_similarity(vector, &record.values),
                text: record.text.clone(),
                metadata: record.metadata.clone(),
            })
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

pub fn hashed_embedding(text: &str, dimension: usize) -> Vec<f32> {
    let dim = dimension.max(1);
    let mut vector = vec![0.0f32; dim];
    if text.is_empty() {
        return vector;
    }

    for token in tokens(text) {
        let idx = bucket(&token, dim);
        vector[idx] += 1.0;
    }

    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in &mut vector {
            *value /= norm;
        }
    }

    vector
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_ascii_lowercase())
}

fn bucket(token: &str, dimension: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    token.hash(&mut hasher);
    (hasher.finish() as usize) % dimension
}
