mod pinecone;

pub use pinecone::PineconeIndex;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::AppError;

/// The persisted unit in the vector store: an opaque identifier, the
/// embedding, and the chunk text plus metadata so retrieval can return it
/// verbatim. Records are append-only; nothing in this system mutates them.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub text: String,
    pub metadata: HashMap<String, String>,
}

/// A retrieved record with its similarity score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub id: String,
    pub score: f32,
    pub text: String,
    pub metadata: HashMap<String, String>,
}

/// Capability seam over the managed vector index. All reads and writes to
/// the knowledge base go through an implementation of this trait.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Idempotent: creates the named collection for `dimension` and cosine
    /// similarity if it does not exist yet. Safe to call on every startup.
    async fn ensure_index(&self, dimension: usize) -> Result<(), AppError>;

    /// The dimension the index was created with.
    async fn dimension(&self) -> Result<usize, AppError>;

    async fn upsert(&self, records: Vec<IndexRecord>) -> Result<(), AppError>;

    /// Top-k nearest records by cosine similarity.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredRecord>, AppError>;
}
