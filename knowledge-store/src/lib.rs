pub mod chunking;
pub mod prompt;

use std::sync::Arc;

use common::{
    document::Document,
    error::AppError,
    llm::LanguageModelProvider,
    utils::config::AppConfig,
    vector::{IndexRecord, VectorIndex},
};
use tokio_retry::{
    strategy::{jitter, ExponentialBackoff},
    Retry,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Sole coordination point between the front ends and the external
/// embedding/vector-store/completion services. Both handles are injected and
/// read-only after construction.
pub struct KnowledgeStore {
    provider: Arc<dyn LanguageModelProvider>,
    index: Arc<dyn VectorIndex>,
    index_name: String,
    chunk_size: usize,
    chunk_overlap: usize,
    default_top_k: usize,
}

impl KnowledgeStore {
    pub fn new(
        provider: Arc<dyn LanguageModelProvider>,
        index: Arc<dyn VectorIndex>,
        config: &AppConfig,
    ) -> Self {
        Self {
            provider,
            index,
            index_name: config.pinecone_index_name.clone(),
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
            default_top_k: config.top_k,
        }
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn embedding_model(&self) -> &str {
        self.provider.embedding_model()
    }

    /// Idempotent index bootstrap, safe to run on every process startup.
    pub async fn ensure_index(&self) -> Result<(), AppError> {
        self.index.ensure_index(self.provider.dimension()).await
    }

    /// Splits, embeds, and upserts the given documents. Returns the number
    /// of documents ingested (not chunks, matching user-facing reporting).
    ///
    /// The index is an additive shared target: repeated ingestion of the
    /// same document accumulates fresh records rather than updating in
    /// place. On partial failure the error carries how many records were
    /// durably written before it.
    pub async fn ingest(&self, documents: Vec<Document>) -> Result<usize, AppError> {
        if documents.is_empty() {
            return Ok(0);
        }

        let index_dimension = self.index.dimension().await?;
        let mut written = 0usize;
        let mut processed = 0usize;

        for document in documents {
            let chunks = chunking::split(&document.text, self.chunk_size, self.chunk_overlap)?;
            if chunks.is_empty() {
                warn!(document = %document.name, "Skipping document with no embeddable text");
                continue;
            }

            let embeddings = Retry::spawn(retry_strategy(), || {
                self.provider.embed_batch(chunks.clone())
            })
            .await
            .map_err(|e| ingestion_error(written, e))?;

            if embeddings.len() != chunks.len() {
                return Err(ingestion_error(
                    written,
                    AppError::Query(format!(
                        "provider returned {} embeddings for {} chunks",
                        embeddings.len(),
                        chunks.len()
                    )),
                ));
            }

            // Fail before any upsert of this batch when the model's output
            // does not match the dimension the index was created with.
            for embedding in &embeddings {
                if embedding.len() != index_dimension {
                    return Err(AppError::DimensionMismatch {
                        expected: index_dimension,
                        actual: embedding.len(),
                    });
                }
            }

            let record_count = chunks.len();
            let records: Vec<IndexRecord> = chunks
                .into_iter()
                .zip(embeddings)
                .map(|(text, values)| IndexRecord {
                    id: Uuid::new_v4().to_string(),
                    values,
                    text,
                    metadata: document.metadata.clone(),
                })
                .collect();

            // Upserts are not retried; partial progress is reported instead.
            self.index
                .upsert(records)
                .await
                .map_err(|e| ingestion_error(written, e))?;

            written += record_count;
            processed += 1;
            debug!(
                document = %document.name,
                chunks = record_count,
                "Document ingested"
            );
        }

        info!(
            documents = processed,
            records = written,
            index = %self.index_name,
            "Ingestion complete"
        );

        Ok(processed)
    }

    /// Answers a question from the knowledge base: embed, retrieve top-k,
    /// prompt the chat model with the retrieved passages, return its text
    /// verbatim. Blank input fails fast without any external call.
    pub async fn query(&self, question: &str, top_k: Option<usize>) -> Result<String, AppError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::Validation("Please type a question.".into()));
        }

        let top_k = top_k.unwrap_or(self.default_top_k);

        let embedding = Retry::spawn(retry_strategy(), || self.provider.embed(question)).await?;

        let records =
            Retry::spawn(retry_strategy(), || self.index.query(&embedding, top_k)).await?;
        debug!(retrieved = records.len(), top_k, "Context retrieved");

        let user_prompt = prompt::build_user_prompt(question, &records);

        Retry::spawn(retry_strategy(), || {
            self.provider.complete(prompt::QUERY_SYSTEM_PROMPT, &user_prompt)
        })
        .await
    }
}

/// Bounded exponential backoff for idempotent reads against the external
/// services.
fn retry_strategy() -> impl Iterator<Item = std::time::Duration> {
    ExponentialBackoff::from_millis(100).map(jitter).take(3)
}

fn ingestion_error(written: usize, source: AppError) -> AppError {
    AppError::Ingestion {
        written,
        message: source.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use common::{
        test_utils::{HashedProvider, InMemoryIndex},
        vector::ScoredRecord,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn test_config(chunk_size: usize, chunk_overlap: usize) -> AppConfig {
        AppConfig {
            openai_api_key: "test-key".into(),
            pinecone_api_key: "test-key".into(),
            pinecone_index_name: "test-index".into(),
            pinecone_cloud: "aws".into(),
            pinecone_region: "us-east-1".into(),
            embedding_model: "text-embedding-3-small".into(),
            embedding_dimensions: 64,
            chat_model: "gpt-4o-mini".into(),
            chunk_size,
            chunk_overlap,
            top_k: 5,
            http_port: 0,
            documents_dir: "./documents".into(),
            openai_base_url: "https://example.com".into(),
        }
    }

    fn store_with(
        provider: Arc<HashedProvider>,
        index: Arc<InMemoryIndex>,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> KnowledgeStore {
        KnowledgeStore::new(provider, index, &test_config(chunk_size, chunk_overlap))
    }

    #[tokio::test]
    async fn ingest_of_nothing_returns_zero_without_external_calls() {
        let provider = Arc::new(HashedProvider::new(64));
        let index = Arc::new(InMemoryIndex::new());
        let store = store_with(provider.clone(), index.clone(), 1000, 200);

        let count = store.ingest(Vec::new()).await.expect("ingest");
        assert_eq!(count, 0);
        assert_eq!(provider.total_calls(), 0);
        assert_eq!(index.total_calls(), 0);
    }

    #[tokio::test]
    async fn blank_query_fails_fast_without_external_calls() {
        let provider = Arc::new(HashedProvider::new(64));
        let index = Arc::new(InMemoryIndex::new());
        let store = store_with(provider.clone(), index.clone(), 1000, 200);

        for question in ["", "   ", "\n\t"] {
            let result = store.query(question, None).await;
            assert!(matches!(result, Err(AppError::Validation(_))));
        }
        assert_eq!(provider.total_calls(), 0);
        assert_eq!(index.total_calls(), 0);
    }

    #[tokio::test]
    async fn short_document_yields_one_record_and_count_one() {
        let provider = Arc::new(HashedProvider::new(64));
        let index = Arc::new(InMemoryIndex::new());
        let store = store_with(provider.clone(), index.clone(), 1000, 200);
        store.ensure_index().await.expect("ensure");

        let count = store
            .ingest(vec![Document::new(
                "spark.txt",
                "Spark partitions data across the cluster.",
            )])
            .await
            .expect("ingest");

        assert_eq!(count, 1);
        assert_eq!(index.record_count().await, 1);
    }

    #[tokio::test]
    async fn empty_documents_are_skipped_not_counted() {
        let provider = Arc::new(HashedProvider::new(64));
        let index = Arc::new(InMemoryIndex::new());
        let store = store_with(provider.clone(), index.clone(), 1000, 200);
        store.ensure_index().await.expect("ensure");

        let count = store
            .ingest(vec![
                Document::new("empty.txt", "   "),
                Document::new("real.txt", "Kafka retains messages per topic."),
            ])
            .await
            .expect("ingest");

        assert_eq!(count, 1);
        assert_eq!(index.record_count().await, 1);
    }

    #[tokio::test]
    async fn reingesting_accumulates_records_append_only() {
        let provider = Arc::new(HashedProvider::new(64));
        let index = Arc::new(InMemoryIndex::new());
        let store = store_with(provider.clone(), index.clone(), 1000, 200);
        store.ensure_index().await.expect("ensure");

        let doc = Document::new("spark.txt", "Spark partitions data across the cluster.");
        store.ingest(vec![doc.clone()]).await.expect("first ingest");
        store.ingest(vec![doc]).await.expect("second ingest");

        assert_eq!(index.record_count().await, 2);
    }

    #[tokio::test]
    async fn dimension_mismatch_fails_before_any_upsert() {
        let provider = Arc::new(HashedProvider::new(768));
        let index = Arc::new(InMemoryIndex::with_dimension(1536));
        let store = store_with(provider.clone(), index.clone(), 1000, 200);

        let result = store
            .ingest(vec![Document::new("doc.txt", "some text to embed")])
            .await;

        assert!(matches!(
            result,
            Err(AppError::DimensionMismatch {
                expected: 1536,
                actual: 768
            })
        ));
        assert_eq!(index.record_count().await, 0);
        assert_eq!(index.upsert_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn retrieval_round_trip_surfaces_the_fact_bearing_chunk() {
        let provider = Arc::new(HashedProvider::new(256));
        let index = Arc::new(InMemoryIndex::new());
        let store = store_with(provider.clone(), index.clone(), 1000, 200);
        store.ensure_index().await.expect("ensure");

        store
            .ingest(vec![
                Document::new(
                    "spark.txt",
                    "Spark partitions data across worker nodes to parallelize computation.",
                ),
                Document::new(
                    "bread.txt",
                    "Sourdough starters need regular feeding with flour and water.",
                ),
            ])
            .await
            .expect("ingest");

        let question_embedding = provider
            .embed("How does Spark partition data across nodes?")
            .await
            .expect("embed");
        let results = index.query(&question_embedding, 1).await.expect("query");

        assert_eq!(results.len(), 1);
        assert!(results[0].text.contains("Spark partitions data"));
        assert_eq!(
            results[0].metadata.get("file_name").map(String::as_str),
            Some("spark.txt")
        );
    }

    #[tokio::test]
    async fn query_returns_the_completion_verbatim() {
        let provider = Arc::new(
            HashedProvider::new(64).with_completion("Spark splits data into partitions."),
        );
        let index = Arc::new(InMemoryIndex::new());
        let store = store_with(provider.clone(), index.clone(), 1000, 200);
        store.ensure_index().await.expect("ensure");

        let answer = store
            .query("How does Spark partition data?", None)
            .await
            .expect("query");
        assert_eq!(answer, "Spark splits data into partitions.");
        assert_eq!(provider.complete_calls.load(Ordering::SeqCst), 1);
    }

    /// Index double whose upsert rejects every call after the first, to
    /// exercise partial-progress reporting.
    struct FlakyIndex {
        inner: InMemoryIndex,
        upserts: AtomicUsize,
    }

    #[async_trait]
    impl VectorIndex for FlakyIndex {
        async fn ensure_index(&self, dimension: usize) -> Result<(), AppError> {
            self.inner.ensure_index(dimension).await
        }

        async fn dimension(&self) -> Result<usize, AppError> {
            self.inner.dimension().await
        }

        async fn upsert(&self, records: Vec<IndexRecord>) -> Result<(), AppError> {
            if self.upserts.fetch_add(1, Ordering::SeqCst) > 0 {
                return Err(AppError::VectorStore("upsert rejected".into()));
            }
            self.inner.upsert(records).await
        }

        async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredRecord>, AppError> {
            self.inner.query(vector, top_k).await
        }
    }

    #[tokio::test]
    async fn partial_failure_reports_records_written_so_far() {
        let provider = Arc::new(HashedProvider::new(64));
        let index = Arc::new(FlakyIndex {
            inner: InMemoryIndex::new(),
            upserts: AtomicUsize::new(0),
        });
        let store = KnowledgeStore::new(provider, index, &test_config(1000, 200));
        store.ensure_index().await.expect("ensure");

        let result = store
            .ingest(vec![
                Document::new("one.txt", "first document body"),
                Document::new("two.txt", "second document body"),
            ])
            .await;

        match result {
            Err(AppError::Ingestion { written, .. }) => assert_eq!(written, 1),
            other => panic!("expected ingestion error, got {other:?}"),
        }
    }
}
