mod openai;

pub use openai::OpenAiProvider;

use async_trait::async_trait;

use crate::error::AppError;

/// Capability seam over the embedding/completion service. The gateway only
/// ever talks to this trait, so tests can substitute deterministic doubles.
#[async_trait]
pub trait LanguageModelProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AppError>;

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, AppError>;

    /// Requests a chat completion and returns the first choice's text
    /// verbatim.
    async fn complete(&self, system: &str, user: &str) -> Result<String, AppError>;

    /// Output dimension of the configured embedding model.
    fn dimension(&self) -> usize;

    fn embedding_model(&self) -> &str;

    fn chat_model(&self) -> &str;
}
