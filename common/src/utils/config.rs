use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::AppError;

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    pub openai_api_key: String,
    pub pinecone_api_key: String,
    #[serde(default = "default_index_name")]
    pub pinecone_index_name: String,
    #[serde(default = "default_cloud")]
    pub pinecone_cloud: String,
    #[serde(default = "default_region")]
    pub pinecone_region: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: u32,
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_documents_dir")]
    pub documents_dir: String,
    #[serde(default = "default_base_url")]
    pub openai_base_url: String,
}

fn default_index_name() -> String {
    "de-knowledge-base".to_owned()
}

fn default_cloud() -> String {
    "aws".to_owned()
}

fn default_region() -> String {
    "us-east-1".to_owned()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_owned()
}

fn default_embedding_dimensions() -> u32 {
    1536
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_owned()
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_top_k() -> usize {
    5
}

fn default_http_port() -> u16 {
    7860
}

fn default_documents_dir() -> String {
    "./documents".to_owned()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_owned()
}

impl AppConfig {
    /// Rejects settings that would misbehave long after startup, most
    /// importantly an overlap at or above the chunk size, which makes
    /// chunking degenerate.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.chunk_size == 0 {
            return Err(AppError::Validation("chunk_size must be greater than 0".into()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(AppError::Validation(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(AppError::Validation("top_k must be greater than 0".into()));
        }
        if self.embedding_dimensions == 0 {
            return Err(AppError::Validation(
                "embedding_dimensions must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Loads settings from an optional `config` file and the process
/// environment, failing fast when a required credential is missing or a
/// setting is invalid.
pub fn get_config() -> Result<AppConfig, AppError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    let config: AppConfig = config.try_deserialize()?;
    config.validate()?;

    Ok(config)
}
