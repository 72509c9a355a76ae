use std::sync::Arc;

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessage, ChatCompletionRequestUserMessage,
        CreateChatCompletionRequestArgs, CreateEmbeddingRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::debug;

use super::LanguageModelProvider;
use crate::{error::AppError, utils::config::AppConfig};

/// OpenAI-backed embedding and completion provider. Holds the shared client
/// handle; read-only after construction.
pub struct OpenAiProvider {
    client: Arc<Client<OpenAIConfig>>,
    embedding_model: String,
    chat_model: String,
    dimensions: u32,
}

impl OpenAiProvider {
    pub fn new(
        client: Arc<Client<OpenAIConfig>>,
        embedding_model: String,
        chat_model: String,
        dimensions: u32,
    ) -> Self {
        Self {
            client,
            embedding_model,
            chat_model,
            dimensions,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let client = Arc::new(Client::with_config(
            OpenAIConfig::new()
                .with_api_key(&config.openai_api_key)
                .with_api_base(&config.openai_base_url),
        ));
        Self::new(
            client,
            config.embedding_model.clone(),
            config.chat_model.clone(),
            config.embedding_dimensions,
        )
    }
}

#[async_trait]
impl LanguageModelProvider for OpenAiProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AppError> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(self.embedding_model.clone())
            .input([text])
            .dimensions(self.dimensions)
            .build()?;

        let response = self.client.embeddings().create(request).await?;

        let embedding = response
            .data
            .first()
            .ok_or_else(|| AppError::Query("No embedding data received from OpenAI API".into()))?
            .embedding
            .clone();

        debug!(dimensions = embedding.len(), "Embedding created");

        Ok(embedding)
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, AppError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = CreateEmbeddingRequestArgs::default()
            .model(self.embedding_model.clone())
            .input(texts)
            .dimensions(self.dimensions)
            .build()?;

        let response = self.client.embeddings().create(request).await?;

        Ok(response
            .data
            .into_iter()
            .map(|item| item.embedding)
            .collect())
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, AppError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(self.chat_model.clone())
            .messages([
                ChatCompletionRequestSystemMessage::from(system).into(),
                ChatCompletionRequestUserMessage::from(user).into(),
            ])
            .build()?;

        let response = self.client.chat().create(request).await?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| AppError::Query("No completion content received from OpenAI API".into()))
    }

    fn dimension(&self) -> usize {
        self.dimensions as usize
    }

    fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    fn chat_model(&self) -> &str {
        &self.chat_model
    }
}
