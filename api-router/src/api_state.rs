use std::sync::Arc;

use common::utils::config::AppConfig;
use knowledge_store::KnowledgeStore;

#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<KnowledgeStore>,
    pub config: AppConfig,
}

impl ApiState {
    pub fn new(store: Arc<KnowledgeStore>, config: AppConfig) -> Self {
        Self { store, config }
    }
}
