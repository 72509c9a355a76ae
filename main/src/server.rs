use std::sync::Arc;

use api_router::{api_state::ApiState, app_router};
use common::{
    llm::OpenAiProvider,
    utils::config::get_config,
    vector::PineconeIndex,
};
use knowledge_store::KnowledgeStore;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Set up tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    // Get config
    let config = get_config()?;

    let provider = Arc::new(OpenAiProvider::from_config(&config));
    let index = Arc::new(PineconeIndex::from_config(&config)?);
    let store = Arc::new(KnowledgeStore::new(provider, index, &config));

    // Ensure the vector index exists before serving
    store.ensure_index().await?;
    info!(
        index = %store.index_name(),
        embedding_model = %store.embedding_model(),
        "Knowledge store initialized"
    );

    let app = app_router(ApiState::new(store, config.clone()));

    info!("Starting server listening on 0.0.0.0:{}", config.http_port);
    let serve_address = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(serve_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
