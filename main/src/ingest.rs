use std::{path::PathBuf, sync::Arc};

use common::{
    llm::OpenAiProvider,
    utils::config::get_config,
    vector::PineconeIndex,
};
use ingestion_pipeline::IngestionReport;
use knowledge_store::KnowledgeStore;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// One-shot bulk ingestion of the configured documents directory.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Set up tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    let config = get_config()?;

    let provider = Arc::new(OpenAiProvider::from_config(&config));
    let index = Arc::new(PineconeIndex::from_config(&config)?);
    let store = Arc::new(KnowledgeStore::new(provider, index, &config));

    println!("Setting up index '{}'...", config.pinecone_index_name);
    store.ensure_index().await?;

    let documents_dir = PathBuf::from(&config.documents_dir);
    println!("Ingesting documents from {}...", documents_dir.display());

    let report = ingestion_pipeline::run(&store, &[documents_dir]).await?;
    println!("{report}");

    if let IngestionReport::Completed { .. } = report {
        println!("Next step: run the query binary to ask questions.");
    }

    Ok(())
}
