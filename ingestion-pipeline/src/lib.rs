pub mod loader;

use std::{fmt, path::PathBuf};

use common::error::AppError;
use knowledge_store::KnowledgeStore;
use tracing::{info, warn};

/// Outcome of an ingestion run. `NothingToDo` is the user-visible "no valid
/// files" result, deliberately not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestionReport {
    NothingToDo,
    Completed {
        documents: usize,
        index_name: String,
        embedding_model: String,
    },
}

impl fmt::Display for IngestionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NothingToDo => write!(f, "Could not find any valid files to ingest."),
            Self::Completed {
                documents,
                index_name,
                embedding_model,
            } => write!(
                f,
                "Ingested {documents} document(s) into '{index_name}' using {embedding_model}."
            ),
        }
    }
}

/// Loads the given sources into Documents and pushes them through the
/// gateway's ingest path. Front ends normalize whatever they accept (an
/// upload set, a fixed directory) into this single typed entry point.
pub async fn run(store: &KnowledgeStore, sources: &[PathBuf]) -> Result<IngestionReport, AppError> {
    let files = loader::collect_files(sources).await?;
    if files.is_empty() {
        info!("No valid files to ingest");
        return Ok(IngestionReport::NothingToDo);
    }

    let mut documents = Vec::with_capacity(files.len());
    for file in &files {
        // A single unreadable file (binary content, permission problem) must
        // not abort the whole batch and lose the readable ones next to it.
        match loader::load_document(file).await {
            Ok(document) => documents.push(document),
            Err(e) => warn!(
                path = %file.display(),
                error = %e,
                "Skipping file that cannot be read as text"
            ),
        }
    }

    if documents.is_empty() {
        info!("No readable files to ingest");
        return Ok(IngestionReport::NothingToDo);
    }

    let count = store.ingest(documents).await?;

    Ok(IngestionReport::Completed {
        documents: count,
        index_name: store.index_name().to_owned(),
        embedding_model: store.embedding_model().to_owned(),
    })
}
