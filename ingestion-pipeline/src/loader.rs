use std::path::{Path, PathBuf};

use common::{document::Document, error::AppError};
use tracing::{debug, warn};

/// Expands the given sources into the ordered list of regular files to
/// ingest. Directories are walked recursively; paths that do not exist are
/// dropped with a warning rather than failing the run.
pub async fn collect_files(sources: &[PathBuf]) -> Result<Vec<PathBuf>, AppError> {
    let mut files = Vec::new();

    for source in sources {
        if source.is_file() {
            files.push(source.clone());
        } else if source.is_dir() {
            collect_dir(source, &mut files).await?;
        } else {
            warn!(path = %source.display(), "Skipping path that does not exist");
        }
    }

    Ok(files)
}

async fn collect_dir(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), AppError> {
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&current).await?;
        let mut found = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() {
                found.push(path);
            }
        }
        // Directory iteration order is platform-dependent; sort for a
        // stable ingestion order.
        found.sort();
        files.extend(found);
    }

    Ok(())
}

/// Reads a file into a Document carrying its file name as metadata.
pub async fn load_document(path: &Path) -> Result<Document, AppError> {
    let text = tokio::fs::read_to_string(path).await?;
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

    debug!(file = %name, characters = text.chars().count(), "Loaded document");

    Ok(Document::new(name, text))
}
