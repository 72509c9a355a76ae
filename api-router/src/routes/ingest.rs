use std::{
    collections::HashSet,
    path::Path,
};

use axum::{extract::State, Json};
use axum_typed_multipart::{FieldData, TryFromMultipart, TypedMultipart};
use futures::future::try_join_all;
use serde_json::{json, Value};
use tempfile::NamedTempFile;
use tracing::info;

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, TryFromMultipart)]
pub struct UploadParams {
    #[form_data(limit = "10000000")]
    #[form_data(default)]
    pub files: Vec<FieldData<NamedTempFile>>,
}

/// Accepts uploaded files and pushes them through the ingestion workflow.
/// Uploads are staged under their original file names so the stored metadata
/// matches what the operator uploaded, not a temp-file name.
pub async fn ingest_files(
    State(state): State<ApiState>,
    TypedMultipart(input): TypedMultipart<UploadParams>,
) -> Result<Json<Value>, ApiError> {
    info!(file_count = input.files.len(), "Received upload request");

    if input.files.is_empty() {
        return Ok(Json(json!({ "status": "No file uploaded." })));
    }

    let staging = tempfile::tempdir().map_err(common::error::AppError::from)?;

    // Staged names must stay unique within the request or a later upload
    // silently overwrites an earlier one sharing its file name.
    let mut seen = HashSet::new();
    let staged: Vec<_> = input
        .files
        .iter()
        .enumerate()
        .map(|(i, file)| {
            let name = file
                .metadata
                .file_name
                .as_deref()
                .map(sanitize_file_name)
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| format!("upload-{i}.txt"));
            let name = stage_name(name, i, &mut seen);
            (staging.path().join(name), file)
        })
        .collect();

    let paths = try_join_all(staged.into_iter().map(|(dest, file)| async move {
        tokio::fs::copy(file.contents.path(), &dest)
            .await
            .map_err(common::error::AppError::from)?;
        Ok::<_, common::error::AppError>(dest)
    }))
    .await?;

    let report = ingestion_pipeline::run(&state.store, &paths).await?;

    Ok(Json(json!({ "status": report.to_string() })))
}

/// Keeps only the final path component of a client-supplied file name.
fn sanitize_file_name(name: &str) -> String {
    name.rsplit(['/', '\\'])
        .next()
        .unwrap_or(name)
        .to_owned()
}

/// Returns `name` unchanged when it is new, otherwise a variant suffixed
/// with the upload's field index (bumped further on the rare double
/// collision) so every staged file keeps its own content.
fn stage_name(name: String, index: usize, seen: &mut HashSet<String>) -> String {
    if seen.insert(name.clone()) {
        return name;
    }

    let path = Path::new(&name);
    let stem = path
        .file_stem()
        .map_or_else(|| "upload".to_owned(), |s| s.to_string_lossy().into_owned());
    let extension = path.extension().map(|e| format!(".{}", e.to_string_lossy()));

    let mut suffix = index;
    loop {
        let candidate = match &extension {
            Some(ext) => format!("{stem}-{suffix}{ext}"),
            None => format!("{stem}-{suffix}"),
        };
        if seen.insert(candidate.clone()) {
            return candidate;
        }
        suffix += 1;
    }
}
