use async_openai::error::OpenAIError;
use thiserror::Error;
use tokio::task::JoinError;

// Core internal errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("OpenAI error: {0}")]
    OpenAI(#[from] OpenAIError),
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("Vector store error: {0}")]
    VectorStore(String),
    #[error("Embedding dimension mismatch: index expects {expected}, provider produced {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("Ingestion failed after {written} record(s) were written: {message}")]
    Ingestion { written: usize, message: String },
    #[error("Query error: {0}")]
    Query(String),
    #[error("IoError: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    Join(#[from] JoinError),
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

impl AppError {
    /// Number of index records durably written before an ingestion failure.
    pub fn records_written(&self) -> Option<usize> {
        match self {
            Self::Ingestion { written, .. } => Some(*written),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingestion_error_reports_partial_progress() {
        let err = AppError::Ingestion {
            written: 7,
            message: "upsert rejected".into(),
        };
        assert_eq!(err.records_written(), Some(7));
        assert!(err.to_string().contains("7 record(s)"));
    }

    #[test]
    fn dimension_mismatch_names_both_dimensions() {
        let err = AppError::DimensionMismatch {
            expected: 1536,
            actual: 768,
        };
        let rendered = err.to_string();
        assert!(rendered.contains("1536"));
        assert!(rendered.contains("768"));
        assert_eq!(err.records_written(), None);
    }
}
