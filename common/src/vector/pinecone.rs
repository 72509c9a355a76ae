use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::{IndexRecord, ScoredRecord, VectorIndex};
use crate::{error::AppError, utils::config::AppConfig};

const CONTROL_PLANE_URL: &str = "https://api.pinecone.io";
const API_VERSION: &str = "2025-01";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Key under which the chunk text is stored in record metadata, so queries
/// can return it without a second lookup.
const TEXT_METADATA_KEY: &str = "text";

/// Client for a serverless Pinecone index. The index host and dimension are
/// resolved once and cached for the lifetime of the handle.
pub struct PineconeIndex {
    http: reqwest::Client,
    api_key: String,
    index_name: String,
    cloud: String,
    region: String,
    control_plane_url: String,
    description: OnceCell<IndexDescription>,
}

#[derive(Debug, Clone, Deserialize)]
struct IndexDescription {
    dimension: usize,
    host: String,
}

#[derive(Debug, Serialize)]
struct UpsertVector {
    id: String,
    values: Vec<f32>,
    metadata: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

impl PineconeIndex {
    pub fn new(
        api_key: String,
        index_name: String,
        cloud: String,
        region: String,
    ) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            api_key,
            index_name,
            cloud,
            region,
            control_plane_url: CONTROL_PLANE_URL.to_owned(),
            description: OnceCell::new(),
        })
    }

    /// Points the control-plane calls at a different base URL, for running
    /// against a local stand-in instead of the hosted service.
    pub fn with_control_plane(mut self, url: impl Into<String>) -> Self {
        self.control_plane_url = url.into();
        self
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Self::new(
            config.pinecone_api_key.clone(),
            config.pinecone_index_name.clone(),
            config.pinecone_cloud.clone(),
            config.pinecone_region.clone(),
        )
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-Api-Version", API_VERSION)
    }

    async fn fetch_description(&self) -> Result<Option<IndexDescription>, AppError> {
        let url = format!("{}/indexes/{}", self.control_plane_url, self.index_name);
        let response = self.request(reqwest::Method::GET, url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status(response).await?;

        Ok(Some(response.json().await?))
    }

    async fn create_index(&self, dimension: usize) -> Result<IndexDescription, AppError> {
        let url = format!("{}/indexes", self.control_plane_url);
        let body = json!({
            "name": self.index_name,
            "dimension": dimension,
            "metric": "cosine",
            "spec": {
                "serverless": {
                    "cloud": self.cloud,
                    "region": self.region,
                }
            }
        });

        let response = self
            .request(reqwest::Method::POST, url)
            .json(&body)
            .send()
            .await?;

        // A concurrent creator winning the race is still success.
        if response.status() == StatusCode::CONFLICT {
            return self.fetch_description().await?.ok_or_else(|| {
                AppError::VectorStore(format!(
                    "index '{}' reported as existing but cannot be described",
                    self.index_name
                ))
            });
        }

        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn description(&self) -> Result<&IndexDescription, AppError> {
        self.description
            .get_or_try_init(|| async {
                self.fetch_description().await?.ok_or_else(|| {
                    AppError::VectorStore(format!(
                        "index '{}' does not exist; run ensure_index first",
                        self.index_name
                    ))
                })
            })
            .await
    }

    async fn data_plane_url(&self, path: &str) -> Result<String, AppError> {
        let description = self.description().await?;
        let host = &description.host;
        // Serverless index hosts come back without a scheme.
        if host.contains("://") {
            Ok(format!("{host}{path}"))
        } else {
            Ok(format!("https://{host}{path}"))
        }
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn ensure_index(&self, dimension: usize) -> Result<(), AppError> {
        let description = match self.fetch_description().await? {
            Some(existing) => {
                if existing.dimension != dimension {
                    warn!(
                        index = %self.index_name,
                        existing = existing.dimension,
                        requested = dimension,
                        "Existing index dimension differs from the configured embedding model"
                    );
                }
                info!(index = %self.index_name, "Index already exists");
                existing
            }
            None => {
                info!(index = %self.index_name, dimension, "Creating index");
                self.create_index(dimension).await?
            }
        };

        self.description.set(description).ok();
        Ok(())
    }

    async fn dimension(&self) -> Result<usize, AppError> {
        Ok(self.description().await?.dimension)
    }

    async fn upsert(&self, records: Vec<IndexRecord>) -> Result<(), AppError> {
        if records.is_empty() {
            return Ok(());
        }

        let vectors: Vec<UpsertVector> = records
            .into_iter()
            .map(|record| {
                let mut metadata = record.metadata;
                metadata.insert(TEXT_METADATA_KEY.to_owned(), record.text);
                UpsertVector {
                    id: record.id,
                    values: record.values,
                    metadata,
                }
            })
            .collect();

        let url = self.data_plane_url("/vectors/upsert").await?;
        let response = self
            .request(reqwest::Method::POST, url)
            .json(&json!({ "vectors": vectors }))
            .send()
            .await?;
        check_status(response).await?;

        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredRecord>, AppError> {
        let url = self.data_plane_url("/query").await?;
        let response = self
            .request(reqwest::Method::POST, url)
            .json(&json!({
                "vector": vector,
                "topK": top_k,
                "includeMetadata": true,
            }))
            .send()
            .await?;
        let response = check_status(response).await?;

        let parsed: QueryResponse = response.json().await?;
        Ok(parsed
            .matches
            .into_iter()
            .map(|m| {
                let mut metadata = m.metadata;
                let text = metadata.remove(TEXT_METADATA_KEY).unwrap_or_default();
                ScoredRecord {
                    id: m.id,
                    score: m.score,
                    text,
                    metadata,
                }
            })
            .collect())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(AppError::VectorStore(format!(
        "vector store returned {status}: {body}"
    )))
}
