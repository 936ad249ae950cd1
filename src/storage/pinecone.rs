//! Pinecone vector store client
//!
//! The control plane resolves an index name to its data-plane host and
//! dimension; similarity queries go to the data plane. Stored documents keep
//! their body under the `text` metadata key.

use crate::core::{Config, RagError, Result};
use crate::models::EmbeddingProvider;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const COMPONENT: &str = "vector store";
const API_VERSION: &str = "2024-07";
const TEXT_KEY: &str = "text";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub id: String,
    pub text: String,
    pub score: f32,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

#[async_trait]
pub trait VectorStoreClient: Send + Sync {
    async fn retrieve(&self, query_vector: &[f32], top_k: usize) -> Result<Vec<RetrievedDocument>>;
}

#[derive(Debug, Deserialize)]
struct IndexDescription {
    dimension: usize,
    host: String,
    #[serde(default)]
    status: Option<IndexStatus>,
}

#[derive(Debug, Deserialize)]
struct IndexStatus {
    ready: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
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
    metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

pub struct PineconeVectorStore {
    index_name: String,
    host: String,
    dimension: usize,
    api_key: String,
    client: reqwest::Client,
    embedding: Arc<dyn EmbeddingProvider>,
}

impl PineconeVectorStore {
    /// Opens `index_name`, checking that it exists, is ready, and matches the
    /// dimension of `embedding`.
    pub async fn connect(
        index_name: &str,
        embedding: Arc<dyn EmbeddingProvider>,
        config: &Config,
    ) -> Result<Self> {
        let api_key = config.vector_store.require_api_key()?.to_string();

        let client = reqwest::Client::builder()
            .timeout(config.models.timeout)
            .build()
            .map_err(|e| RagError::init(COMPONENT, format!("Failed to create HTTP client: {}", e)))?;

        let control_url = config.vector_store.control_url.trim_end_matches('/');
        let response = client
            .get(format!("{}/indexes/{}", control_url, index_name))
            .header("Api-Key", &api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .send()
            .await
            .map_err(|e| RagError::init(COMPONENT, format!(
                "Pinecone control plane is unreachable: {}", e
            )))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => {
                return Err(RagError::init(COMPONENT, format!(
                    "index \"{}\" does not exist", index_name
                )));
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                return Err(RagError::init(COMPONENT, format!(
                    "Pinecone returned {} for index \"{}\": {}", status, index_name, body
                )));
            }
        }

        let description: IndexDescription = response.json().await
            .map_err(|e| RagError::init(COMPONENT, format!("Failed to parse index description: {}", e)))?;

        if let Some(status) = &description.status {
            if !status.ready {
                return Err(RagError::init(COMPONENT, format!("index \"{}\" is not ready", index_name)));
            }
        }

        if description.dimension != embedding.dimension() {
            return Err(RagError::init(COMPONENT, format!(
                "index \"{}\" stores {}-dimensional vectors but {} produces {}",
                index_name,
                description.dimension,
                embedding.name(),
                embedding.dimension()
            )));
        }

        let host = config
            .vector_store
            .host
            .clone()
            .unwrap_or(description.host);

        tracing::info!("Connected to Pinecone index {} at {}", index_name, host);

        Ok(Self {
            index_name: index_name.to_string(),
            host: normalize_host(&host),
            dimension: description.dimension,
            api_key,
            client,
            embedding,
        })
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Embeds `query` with the store's own embedding model, then retrieves.
    pub async fn similarity_search(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedDocument>> {
        let vector = self.embedding.embed(query).await?;
        self.retrieve(&vector, top_k).await
    }
}

#[async_trait]
impl VectorStoreClient for PineconeVectorStore {
    async fn retrieve(&self, query_vector: &[f32], top_k: usize) -> Result<Vec<RetrievedDocument>> {
        if query_vector.len() != self.dimension {
            return Err(RagError::RetrievalError(format!(
                "query vector has {} dimensions, index \"{}\" expects {}",
                query_vector.len(),
                self.index_name,
                self.dimension
            )));
        }

        let request = QueryRequest {
            vector: query_vector,
            top_k,
            include_metadata: true,
            include_values: false,
        };

        let response = self.client
            .post(format!("{}/query", self.host))
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::RetrievalError(format!("Pinecone query failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::RetrievalError(format!(
                "Pinecone returned {}: {}", status, body
            )));
        }

        let result: QueryResponse = response.json().await
            .map_err(|e| RagError::RetrievalError(format!("Failed to parse query response: {}", e)))?;

        Ok(result.matches.into_iter().filter_map(into_document).collect())
    }
}

fn into_document(found: QueryMatch) -> Option<RetrievedDocument> {
    let mut metadata = found.metadata.unwrap_or_default();

    match metadata.remove(TEXT_KEY) {
        Some(serde_json::Value::String(text)) => Some(RetrievedDocument {
            id: found.id,
            text,
            score: found.score,
            metadata,
        }),
        _ => {
            tracing::warn!("Match {} has no `{}` metadata, skipping", found.id, TEXT_KEY);
            None
        }
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}
