//! SentenceTransformers models served by a HuggingFace text-embeddings-inference server
//!
//! Uses `GET /info` to confirm which model the server has loaded and
//! `POST /embed` for embedding generation.

use crate::core::{Config, RagError, Result};
use crate::models::embedding::{check_dimension, known_dimension};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const COMPONENT: &str = "embedding model";

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a str,
    normalize: bool,
}

#[derive(Debug, Deserialize)]
struct InfoResponse {
    model_id: String,
}

pub struct SentenceTransformersModel {
    name: String,
    base_url: String,
    dimension: usize,
    client: reqwest::Client,
}

impl SentenceTransformersModel {
    /// Connects to the inference server and confirms it serves `model_name`.
    pub async fn load(model_name: &str, config: &Config) -> Result<Self> {
        if model_name.trim().is_empty() {
            return Err(RagError::init(COMPONENT, "model identifier is empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(config.models.timeout)
            .build()
            .map_err(|e| RagError::init(COMPONENT, format!("Failed to create HTTP client: {}", e)))?;

        let base_url = config.models.embedding_url.trim_end_matches('/').to_string();

        let response = client
            .get(format!("{}/info", base_url))
            .send()
            .await
            .map_err(|e| RagError::init(COMPONENT, format!(
                "inference server at {} is unreachable: {}", base_url, e
            )))?;

        if !response.status().is_success() {
            return Err(RagError::init(COMPONENT, format!(
                "inference server returned {} for /info", response.status()
            )));
        }

        let info: InfoResponse = response.json().await
            .map_err(|e| RagError::init(COMPONENT, format!("Failed to parse /info response: {}", e)))?;

        if info.model_id != model_name {
            return Err(RagError::init(COMPONENT, format!(
                "inference server is serving \"{}\", expected \"{}\"", info.model_id, model_name
            )));
        }

        let mut model = Self {
            name: model_name.to_string(),
            base_url,
            dimension: 0,
            client,
        };

        model.dimension = match known_dimension(model_name) {
            Some(dimension) => dimension,
            None => {
                let sample = model.request_embedding("dimension check").await
                    .map_err(|e| RagError::init(COMPONENT, e.to_string()))?;
                sample.len()
            }
        };

        tracing::info!("Loaded embedding model {} ({} dimensions)", model.name, model.dimension);
        Ok(model)
    }

    async fn request_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbedRequest {
            inputs: text,
            normalize: true,
        };

        let response = self.client
            .post(format!("{}/embed", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::EmbeddingError(format!("Embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::EmbeddingError(format!(
                "Inference server returned {}: {}", status, body
            )));
        }

        let embeddings: Vec<Vec<f32>> = response.json().await
            .map_err(|e| RagError::EmbeddingError(format!("Failed to parse embedding response: {}", e)))?;

        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| RagError::EmbeddingError("No embedding generated".to_string()))
    }
}

#[async_trait]
impl crate::models::EmbeddingProvider for SentenceTransformersModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embedding = self.request_embedding(text).await?;
        check_dimension(&self.name, self.dimension, embedding)
    }
}
