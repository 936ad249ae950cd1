//! Ollama model integration via HTTP API
//!
//! Connects to a local or remote Ollama server. Embeddings use the
//! `/api/embeddings` endpoint; `/api/show` confirms a model is pulled.

use crate::core::{Config, RagError, Result};
use crate::models::embedding::{check_dimension, known_dimension};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Request body for Ollama embeddings API
#[derive(Debug, Serialize)]
struct OllamaEmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

/// Response from Ollama embeddings API
#[derive(Debug, Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct OllamaShowRequest<'a> {
    model: &'a str,
}

/// Fails with `InitError` unless the Ollama server at `base_url` has `model` pulled.
pub(crate) async fn ensure_model_available(
    client: &reqwest::Client,
    base_url: &str,
    model: &str,
    component: &'static str,
) -> Result<()> {
    let response = client
        .post(format!("{}/api/show", base_url))
        .json(&OllamaShowRequest { model })
        .send()
        .await
        .map_err(|e| RagError::init(component, format!(
            "Ollama at {} is unreachable: {}", base_url, e
        )))?;

    match response.status() {
        status if status.is_success() => Ok(()),
        StatusCode::NOT_FOUND => Err(RagError::init(component, format!(
            "model \"{}\" is not available on {}", model, base_url
        ))),
        status => {
            let body = response.text().await.unwrap_or_default();
            Err(RagError::init(component, format!(
                "Ollama returned {} while loading \"{}\": {}", status, model, body
            )))
        }
    }
}

pub struct OllamaEmbeddingModel {
    name: String,
    ollama_url: String,
    dimension: usize,
    client: reqwest::Client,
}

impl OllamaEmbeddingModel {
    pub async fn load(model_name: &str, config: &Config) -> Result<Self> {
        const COMPONENT: &str = "embedding model";

        let client = reqwest::Client::builder()
            .timeout(config.models.timeout)
            .build()
            .map_err(|e| RagError::init(COMPONENT, format!("Failed to create HTTP client: {}", e)))?;

        let ollama_url = config.models.ollama_url.trim_end_matches('/').to_string();
        ensure_model_available(&client, &ollama_url, model_name, COMPONENT).await?;

        let mut model = Self {
            name: model_name.to_string(),
            ollama_url,
            dimension: 0,
            client,
        };

        model.dimension = match known_dimension(model_name) {
            Some(dimension) => dimension,
            None => model.request_embedding("dimension check").await
                .map_err(|e| RagError::init(COMPONENT, e.to_string()))?
                .len(),
        };

        tracing::info!("Loaded Ollama embedding model {} ({} dimensions)", model.name, model.dimension);
        Ok(model)
    }

    async fn request_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let request = OllamaEmbeddingRequest {
            model: &self.name,
            prompt: text,
        };

        let response = self.client
            .post(format!("{}/api/embeddings", self.ollama_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::EmbeddingError(format!(
                "Ollama request failed: {}", e
            )))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::EmbeddingError(format!(
                "Ollama returned {}: {}", status, body
            )));
        }

        let result: OllamaEmbeddingResponse = response.json().await
            .map_err(|e| RagError::EmbeddingError(format!(
                "Failed to parse Ollama response: {}", e
            )))?;

        Ok(result.embedding)
    }
}

#[async_trait]
impl crate::models::EmbeddingProvider for OllamaEmbeddingModel {
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
