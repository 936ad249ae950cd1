//! Startup loading of the configured models

use crate::core::{Config, RagError, Result};
use crate::models::{EmbeddingProvider, OllamaEmbeddingModel, SentenceTransformersModel};
use std::sync::Arc;

/// Embedding backends selectable through `EMBEDDING_PROVIDER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingBackend {
    SentenceTransformers,
    Ollama,
}

impl std::str::FromStr for EmbeddingBackend {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sentence-transformers" | "huggingface" | "tei" => Ok(Self::SentenceTransformers),
            "ollama" => Ok(Self::Ollama),
            other => Err(RagError::InvalidConfig(format!(
                "Unknown embedding provider \"{}\"", other
            ))),
        }
    }
}

pub async fn load_embedding_model(
    backend: EmbeddingBackend,
    config: &Config,
) -> Result<Arc<dyn EmbeddingProvider>> {
    let model_name = &config.models.embedding_model;

    let model: Arc<dyn EmbeddingProvider> = match backend {
        EmbeddingBackend::SentenceTransformers => {
            Arc::new(SentenceTransformersModel::load(model_name, config).await?)
        }
        EmbeddingBackend::Ollama => Arc::new(OllamaEmbeddingModel::load(model_name, config).await?),
    };

    Ok(model)
}
