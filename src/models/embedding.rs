//! Embedding provider contract

use crate::core::{RagError, Result};
use async_trait::async_trait;

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    fn name(&self) -> &str;
    fn dimension(&self) -> usize;
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Output sizes of the embedding models we know about.
pub fn known_dimension(model_name: &str) -> Option<usize> {
    let bare = model_name
        .strip_prefix("sentence-transformers/")
        .unwrap_or(model_name);

    match bare {
        "all-MiniLM-L6-v2" | "all-MiniLM-L12-v2" => Some(384),
        "paraphrase-multilingual-MiniLM-L12-v2" => Some(384),
        "all-mpnet-base-v2" | "multi-qa-mpnet-base-dot-v1" => Some(768),
        "nomic-embed-text" => Some(768),
        "mxbai-embed-large" | "snowflake-arctic-embed" => Some(1024),
        "all-minilm" => Some(384),
        _ => None,
    }
}

/// Rejects vectors whose length differs from what the model advertises.
pub(crate) fn check_dimension(model: &str, expected: usize, embedding: Vec<f32>) -> Result<Vec<f32>> {
    if embedding.len() != expected {
        return Err(RagError::EmbeddingError(format!(
            "{} returned a {}-dimensional vector, expected {}",
            model,
            embedding.len(),
            expected
        )));
    }
    Ok(embedding)
}
