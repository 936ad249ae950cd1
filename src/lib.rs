//! Medi-Bot RAG Service Library
//!
//! Answers questions over HTTP by running them through a retrieval-augmented
//! generation chain: a sentence embedding model, a Pinecone index, a prompt
//! template and an Ollama-served language model.

pub mod api;
pub mod chain;
pub mod core;
pub mod models;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;


use std::sync::Arc;

use crate::chain::{PromptBuilder, RetrievalChain};
use crate::core::{Config, Result};
use crate::models::{load_embedding_model, EmbeddingBackend, OllamaLlm};
use crate::storage::PineconeVectorStore;

// Application state for Axum
#[derive(Clone)]
pub struct AppState {
    pub chain: Arc<RetrievalChain>,
}

pub struct RagService {
    pub config: Config,
    pub chain: Arc<RetrievalChain>,
}

impl RagService {
    /// Loads every dependency of the chain. Any failure aborts construction;
    /// there is no partially initialized service.
    ///
    /// Settings that can be checked locally are checked before the first
    /// request to a backend, so they always surface as `InvalidConfig`.
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let backend: EmbeddingBackend = config.models.embedding_provider.parse()?;
        let llm = OllamaLlm::new(
            &config.models.llm_model,
            config.models.llm_temperature,
            config.models.llm_num_gpu,
            &config,
        )?;
        config.vector_store.require_api_key()?;

        let prompt = match &config.chain.prompt_template_path {
            Some(path) => PromptBuilder::from_file(path)?,
            None => PromptBuilder::builtin()?,
        };
        tracing::info!("Using prompt template {}", prompt.version());

        let embedding = load_embedding_model(backend, &config).await?;
        llm.ensure_loaded().await?;
        let vector_store = Arc::new(
            PineconeVectorStore::connect(&config.vector_store.index_name, embedding.clone(), &config)
                .await?,
        );

        let chain = RetrievalChain::new(embedding, vector_store, Arc::new(llm), prompt)
            .with_top_k(config.vector_store.top_k)
            .with_max_prompt_chars(config.chain.max_prompt_chars);

        Ok(Self {
            config,
            chain: Arc::new(chain),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            chain: self.chain.clone(),
        }
    }
}
