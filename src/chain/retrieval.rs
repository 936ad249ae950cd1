//! Embed → retrieve → render → generate

use std::sync::Arc;

use crate::chain::PromptBuilder;
use crate::core::ChainError;
use crate::models::{EmbeddingProvider, LanguageModelProvider};
use crate::storage::{RetrievedDocument, VectorStoreClient};

pub const DEFAULT_TOP_K: usize = 4;
pub const DEFAULT_MAX_PROMPT_CHARS: usize = 32_000;

const DOCUMENT_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone)]
pub struct ChainAnswer {
    pub answer: String,
    pub sources: Vec<RetrievedDocument>,
}

pub struct RetrievalChain {
    embedding: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStoreClient>,
    llm: Arc<dyn LanguageModelProvider>,
    prompt: PromptBuilder,
    top_k: usize,
    max_prompt_chars: usize,
}

impl RetrievalChain {
    pub fn new(
        embedding: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStoreClient>,
        llm: Arc<dyn LanguageModelProvider>,
        prompt: PromptBuilder,
    ) -> Self {
        Self {
            embedding,
            vector_store,
            llm,
            prompt,
            top_k: DEFAULT_TOP_K,
            max_prompt_chars: DEFAULT_MAX_PROMPT_CHARS,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_max_prompt_chars(mut self, max_prompt_chars: usize) -> Self {
        self.max_prompt_chars = max_prompt_chars;
        self
    }

    pub async fn answer(&self, question: &str) -> Result<String, ChainError> {
        self.answer_with_sources(question).await.map(|result| result.answer)
    }

    /// Runs every step in order; the first failure ends the chain.
    pub async fn answer_with_sources(&self, question: &str) -> Result<ChainAnswer, ChainError> {
        let query_vector = self
            .embedding
            .embed(question)
            .await
            .map_err(ChainError::EmbedFailed)?;

        let sources = self
            .vector_store
            .retrieve(&query_vector, self.top_k)
            .await
            .map_err(ChainError::RetrieveFailed)?;
        tracing::debug!("Retrieved {} documents", sources.len());

        let context = join_context(&sources);
        let prompt = self.render(&context, question)?;

        let answer = self
            .llm
            .generate(&prompt)
            .await
            .map_err(ChainError::GenerateFailed)?;

        Ok(ChainAnswer { answer, sources })
    }

    fn render(&self, context: &str, question: &str) -> Result<String, ChainError> {
        let prompt = self.prompt.render(context, question);
        let chars = prompt.chars().count();
        if chars > self.max_prompt_chars {
            return Err(ChainError::RenderFailed(format!(
                "prompt is {} characters, limit is {}",
                chars, self.max_prompt_chars
            )));
        }
        Ok(prompt)
    }
}

fn join_context(documents: &[RetrievedDocument]) -> String {
    documents
        .iter()
        .map(|doc| doc.text.as_str())
        .collect::<Vec<_>>()
        .join(DOCUMENT_SEPARATOR)
}
