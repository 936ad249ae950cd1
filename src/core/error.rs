//! Error types for the RAG service

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to initialize {component}: {message}")]
    InitError {
        component: &'static str,
        message: String,
    },

    #[error("Failed to generate embedding: {0}")]
    EmbeddingError(String),

    #[error("Failed to retrieve documents: {0}")]
    RetrievalError(String),

    #[error("Failed to generate completion: {0}")]
    GenerationError(String),
}

impl RagError {
    pub fn init(component: &'static str, message: impl Into<String>) -> Self {
        Self::InitError {
            component,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RagError>;

/// Failure of one step of the retrieval chain.
///
/// Each variant names the step that failed so callers can report it without
/// inspecting the underlying cause.
#[derive(Error, Debug)]
pub enum ChainError {
    #[error("embedding step failed: {0}")]
    EmbedFailed(#[source] RagError),

    #[error("retrieval step failed: {0}")]
    RetrieveFailed(#[source] RagError),

    #[error("prompt rendering failed: {0}")]
    RenderFailed(String),

    #[error("generation step failed: {0}")]
    GenerateFailed(#[source] RagError),
}

impl ChainError {
    /// Stable machine-readable code, safe to show to end users.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmbedFailed(_) => "embed_failed",
            Self::RetrieveFailed(_) => "retrieve_failed",
            Self::RenderFailed(_) => "render_failed",
            Self::GenerateFailed(_) => "generate_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_error_codes_are_distinct() {
        let errors = [
            ChainError::EmbedFailed(RagError::EmbeddingError("x".into())),
            ChainError::RetrieveFailed(RagError::RetrievalError("x".into())),
            ChainError::RenderFailed("x".into()),
            ChainError::GenerateFailed(RagError::GenerationError("x".into())),
        ];

        let mut codes: Vec<&str> = errors.iter().map(ChainError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 4);
    }

    #[test]
    fn test_init_error_display() {
        let err = RagError::init("vector store", "index \"missing\" does not exist");
        assert_eq!(
            err.to_string(),
            "Failed to initialize vector store: index \"missing\" does not exist"
        );
    }
}
