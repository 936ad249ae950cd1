//! Embedding and language model providers

pub mod embedding;
pub mod llm;
pub mod manager;
pub mod ollama;
pub mod sentence_transformers;


pub use embedding::EmbeddingProvider;
pub use llm::{GenerationOptions, LanguageModelProvider, OllamaLlm};
pub use manager::{load_embedding_model, EmbeddingBackend};
pub use ollama::OllamaEmbeddingModel;
pub use sentence_transformers::SentenceTransformersModel;
