//! Core functionality for the RAG service

pub mod config;
pub mod error;

pub use config::{ChainConfig, Config, ModelConfig, ServerConfig, VectorStoreConfig};
pub use error::{ChainError, RagError, Result};
