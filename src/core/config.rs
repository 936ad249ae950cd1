//! Configuration for the RAG service

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::core::{RagError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub models: ModelConfig,
    pub vector_store: VectorStoreConfig,
    pub chain: ChainConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Session signing key. No route reads it.
    #[serde(skip_serializing)]
    pub secret_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub embedding_provider: String,
    pub embedding_model: String,
    pub embedding_url: String,
    pub llm_model: String,
    pub llm_temperature: f32,
    pub llm_num_gpu: i32,
    pub ollama_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    pub index_name: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub control_url: String,
    /// Data-plane host; resolved from the control plane when unset.
    pub host: Option<String>,
    pub top_k: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    pub prompt_template_path: Option<PathBuf>,
    pub max_prompt_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
                secret_key: None,
            },
            models: ModelConfig {
                embedding_provider: "sentence-transformers".to_string(),
                embedding_model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
                embedding_url: "http://localhost:8080".to_string(),
                llm_model: "llama3.1:8b".to_string(),
                llm_temperature: 0.8,
                llm_num_gpu: 1,
                ollama_url: "http://localhost:11434".to_string(),
                timeout: Duration::from_secs(120),
            },
            vector_store: VectorStoreConfig {
                index_name: "medical-chatbot".to_string(),
                api_key: None,
                control_url: "https://api.pinecone.io".to_string(),
                host: None,
                top_k: 4,
            },
            chain: ChainConfig {
                prompt_template_path: None,
                max_prompt_chars: 32_000,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from defaults overridden by whatever `lookup` returns.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("HOST") {
            config.server.host = host;
        }
        if let Some(port) = parse_var(&lookup, "PORT")? {
            config.server.port = port;
        }
        config.server.secret_key = lookup("SECRET_KEY");

        if let Some(provider) = lookup("EMBEDDING_PROVIDER") {
            config.models.embedding_provider = provider;
        }
        if let Some(model) = lookup("EMBEDDING_MODEL") {
            config.models.embedding_model = model;
        }
        if let Some(url) = lookup("EMBEDDING_URL") {
            config.models.embedding_url = url;
        }
        if let Some(model) = lookup("LLM_MODEL") {
            config.models.llm_model = model;
        }
        if let Some(temperature) = parse_var(&lookup, "LLM_TEMPERATURE")? {
            config.models.llm_temperature = temperature;
        }
        if let Some(num_gpu) = parse_var(&lookup, "LLM_NUM_GPU")? {
            config.models.llm_num_gpu = num_gpu;
        }
        if let Some(url) = lookup("OLLAMA_URL") {
            config.models.ollama_url = url;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "MODEL_TIMEOUT_SECS")? {
            config.models.timeout = Duration::from_secs(secs);
        }

        if let Some(index_name) = lookup("VECTOR_INDEX_NAME") {
            config.vector_store.index_name = index_name;
        }
        config.vector_store.api_key = lookup("PINECONE_API_KEY");
        if let Some(url) = lookup("PINECONE_CONTROL_URL") {
            config.vector_store.control_url = url;
        }
        config.vector_store.host = lookup("PINECONE_HOST");
        if let Some(top_k) = parse_var(&lookup, "RETRIEVAL_TOP_K")? {
            config.vector_store.top_k = top_k;
        }

        config.chain.prompt_template_path = lookup("PROMPT_TEMPLATE_PATH").map(PathBuf::from);
        if let Some(max) = parse_var(&lookup, "MAX_PROMPT_CHARS")? {
            config.chain.max_prompt_chars = max;
        }

        config.validate()?;
        Ok(config)
    }

    /// Range checks that do not need any backend. Model parameter ranges are
    /// enforced by the providers themselves.
    pub fn validate(&self) -> Result<()> {
        if self.vector_store.top_k == 0 {
            return Err(RagError::InvalidConfig(
                "RETRIEVAL_TOP_K must be at least 1".to_string(),
            ));
        }
        if self.vector_store.index_name.trim().is_empty() {
            return Err(RagError::InvalidConfig(
                "VECTOR_INDEX_NAME must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl VectorStoreConfig {
    /// The Pinecone API key, required before any index can be opened.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| RagError::InvalidConfig("PINECONE_API_KEY is not set".to_string()))
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| RagError::InvalidConfig(format!("{}={:?}: {}", key, raw, e))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_match_deployment() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.models.embedding_model, "sentence-transformers/all-MiniLM-L6-v2");
        assert_eq!(config.models.llm_model, "llama3.1:8b");
        assert!((config.models.llm_temperature - 0.8).abs() < f32::EPSILON);
        assert_eq!(config.models.llm_num_gpu, 1);
        assert_eq!(config.vector_store.index_name, "medical-chatbot");
        assert!(config.server.secret_key.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("PORT", "8000"),
            ("LLM_TEMPERATURE", "0.2"),
            ("LLM_NUM_GPU", "0"),
            ("VECTOR_INDEX_NAME", "cardiology"),
            ("SECRET_KEY", "s3cret"),
            ("RETRIEVAL_TOP_K", "8"),
        ]))
        .unwrap();

        assert_eq!(config.server.port, 8000);
        assert!((config.models.llm_temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.models.llm_num_gpu, 0);
        assert_eq!(config.vector_store.index_name, "cardiology");
        assert_eq!(config.server.secret_key.as_deref(), Some("s3cret"));
        assert_eq!(config.vector_store.top_k, 8);
    }

    #[test]
    fn test_unparseable_number_is_invalid_config() {
        let result = Config::from_lookup(lookup_from(&[("LLM_NUM_GPU", "two")]));
        assert!(matches!(result, Err(RagError::InvalidConfig(msg)) if msg.contains("LLM_NUM_GPU")));
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let result = Config::from_lookup(lookup_from(&[("RETRIEVAL_TOP_K", "0")]));
        assert!(matches!(result, Err(RagError::InvalidConfig(_))));
    }

    #[test]
    fn test_secrets_not_serialized() {
        let config = Config::from_lookup(lookup_from(&[
            ("SECRET_KEY", "s3cret"),
            ("PINECONE_API_KEY", "pc-key"),
        ]))
        .unwrap();

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("s3cret"));
        assert!(!json.contains("pc-key"));
    }

    #[test]
    fn test_require_api_key() {
        let config = Config::from_lookup(lookup_from(&[("PINECONE_API_KEY", " pc-key ")])).unwrap();
        assert_eq!(config.vector_store.require_api_key().unwrap(), "pc-key");

        for pairs in [&[][..], &[("PINECONE_API_KEY", "   ")][..]] {
            let config = Config::from_lookup(lookup_from(pairs)).unwrap();
            assert!(matches!(
                config.vector_store.require_api_key(),
                Err(RagError::InvalidConfig(msg)) if msg.contains("PINECONE_API_KEY")
            ));
        }
    }
}
