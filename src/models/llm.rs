//! Generative language models

use crate::core::{Config, RagError, Result};
use crate::models::ollama::ensure_model_available;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

const COMPONENT: &str = "language model";

pub const TEMPERATURE_RANGE: RangeInclusive<f32> = 0.0..=2.0;

#[async_trait]
pub trait LanguageModelProvider: Send + Sync {
    fn name(&self) -> &str;
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Sampling parameters passed with every generation request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub num_gpu: i32,
}

impl GenerationOptions {
    /// Temperature must lie in `[0.0, 2.0]` and the GPU count must be non-negative.
    pub fn new(temperature: f32, num_gpu: i32) -> Result<Self> {
        if !TEMPERATURE_RANGE.contains(&temperature) {
            return Err(RagError::InvalidConfig(format!(
                "Temperature must be between 0 and 2 (got {})", temperature
            )));
        }
        if num_gpu < 0 {
            return Err(RagError::InvalidConfig(format!(
                "Number of GPUs must be non-negative (got {})", num_gpu
            )));
        }
        Ok(Self { temperature, num_gpu })
    }
}

#[derive(Debug, Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerationOptions,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

pub struct OllamaLlm {
    name: String,
    ollama_url: String,
    options: GenerationOptions,
    client: reqwest::Client,
}

impl OllamaLlm {
    /// Validates parameters and prepares the client. Makes no network calls.
    pub fn new(model_name: &str, temperature: f32, num_gpu: i32, config: &Config) -> Result<Self> {
        let options = GenerationOptions::new(temperature, num_gpu)?;

        if model_name.trim().is_empty() {
            return Err(RagError::InvalidConfig("LLM model identifier is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.models.timeout)
            .build()
            .map_err(|e| RagError::init(COMPONENT, format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            name: model_name.to_string(),
            ollama_url: config.models.ollama_url.trim_end_matches('/').to_string(),
            options,
            client,
        })
    }

    /// Builds the model and confirms the Ollama server can serve it.
    pub async fn load(model_name: &str, temperature: f32, num_gpu: i32, config: &Config) -> Result<Self> {
        let llm = Self::new(model_name, temperature, num_gpu, config)?;
        llm.ensure_loaded().await?;
        Ok(llm)
    }

    /// Confirms with `/api/show` that the model has been pulled.
    pub async fn ensure_loaded(&self) -> Result<()> {
        ensure_model_available(&self.client, &self.ollama_url, &self.name, COMPONENT).await?;

        tracing::info!(
            "Loaded LLM {} (temperature {}, {} GPU)",
            self.name, self.options.temperature, self.options.num_gpu
        );
        Ok(())
    }
}

#[async_trait]
impl LanguageModelProvider for OllamaLlm {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = OllamaGenerateRequest {
            model: &self.name,
            prompt,
            stream: false,
            options: self.options,
        };

        let response = self.client
            .post(format!("{}/api/generate", self.ollama_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::GenerationError(format!("Ollama request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::GenerationError(format!(
                "Ollama returned {}: {}", status, body
            )));
        }

        let result: OllamaGenerateResponse = response.json().await
            .map_err(|e| RagError::GenerationError(format!(
                "Failed to parse Ollama response: {}", e
            )))?;

        let text = result.response.trim();
        if text.is_empty() {
            return Err(RagError::GenerationError("Model returned an empty completion".to_string()));
        }

        Ok(text.to_string())
    }
}
