//! Embedding client for generating vector representations
//!
//! Talks to an Ollama-compatible `/api/embeddings` endpoint.

use async_trait::async_trait;
use reqwest::Client;
use semsearch_core::{EmbeddingConfig, Result, SemsearchError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// Embedding Trait
// ============================================================================

/// Trait for embedding generation
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Model used for embeddings
    fn model(&self) -> &str;
}

// ============================================================================
// Ollama Embedding Client
// ============================================================================

/// Ollama embedding API client
pub struct OllamaEmbedding {
    client: Client,
    base_url: String,
    model: String,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaEmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    options: &'a OllamaOptions,
}

#[derive(Debug, Clone, Default, Serialize)]
struct OllamaOptions {
    embedding: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    use_mmap: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_thread: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_gpu: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

impl OllamaEmbedding {
    /// Create a new Ollama embedding client
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            options: OllamaOptions {
                embedding: true,
                ..Default::default()
            },
        }
    }

    /// Create from config
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SemsearchError::ConfigError(format!("Invalid HTTP client: {e}")))?;

        let mut embedding = Self::new(config.base_url.clone(), config.model.clone());
        embedding.client = client;
        embedding.options.use_mmap = config.use_mmap;
        embedding.options.num_thread = config.num_thread;
        embedding.options.num_gpu = config.num_gpu;
        Ok(embedding)
    }

    fn endpoint(&self) -> String {
        format!("{}/api/embeddings", self.base_url)
    }
}

#[async_trait]
impl EmbeddingClient for OllamaEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = OllamaEmbeddingRequest {
            model: &self.model,
            prompt: text,
            options: &self.options,
        };

        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                SemsearchError::EmbeddingError(format!("Ollama embedding request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SemsearchError::EmbeddingError(format!(
                "Ollama embedding error ({status}): {error_text}"
            )));
        }

        let result: OllamaEmbeddingResponse = response.json().await.map_err(|e| {
            SemsearchError::EmbeddingError(format!("Failed to parse embedding response: {e}"))
        })?;

        if result.embedding.is_empty() {
            return Err(SemsearchError::EmbeddingError(format!(
                "Model {} returned an empty embedding",
                self.model
            )));
        }

        tracing::trace!(dimension = result.embedding.len(), "embedding generated");
        Ok(result.embedding)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// Tests
// ============================================================================
