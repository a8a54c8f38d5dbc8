//! Gemini embedding client (`batchEmbedContents`)

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use docchat_core::{Embedding, EmbeddingProvider, Error, Result};

use crate::client::map_send_error;
use crate::config::GeminiConfig;

/// Maximum number of texts Gemini accepts in one batch request
const MAX_BATCH: usize = 100;
const IN_FLIGHT_BATCHES: usize = 4;

/// Hosted embedding provider backed by `text-embedding-004`
pub struct GeminiEmbedder {
    config: GeminiConfig,
    client: Client,
    model_id: String,
    dimension: usize,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct EmbedContent<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: String,
    content: EmbedContent<'a>,
}

#[derive(Debug, Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<EmbedRequest<'a>>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<EmbeddingValues>,
}

impl GeminiEmbedder {
    pub const DEFAULT_DIMENSION: usize = 768;

    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            model_id: config.embedding_model.clone(),
            config,
            client,
            dimension: Self::DEFAULT_DIMENSION,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(GeminiConfig::from_env()?)
    }

    /// Override the expected vector length (for models other than `text-embedding-004`)
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    #[cfg(test)]
    pub(crate) fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    async fn embed_one_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let url = self.config.endpoint(&self.model_id, "batchEmbedContents")?;
        let body = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| EmbedRequest {
                    model: format!("models/{}", self.model_id),
                    content: EmbedContent {
                        parts: vec![TextPart { text }],
                    },
                })
                .collect(),
        };

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_send_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Embedding(format!(
                "Gemini embedding request failed with status {}: {}",
                status, error_text
            )));
        }

        let parsed: BatchEmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        self.check_vectors(texts.len(), parsed.embeddings.into_iter().map(|e| e.values).collect())
    }

    fn check_vectors(&self, expected: usize, vectors: Vec<Embedding>) -> Result<Vec<Embedding>> {
        if vectors.len() != expected {
            return Err(Error::Embedding(format!(
                "Gemini returned {} embeddings for {} texts",
                vectors.len(),
                expected
            )));
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dimension) {
            return Err(Error::Embedding(format!(
                "expected {}-dimensional embeddings from {}, got {}",
                self.dimension,
                self.model_id,
                bad.len()
            )));
        }
        Ok(vectors)
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        let mut vectors = self.embed_one_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| Error::Embedding("Gemini returned no embedding".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        debug!(texts = texts.len(), model = %self.model_id, "Embedding batch");

        let requests: Vec<_> = texts
            .chunks(MAX_BATCH)
            .map(|batch| self.embed_one_batch(batch))
            .collect();

        let batches: Vec<Vec<Embedding>> = stream::iter(requests)
            .buffered(IN_FLIGHT_BATCHES)
            .try_collect()
            .await?;

        Ok(batches.into_iter().flatten().collect())
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
