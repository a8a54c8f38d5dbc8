//! Generation provider trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{Error, Result};
use super::types::RetryConfig;

/// Configuration for text generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub model_id: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    pub stop_sequences: Vec<String>,
    pub timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model_id: "gemini-1.5-flash".to_string(),
            max_tokens: 2048,
            temperature: Some(0.3),
            top_p: None,
            top_k: None,
            stop_sequences: Vec::new(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Result of a text generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub text: String,
    pub model_id: String,
    pub tokens_used: Option<u32>,
}

/// Trait for hosted generation models (e.g., Gemini)
///
/// The orchestrator and the conversation memory only ever see this trait, which keeps
/// them testable with scripted fakes.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate text using the model's default configuration
    async fn generate(&self, prompt: &str) -> Result<GenerationResult>;

    /// Generate text with custom configuration.
    ///
    /// Implementations must honor `config.timeout` and report expiry as
    /// [`Error::Timeout`].
    async fn generate_with_config(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult>;

    /// Generate with the given retry policy, sleeping between attempts.
    ///
    /// Only transient failures (timeouts, network errors) are retried.
    async fn generate_with_retry(
        &self,
        prompt: &str,
        config: &GenerationConfig,
        retry: &RetryConfig,
    ) -> Result<GenerationResult> {
        let attempts = retry.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.generate_with_config(prompt, config).await {
                Ok(result) => return Ok(result),
                Err(e @ (Error::Timeout(_) | Error::Network(_))) if attempt < attempts => {
                    tracing::warn!(attempt, error = %e, "generation attempt failed, retrying");
                    tokio::time::sleep(retry.delay_for(attempt)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Get the model ID being used
    fn model_id(&self) -> &str;
}
