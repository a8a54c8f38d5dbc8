//! Gemini configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use url::Url;

use docchat_core::{Error, Result};

/// Message shown when no API key can be found; the chat binary prints it verbatim.
pub const MISSING_API_KEY: &str =
    "Google API Key not found. Please add it to your environment or .env file.";

/// Configuration for the Gemini clients
#[derive(Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Never serialized, so dumping a config cannot leak the key
    #[serde(skip_serializing, default)]
    pub api_key: String,
    pub api_url: String,
    pub model_id: String,
    pub embedding_model: String,
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("model_id", &self.model_id)
            .field("embedding_model", &self.embedding_model)
            .finish()
    }
}

impl GeminiConfig {
    pub const DEFAULT_API_URL: &'static str = "https://generativelanguage.googleapis.com";
    pub const DEFAULT_MODEL: &'static str = "gemini-1.5-flash";
    pub const DEFAULT_EMBEDDING_MODEL: &'static str = "text-embedding-004";

    /// Create configuration from environment variables (and `.env`, if present)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_key = present("GOOGLE_API_KEY")
            .ok_or_else(|| Error::StartupConfig(MISSING_API_KEY.to_string()))?;

        let api_url = present("GEMINI_API_URL").unwrap_or_else(|| Self::DEFAULT_API_URL.to_string());
        Url::parse(&api_url).map_err(|e| {
            Error::StartupConfig(format!("GEMINI_API_URL '{}' is not a valid URL: {}", api_url, e))
        })?;

        Ok(Self {
            api_key,
            api_url,
            model_id: present("GEMINI_MODEL").unwrap_or_else(|| Self::DEFAULT_MODEL.to_string()),
            embedding_model: present("GEMINI_EMBEDDING_MODEL")
                .unwrap_or_else(|| Self::DEFAULT_EMBEDDING_MODEL.to_string()),
        })
    }

    /// Create configuration with explicit values
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: Self::DEFAULT_API_URL.to_string(),
            model_id: Self::DEFAULT_MODEL.to_string(),
            embedding_model: Self::DEFAULT_EMBEDDING_MODEL.to_string(),
        }
    }

    /// `{api_url}/v1beta/models/{model}:{method}`
    pub fn endpoint(&self, model: &str, method: &str) -> Result<Url> {
        let base = Url::parse(&self.api_url)
            .map_err(|e| Error::StartupConfig(format!("invalid Gemini API URL: {}", e)))?;
        base.join(&format!("v1beta/models/{}:{}", model, method))
            .map_err(|e| Error::StartupConfig(format!("invalid Gemini endpoint: {}", e)))
    }
}
