//! Chat settings from environment variables

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use docchat_core::{Error, GenerationConfig, Result, RetryConfig, SearchConfig};
use docchat_gemini::GeminiConfig;

use crate::memory::MemoryConfig;
use crate::orchestrator::OrchestratorConfig;

/// Which embedding provider builds and queries the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum EmbedderKind {
    /// Local feature hashing, no network access
    #[default]
    Hashing,
    /// Google `text-embedding-004`
    Gemini,
}

impl FromStr for EmbedderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hashing" => Ok(Self::Hashing),
            "gemini" => Ok(Self::Gemini),
            other => Err(Error::StartupConfig(format!(
                "unknown embedder '{}', expected 'hashing' or 'gemini'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSettings {
    pub index_dir: PathBuf,
    pub retrieval: SearchConfig,
    pub memory: MemoryConfig,
    pub generation_timeout: Duration,
    pub temperature: f32,
    pub retry: RetryConfig,
    pub condense_followups: bool,
    pub embedder: EmbedderKind,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            index_dir: PathBuf::from("data/vector_index"),
            retrieval: SearchConfig::default(),
            memory: MemoryConfig::default(),
            generation_timeout: Duration::from_secs(60),
            temperature: 0.3,
            retry: RetryConfig::default(),
            condense_followups: false,
            embedder: EmbedderKind::default(),
        }
    }
}

impl ChatSettings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = get("DOCCHAT_INDEX_DIR") {
            settings.index_dir = PathBuf::from(dir);
        }
        if let Some(attempts) = get("DOCCHAT_GENERATION_ATTEMPTS") {
            settings.retry.max_attempts = parse("DOCCHAT_GENERATION_ATTEMPTS", &attempts)?;
            if settings.retry.max_attempts == 0 {
                return Err(Error::StartupConfig(
                    "DOCCHAT_GENERATION_ATTEMPTS must be at least 1".to_string(),
                ));
            }
        }
        if let Some(secs) = get("DOCCHAT_GENERATION_TIMEOUT_SECS") {
            settings.generation_timeout =
                Duration::from_secs(parse("DOCCHAT_GENERATION_TIMEOUT_SECS", &secs)?);
        }
        if let Some(max) = get("DOCCHAT_MEMORY_MAX_CHARS") {
            settings.memory.max_chars = parse("DOCCHAT_MEMORY_MAX_CHARS", &max)?;
        }
        if let Some(flag) = get("DOCCHAT_CONDENSE_FOLLOWUPS") {
            settings.condense_followups = parse("DOCCHAT_CONDENSE_FOLLOWUPS", &flag)?;
        }
        if let Some(kind) = get("DOCCHAT_EMBEDDER") {
            settings.embedder = kind.parse()?;
        }

        Ok(settings)
    }

    /// Orchestrator configuration for the given generation model
    pub fn orchestrator_config(&self, model_id: &str) -> OrchestratorConfig {
        OrchestratorConfig {
            generation: GenerationConfig {
                model_id: model_id.to_string(),
                temperature: Some(self.temperature),
                timeout: self.generation_timeout,
                ..Default::default()
            },
            retry: self.retry.clone(),
            condense_followups: self.condense_followups,
        }
    }
}

/// Resolve everything the chat binary needs before touching the index.
///
/// The API key is checked first so a missing credential is reported on its own.
pub fn startup_config<F>(lookup: F) -> Result<(GeminiConfig, ChatSettings)>
where
    F: Fn(&str) -> Option<String>,
{
    let gemini = GeminiConfig::from_lookup(&lookup)?;
    let settings = ChatSettings::from_lookup(&lookup)?;
    Ok((gemini, settings))
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::StartupConfig(format!("{} has invalid value '{}': {}", key, value, e)))
}
