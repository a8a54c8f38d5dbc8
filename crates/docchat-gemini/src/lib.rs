//! Google Gemini integration for docchat
//!
//! This crate provides the hosted implementations of the `LLMProvider` and
//! `EmbeddingProvider` traits.

mod client;
mod config;
mod embedder;

#[cfg(test)]
mod tests;

pub use client::GeminiClient;
pub use config::{GeminiConfig, MISSING_API_KEY};
pub use embedder::GeminiEmbedder;

// Re-export core types for convenience
pub use docchat_core::{
    EmbeddingProvider, LLMProvider, GenerationConfig, GenerationResult,
    RetryConfig, Error, Result,
};
