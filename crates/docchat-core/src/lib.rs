//! Core traits and types for docchat
//!
//! This crate defines the fundamental traits and types used across the docchat system.
//! It provides capability-facing interfaces for generation providers, embedding providers,
//! vector stores and retrievers, so the indexing and serving sides can be tested with
//! in-process fakes and swapped between local and hosted backends.

pub mod llm;
pub mod embedding;
pub mod document;
pub mod vector_store;
pub mod rag;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use llm::{LLMProvider, GenerationConfig, GenerationResult};
pub use embedding::{Embedding, EmbeddingProvider};
pub use document::{
    SourceDocument, Section, Chunk, ChunkMetadata, ChunkingConfig, UnsectionedPolicy,
};
pub use vector_store::{VectorStore, ScoredChunk, SearchConfig};
pub use rag::{Retriever, RetrievalResult};
pub use types::*;
