//! Retriever trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Result, ScoredChunk};

/// Ordered passages returned for a query, each with its provenance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub query: String,
    pub chunks: Vec<ScoredChunk>,
}

impl RetrievalResult {
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }
}

/// Trait for retrievers: a vector store wrapped with a fixed search policy
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Retrieve relevant passages for a question
    async fn retrieve(&self, query: &str) -> Result<RetrievalResult>;
}
