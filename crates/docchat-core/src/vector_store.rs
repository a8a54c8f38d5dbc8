//! Vector store trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Chunk, Result};

/// A chunk returned from a similarity search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    /// Cosine similarity between the query and the chunk
    pub score: f32,
}

/// Configuration for diversity-aware vector search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Number of results returned
    pub k: usize,
    /// Size of the nearest-neighbour candidate pool re-ranked down to `k`
    pub fetch_k: usize,
    /// Relevance/diversity balance: 1.0 = pure relevance, 0.0 = pure diversity
    pub lambda_mult: f32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            k: 8,
            fetch_k: 18,
            lambda_mult: 0.5,
        }
    }
}

/// Trait for vector stores
///
/// Stores are built once and then only read; searching takes `&self` and needs no
/// locking when shared behind an `Arc`.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Search using a query embedding
    async fn search_by_vector(
        &self,
        vector: &[f32],
        config: &SearchConfig,
    ) -> Result<Vec<ScoredChunk>>;

    /// Dimension of the stored embeddings
    fn dimension(&self) -> usize;

    /// Get the total number of chunks
    fn count(&self) -> usize;
}
