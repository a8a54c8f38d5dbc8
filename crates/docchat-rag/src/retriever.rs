//! MMR retriever: embeds the query and runs a fixed diversity-aware search policy

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use docchat_core::{
    EmbeddingProvider, Error, Result, RetrievalResult, Retriever, SearchConfig, VectorStore,
};

/// Retriever over a shared, read-only vector store
pub struct MmrRetriever<E: EmbeddingProvider + ?Sized, V: VectorStore> {
    embedder: Arc<E>,
    store: Arc<V>,
    config: SearchConfig,
}

impl<E: EmbeddingProvider + ?Sized, V: VectorStore> MmrRetriever<E, V> {
    /// Create a retriever with the default policy (k = 8, fetch_k = 18)
    pub fn new(embedder: Arc<E>, store: Arc<V>) -> Self {
        Self::with_config(embedder, store, SearchConfig::default())
    }

    pub fn with_config(embedder: Arc<E>, store: Arc<V>, config: SearchConfig) -> Self {
        Self {
            embedder,
            store,
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }
}

#[async_trait]
impl<E: EmbeddingProvider + ?Sized + 'static, V: VectorStore + 'static> Retriever for MmrRetriever<E, V> {
    async fn retrieve(&self, query: &str) -> Result<RetrievalResult> {
        if query.trim().is_empty() {
            return Err(Error::InvalidInput("query must not be empty".to_string()));
        }

        let vector = self.embedder.embed(query).await?;
        let chunks = self.store.search_by_vector(&vector, &self.config).await?;

        debug!(
            k = self.config.k,
            fetch_k = self.config.fetch_k,
            results = chunks.len(),
            "Retrieved passages"
        );

        Ok(RetrievalResult {
            query: query.to_string(),
            chunks,
        })
    }
}
