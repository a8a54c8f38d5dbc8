//! Embedding provider trait

use async_trait::async_trait;

use crate::Result;

/// Embedding vector
pub type Embedding = Vec<f32>;

/// Trait for text embedding models (local or hosted)
///
/// The same provider and model version must be used to build an index and to embed
/// queries against it. [`EmbeddingProvider::model_id`] and
/// [`EmbeddingProvider::dimension`] are recorded in the index manifest and checked
/// when the index is loaded.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Embedding>;

    /// Embed several texts, preserving input order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Identifier of the model (and version) producing the vectors
    fn model_id(&self) -> &str;

    /// Length of every vector this provider returns
    fn dimension(&self) -> usize;
}
