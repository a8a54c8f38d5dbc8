//! Local embeddings using feature hashing
//!
//! Every lowercase word and word bigram is hashed into a fixed bucket with a sign, and
//! the resulting vector is L2-normalized. md5 is used for bucketing so vectors stay
//! identical across platforms and toolchain versions, which matters because the index
//! is persisted and queried by a different process.

use async_trait::async_trait;

use docchat_core::{Embedding, EmbeddingProvider, Error, Result};

/// Deterministic hashing embedder, no model download or network access needed
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
    model_id: String,
}

impl HashingEmbedder {
    pub const DEFAULT_DIMENSION: usize = 384;

    const BIGRAM_WEIGHT: f32 = 0.5;

    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(Error::Embedding("embedding dimension must be greater than zero".to_string()));
        }
        Ok(Self {
            dimension,
            model_id: format!("hashing-v1-{}", dimension),
        })
    }

    /// Embed synchronously; the async trait methods delegate here
    pub fn embed_text(&self, text: &str) -> Embedding {
        let tokens: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .collect();

        let mut vector = vec![0.0f32; self.dimension];

        for token in &tokens {
            let (idx, sign) = self.bucket(token);
            vector[idx] += sign;
        }

        for pair in tokens.windows(2) {
            let (idx, sign) = self.bucket(&format!("{} {}", pair[0], pair[1]));
            vector[idx] += sign * Self::BIGRAM_WEIGHT;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }

        vector
    }

    fn bucket(&self, feature: &str) -> (usize, f32) {
        let digest = md5::compute(feature.as_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest.0[..8]);
        let idx = (u64::from_le_bytes(head) % self.dimension as u64) as usize;
        let sign = if digest.0[8] & 1 == 0 { 1.0 } else { -1.0 };
        (idx, sign)
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self {
            dimension: Self::DEFAULT_DIMENSION,
            model_id: format!("hashing-v1-{}", Self::DEFAULT_DIMENSION),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        Ok(self.embed_text(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mmr::cosine_similarity;

    #[test]
    fn test_deterministic_and_normalized() {
        let embedder = HashingEmbedder::default();
        let a = embedder.embed_text("Everyone can contribute");
        let b = embedder.embed_text("Everyone can contribute");
        assert_eq!(a, b);
        assert_eq!(a.len(), 384);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_case_and_punctuation_insensitive() {
        let embedder = HashingEmbedder::default();
        let a = embedder.embed_text("Async communication!");
        let b = embedder.embed_text("async   COMMUNICATION");
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let embedder = HashingEmbedder::new(16).unwrap();
        assert!(embedder.embed_text("  ...  ").iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_overlapping_text_is_more_similar() {
        let embedder = HashingEmbedder::default();
        let query = embedder.embed_text("remote work and async communication");
        let related = embedder.embed_text("we favour async communication for remote work");
        let unrelated = embedder.embed_text("quarterly revenue targets for the sales team");
        assert!(cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated));
    }

    #[test]
    fn test_model_id_tracks_dimension() {
        let embedder = HashingEmbedder::new(64).unwrap();
        assert_eq!(embedder.model_id(), "hashing-v1-64");
        assert_eq!(embedder.dimension(), 64);
        assert!(HashingEmbedder::new(0).is_err());
    }
}
