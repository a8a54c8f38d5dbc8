//! Index builder: documents → chunks → embeddings → flat index

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use docchat_core::{EmbeddingProvider, Error, Result, SourceDocument};

use crate::chunker::CorpusChunker;
use crate::index::FlatIndex;

/// Result of an index build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    /// Chunk counts per source label, in input order
    pub chunks_per_source: Vec<(String, usize)>,
    pub total_chunks: usize,
    pub embedding_model: String,
    pub dimension: usize,
}

/// Builds a complete index in one shot; any failure aborts the whole build
pub struct IndexBuilder<E: EmbeddingProvider + ?Sized> {
    chunker: CorpusChunker,
    embedder: Arc<E>,
    batch_size: usize,
}

impl<E: EmbeddingProvider + ?Sized> IndexBuilder<E> {
    pub fn new(chunker: CorpusChunker, embedder: Arc<E>) -> Self {
        Self {
            chunker,
            embedder,
            batch_size: 64,
        }
    }

    /// Number of chunks sent to the embedder per call
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Chunk and embed every document into a new index
    pub async fn build(&self, documents: &[SourceDocument]) -> Result<(FlatIndex, BuildReport)> {
        let mut chunks = Vec::new();
        let mut chunks_per_source = Vec::with_capacity(documents.len());

        for document in documents {
            let document_chunks = self.chunker.chunk(document)?;
            info!(source = %document.label, chunks = document_chunks.len(), "Chunked source");
            chunks_per_source.push((document.label.clone(), document_chunks.len()));
            chunks.extend(document_chunks);
        }

        let mut embeddings = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let vectors = self.embedder.embed_batch(&texts).await?;
            if vectors.len() != texts.len() {
                return Err(Error::Embedding(format!(
                    "embedder returned {} vectors for {} texts",
                    vectors.len(),
                    texts.len()
                )));
            }
            embeddings.extend(vectors);
        }

        let index = FlatIndex::build(chunks, embeddings, self.embedder.model_id())?;
        if index.manifest().dimension != self.embedder.dimension() {
            return Err(Error::Embedding(format!(
                "embedder '{}' declares dimension {} but produced {}",
                self.embedder.model_id(),
                self.embedder.dimension(),
                index.manifest().dimension
            )));
        }

        let report = BuildReport {
            chunks_per_source,
            total_chunks: index.len(),
            embedding_model: index.manifest().embedding_model.clone(),
            dimension: index.manifest().dimension,
        };

        Ok((index, report))
    }

    /// Build and persist; nothing is written unless the whole build succeeded
    pub async fn build_and_save(&self, documents: &[SourceDocument], dir: &Path) -> Result<BuildReport> {
        let (index, report) = self.build(documents).await?;
        index.save(dir)?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HashingEmbedder;
    use docchat_core::ChunkingConfig;
    use tempfile::TempDir;

    fn builder() -> IndexBuilder<HashingEmbedder> {
        IndexBuilder::new(
            CorpusChunker::new(ChunkingConfig::default()).unwrap(),
            Arc::new(HashingEmbedder::default()),
        )
        .with_batch_size(2)
    }

    #[tokio::test]
    async fn test_build_reports_per_source_counts() {
        let docs = vec![
            SourceDocument::new("handbook", "## SECTION: A\nalpha\n## SECTION: B\nbeta\n## SECTION: C\ngamma"),
            SourceDocument::new("direction", "## SECTION: Vision\nOne platform."),
        ];
        let (index, report) = builder().build(&docs).await.unwrap();
        assert_eq!(report.total_chunks, 4);
        assert_eq!(
            report.chunks_per_source,
            vec![("handbook".to_string(), 3), ("direction".to_string(), 1)]
        );
        assert_eq!(index.len(), 4);
        assert_eq!(report.dimension, 384);
    }

    #[tokio::test]
    async fn test_failed_build_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vector_index");
        let docs = vec![
            SourceDocument::new("handbook", "## SECTION: A\nalpha"),
            SourceDocument::new("direction", "no marker here"),
        ];
        let err = builder().build_and_save(&docs, &path).await.unwrap_err();
        assert!(matches!(err, Error::Chunking(_)));
        assert!(!path.exists());
    }
}
