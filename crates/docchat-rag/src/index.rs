//! Flat vector index with an on-disk format
//!
//! Exact cosine search over every stored embedding followed by MMR re-ranking. The
//! corpora are small enough that a linear scan is fast, and it keeps results exactly
//! reproducible between a freshly built index and one loaded from disk.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use docchat_core::{
    Chunk, Embedding, EmbeddingProvider, Error, Result, ScoredChunk, SearchConfig, VectorStore,
};

use crate::mmr::{cosine_similarity, mmr_select};

const MANIFEST_FILE: &str = "manifest.json";
const ENTRIES_FILE: &str = "entries.json";

/// Description of a persisted index, written next to its entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    pub format_version: u32,
    pub embedding_model: String,
    pub dimension: usize,
    pub chunk_count: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    chunk: Chunk,
    embedding: Embedding,
}

/// In-memory flat index; read-only once built or loaded
#[derive(Debug, Clone)]
pub struct FlatIndex {
    manifest: IndexManifest,
    entries: Vec<IndexEntry>,
}

impl FlatIndex {
    pub const FORMAT_VERSION: u32 = 1;

    /// Build an index from chunks and their embeddings (same order, same length)
    pub fn build(
        chunks: Vec<Chunk>,
        embeddings: Vec<Embedding>,
        embedding_model: impl Into<String>,
    ) -> Result<Self> {
        if chunks.is_empty() {
            return Err(Error::InvalidInput("cannot build an index from zero chunks".to_string()));
        }
        if chunks.len() != embeddings.len() {
            return Err(Error::InvalidInput(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        let dimension = embeddings[0].len();
        if dimension == 0 {
            return Err(Error::Embedding("embeddings must not be empty".to_string()));
        }
        if let Some((i, bad)) = embeddings.iter().enumerate().find(|(_, e)| e.len() != dimension) {
            return Err(Error::Embedding(format!(
                "embedding {} has dimension {} but the index uses {}",
                i,
                bad.len(),
                dimension
            )));
        }

        let entries: Vec<IndexEntry> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry { chunk, embedding })
            .collect();

        Ok(Self {
            manifest: IndexManifest {
                format_version: Self::FORMAT_VERSION,
                embedding_model: embedding_model.into(),
                dimension,
                chunk_count: entries.len(),
                created_at: Utc::now(),
            },
            entries,
        })
    }

    /// Persist the index to `dir`, replacing any previous index there.
    ///
    /// Files are written to a sibling `<dir>.partial` directory first and moved into
    /// place at the end, so an interrupted save never leaves a half-written index.
    pub fn save(&self, dir: &Path) -> Result<()> {
        let staging = staging_dir(dir)?;
        if let Some(parent) = staging.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        if staging.exists() {
            fs::remove_dir_all(&staging)?;
        }
        fs::create_dir_all(&staging)?;

        fs::write(staging.join(MANIFEST_FILE), serde_json::to_vec_pretty(&self.manifest)?)?;
        fs::write(staging.join(ENTRIES_FILE), serde_json::to_vec(&self.entries)?)?;

        if dir.exists() {
            fs::remove_dir_all(dir)?;
        }
        fs::rename(&staging, dir)?;

        info!(
            path = %dir.display(),
            chunks = self.entries.len(),
            dimension = self.manifest.dimension,
            "Saved vector index"
        );
        Ok(())
    }

    /// Load an index previously written by [`FlatIndex::save`]
    pub fn load(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::IndexLoad(format!("no index directory at {}", dir.display())));
        }

        let manifest: IndexManifest = read_json(&dir.join(MANIFEST_FILE))?;
        if manifest.format_version != Self::FORMAT_VERSION {
            return Err(Error::IndexLoad(format!(
                "unsupported index format version {} (expected {})",
                manifest.format_version,
                Self::FORMAT_VERSION
            )));
        }

        let entries: Vec<IndexEntry> = read_json(&dir.join(ENTRIES_FILE))?;
        if entries.len() != manifest.chunk_count {
            return Err(Error::IndexLoad(format!(
                "manifest lists {} chunks but {} were found",
                manifest.chunk_count,
                entries.len()
            )));
        }
        if let Some(bad) = entries.iter().find(|e| e.embedding.len() != manifest.dimension) {
            return Err(Error::IndexLoad(format!(
                "chunk {} has a {}-dimensional embedding but the manifest says {}",
                bad.chunk.id,
                bad.embedding.len(),
                manifest.dimension
            )));
        }

        debug!(path = %dir.display(), chunks = entries.len(), "Loaded vector index");
        Ok(Self { manifest, entries })
    }

    /// Load an index and check it was built with the same embedding model that will
    /// embed queries against it.
    pub fn load_for<E: EmbeddingProvider + ?Sized>(dir: &Path, embedder: &E) -> Result<Self> {
        let index = Self::load(dir)?;

        if embedder.dimension() != index.manifest.dimension {
            return Err(Error::IndexLoad(format!(
                "index was built with {}-dimensional embeddings but '{}' produces {}",
                index.manifest.dimension,
                embedder.model_id(),
                embedder.dimension()
            )));
        }
        if embedder.model_id() != index.manifest.embedding_model {
            return Err(Error::IndexLoad(format!(
                "index was built with embedding model '{}' but queries use '{}'",
                index.manifest.embedding_model,
                embedder.model_id()
            )));
        }

        Ok(index)
    }

    /// Nearest `fetch_k` entries by cosine similarity, re-ranked down to `k` by MMR
    pub fn search(
        &self,
        query: &[f32],
        k: usize,
        fetch_k: usize,
        lambda_mult: f32,
    ) -> Result<Vec<ScoredChunk>> {
        if query.len() != self.manifest.dimension {
            return Err(Error::Retrieval(format!(
                "query vector has dimension {} but the index uses {}",
                query.len(),
                self.manifest.dimension
            )));
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, cosine_similarity(query, &entry.embedding)))
            .collect();
        // stable: equal scores keep insertion order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(fetch_k.max(k));

        let candidates: Vec<&[f32]> = scored
            .iter()
            .map(|(i, _)| self.entries[*i].embedding.as_slice())
            .collect();
        let picked = mmr_select(query, &candidates, k, lambda_mult);

        Ok(picked
            .into_iter()
            .map(|pos| {
                let (i, score) = scored[pos];
                ScoredChunk {
                    chunk: self.entries[i].chunk.clone(),
                    score,
                }
            })
            .collect())
    }

    pub fn manifest(&self) -> &IndexManifest {
        &self.manifest
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stored chunks in insertion order
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.entries.iter().map(|e| &e.chunk)
    }

    /// Summary statistics for display
    pub fn stats(&self) -> serde_json::Value {
        let mut per_source: Vec<(String, usize)> = Vec::new();
        for chunk in self.chunks() {
            match per_source.iter_mut().find(|(s, _)| *s == chunk.metadata.source) {
                Some((_, n)) => *n += 1,
                None => per_source.push((chunk.metadata.source.clone(), 1)),
            }
        }

        json!({
            "chunks": self.entries.len(),
            "dimension": self.manifest.dimension,
            "embedding_model": self.manifest.embedding_model,
            "created_at": self.manifest.created_at.to_rfc3339(),
            "sources": per_source
                .into_iter()
                .map(|(source, n)| (source, json!(n)))
                .collect::<serde_json::Map<_, _>>(),
        })
    }
}

#[async_trait]
impl VectorStore for FlatIndex {
    async fn search_by_vector(
        &self,
        vector: &[f32],
        config: &SearchConfig,
    ) -> Result<Vec<ScoredChunk>> {
        self.search(vector, config.k, config.fetch_k, config.lambda_mult)
    }

    fn dimension(&self) -> usize {
        self.manifest.dimension
    }

    fn count(&self) -> usize {
        self.entries.len()
    }
}

fn staging_dir(dir: &Path) -> Result<PathBuf> {
    let name = dir
        .file_name()
        .ok_or_else(|| Error::InvalidInput(format!("invalid index path {}", dir.display())))?;
    let mut staging = name.to_os_string();
    staging.push(".partial");
    Ok(dir.with_file_name(staging))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path)
        .map_err(|e| Error::IndexLoad(format!("cannot read {}: {}", path.display(), e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| Error::IndexLoad(format!("corrupt {}: {}", path.display(), e)))
}
