//! Retrieval side of docchat
//!
//! This crate provides the corpus chunker, a deterministic local embedder, the flat
//! vector index with its on-disk format, maximal-marginal-relevance re-ranking and the
//! retriever that wires them together.

mod splitter;
mod chunker;
mod embedder;
mod mmr;
mod index;
mod retriever;
mod builder;


pub use splitter::RecursiveSplitter;
pub use chunker::CorpusChunker;
pub use embedder::HashingEmbedder;
pub use mmr::{cosine_similarity, mmr_select};
pub use index::{FlatIndex, IndexManifest};
pub use retriever::MmrRetriever;
pub use builder::{IndexBuilder, BuildReport};

// Re-export core types for convenience
pub use docchat_core::{
    Chunk, ChunkMetadata, ChunkingConfig, Section, SourceDocument, UnsectionedPolicy,
    Embedding, EmbeddingProvider, Retriever, RetrievalResult,
    ScoredChunk, SearchConfig, VectorStore,
    Error, Result,
};
