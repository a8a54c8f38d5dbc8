use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use docchat_cli::{init_logging, EmbedderKind, LogConfig};
use docchat_core::{ChunkingConfig, EmbeddingProvider, SourceDocument, UnsectionedPolicy};
use docchat_gemini::GeminiEmbedder;
use docchat_rag::{CorpusChunker, HashingEmbedder, IndexBuilder};

#[derive(Parser)]
#[command(name = "docchat-index")]
#[command(about = "Chunk and embed the handbook and direction corpora into a vector index", long_about = None)]
struct Cli {
    /// Cleaned handbook text, indexed with source label "handbook"
    #[arg(long, default_value = "data/handbook_cleaned_FULL.txt")]
    handbook: PathBuf,

    /// Cleaned direction text, indexed with source label "direction"
    #[arg(long, default_value = "data/direction_final.txt")]
    direction: PathBuf,

    /// Output directory for the index
    #[arg(short, long, default_value = "data/vector_index")]
    output: PathBuf,

    /// Maximum chunk length in characters
    #[arg(long, default_value_t = 750)]
    chunk_size: usize,

    /// Characters carried over between consecutive chunks
    #[arg(long, default_value_t = 150)]
    chunk_overlap: usize,

    #[arg(long, value_enum, default_value_t = EmbedderKind::Hashing)]
    embedder: EmbedderKind,

    /// Index a source without section markers as one section instead of failing
    #[arg(long)]
    allow_unsectioned: bool,

    /// Texts per embedding request
    #[arg(long, default_value_t = 64)]
    batch_size: usize,
}

fn read_source(label: &str, path: &Path) -> Result<SourceDocument> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} corpus from {}", label, path.display()))?;
    Ok(SourceDocument::new(label, text))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(&LogConfig::with_level("info"))?;

    let documents = vec![
        read_source("handbook", &cli.handbook)?,
        read_source("direction", &cli.direction)?,
    ];

    let chunker = CorpusChunker::new(ChunkingConfig {
        chunk_size: cli.chunk_size,
        chunk_overlap: cli.chunk_overlap,
        unsectioned: if cli.allow_unsectioned {
            UnsectionedPolicy::WholeDocument
        } else {
            UnsectionedPolicy::Reject
        },
        ..Default::default()
    })?;

    let embedder: Arc<dyn EmbeddingProvider> = match cli.embedder {
        EmbedderKind::Hashing => Arc::new(HashingEmbedder::default()),
        EmbedderKind::Gemini => Arc::new(
            GeminiEmbedder::from_env().context("The gemini embedder needs GOOGLE_API_KEY")?,
        ),
    };

    println!("{} Building index with {}...", "🔧".blue(), embedder.model_id());

    let report = IndexBuilder::new(chunker, embedder)
        .with_batch_size(cli.batch_size)
        .build_and_save(&documents, &cli.output)
        .await
        .context("Index build failed, nothing was written")?;

    for (source, count) in &report.chunks_per_source {
        println!("  {} {}: {} chunks", "•".blue(), source, count);
    }
    println!(
        "{} Total chunks: {} ({} dimensions) → {}",
        "✅".green(),
        report.total_chunks,
        report.dimension,
        cli.output.display()
    );

    Ok(())
}
