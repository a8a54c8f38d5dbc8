//! Corpus chunker: section-aware splitting with provenance metadata

use tracing::debug;

use docchat_core::{
    Chunk, ChunkMetadata, ChunkingConfig, Error, Result, Section, SourceDocument,
    UnsectionedPolicy,
};

use crate::splitter::RecursiveSplitter;

/// Splits labeled documents into sections and sections into overlapping chunks
#[derive(Debug, Clone)]
pub struct CorpusChunker {
    config: ChunkingConfig,
    splitter: RecursiveSplitter,
}

impl CorpusChunker {
    /// Create a chunker, validating the configuration
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        if config.section_marker.trim().is_empty() {
            return Err(Error::Chunking("section marker must not be empty".to_string()));
        }
        let splitter = RecursiveSplitter::new(config.chunk_size, config.chunk_overlap)?;
        Ok(Self { config, splitter })
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Extract the sections of a document
    pub fn sections(&self, document: &SourceDocument) -> Result<Vec<Section>> {
        let marker = self.config.section_marker.as_str();

        if !document.text.contains(marker) {
            return match self.config.unsectioned {
                UnsectionedPolicy::Reject => Err(Error::Chunking(format!(
                    "source '{}' contains no '{}' section marker",
                    document.label, marker
                ))),
                UnsectionedPolicy::WholeDocument => {
                    let body = document.text.trim();
                    if body.is_empty() {
                        return Ok(Vec::new());
                    }
                    Ok(vec![Section {
                        header: document.label.clone(),
                        body: body.to_string(),
                    }])
                }
            };
        }

        let sections = document
            .text
            .split(marker)
            .map(str::trim)
            .filter(|fragment| !fragment.is_empty())
            .map(|fragment| {
                // fragment is trimmed and non-empty, so its first line is too
                let (header, body) = fragment.split_once('\n').unwrap_or((fragment, ""));
                Section {
                    header: header.trim().to_string(),
                    body: body.to_string(),
                }
            })
            .collect();

        Ok(sections)
    }

    /// Chunk one document; every chunk carries the document label and its section header
    pub fn chunk(&self, document: &SourceDocument) -> Result<Vec<Chunk>> {
        let sections = self.sections(document)?;
        let mut chunks = Vec::new();

        for section in &sections {
            for content in self.splitter.split(&section.body) {
                let ordinal = chunks.len();
                chunks.push(Chunk {
                    id: chunk_id(&document.label, &section.header, ordinal, &content),
                    content,
                    metadata: ChunkMetadata {
                        source: document.label.clone(),
                        section: section.header.clone(),
                    },
                });
            }
        }

        debug!(
            source = %document.label,
            sections = sections.len(),
            chunks = chunks.len(),
            "Chunked source document"
        );

        Ok(chunks)
    }

    /// Chunk several documents, preserving document order
    pub fn chunk_all(&self, documents: &[SourceDocument]) -> Result<Vec<Chunk>> {
        let mut all = Vec::new();
        for document in documents {
            all.extend(self.chunk(document)?);
        }
        Ok(all)
    }
}

fn chunk_id(source: &str, section: &str, ordinal: usize, content: &str) -> String {
    let key = format!("{}\u{1f}{}\u{1f}{}\u{1f}{}", source, section, ordinal, content);
    format!("{:x}", md5::compute(key.as_bytes()))
}
