//! Source documents, sections and chunks

use serde::{Deserialize, Serialize};

/// Raw labeled corpus text, the input of an index build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    pub label: String,
    pub text: String,
}

impl SourceDocument {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

/// A labeled region of a source document.
///
/// `header` is never empty; `body` may be.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub header: String,
    pub body: String,
}

/// Provenance attached to every chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub source: String,
    pub section: String,
}

/// A bounded-length passage of a section body, the unit of retrieval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub content: String,
    pub metadata: ChunkMetadata,
}

/// What to do with a document that has no section marker at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsectionedPolicy {
    /// Fail the build with a chunking error
    #[default]
    Reject,
    /// Treat the whole document as one section headed by the source label
    WholeDocument,
}

/// Configuration for corpus chunking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters
    pub chunk_size: usize,
    /// Characters carried over between neighbouring chunks
    pub chunk_overlap: usize,
    pub section_marker: String,
    pub unsectioned: UnsectionedPolicy,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 750,
            chunk_overlap: 150,
            section_marker: "## SECTION:".to_string(),
            unsectioned: UnsectionedPolicy::Reject,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_yaml_snapshot;

    #[test]
    fn test_default_chunking_config() {
        assert_yaml_snapshot!(ChunkingConfig::default(), @r###"
        chunk_size: 750
        chunk_overlap: 150
        section_marker: "## SECTION:"
        unsectioned: reject
        "###);
    }

    #[test]
    fn test_policy_parses_snake_case() {
        let policy: UnsectionedPolicy = serde_json::from_str("\"whole_document\"").unwrap();
        assert_eq!(policy, UnsectionedPolicy::WholeDocument);
    }
}
