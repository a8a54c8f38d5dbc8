//! Recursive character splitter
//!
//! Breaks text on the coarsest separator present (paragraph, line, sentence, word,
//! then single characters), recursing into pieces that are still too long, and
//! greedily merges the pieces back into windows of at most `chunk_size` characters
//! that share up to `chunk_overlap` characters with their predecessor.

use std::collections::VecDeque;

use docchat_core::{Error, Result};

/// Recursive splitter producing overlapping, size-bounded windows
#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveSplitter {
    /// Paragraph, line, sentence, word, character
    pub const DEFAULT_SEPARATORS: [&'static str; 5] = ["\n\n", "\n", ". ", " ", ""];

    /// Create a splitter; sizes are measured in characters
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::Chunking("chunk size must be greater than zero".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(Error::Chunking(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                chunk_overlap, chunk_size
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: Self::DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Replace the separator list. A trailing `""` is appended when missing so every
    /// piece can always be broken down to single characters.
    pub fn with_separators(mut self, separators: Vec<String>) -> Self {
        self.separators = separators;
        if self.separators.last().is_none_or(|s| !s.is_empty()) {
            self.separators.push(String::new());
        }
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split text into trimmed, non-empty windows
    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut chunks = Vec::new();
        let (separator, finer) = pick_separator(text, separators);

        let mut fitting: Vec<&str> = Vec::new();
        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                fitting.push(piece);
                continue;
            }

            if !fitting.is_empty() {
                chunks.extend(self.merge(&fitting));
                fitting.clear();
            }

            if finer.is_empty() {
                push_trimmed(&mut chunks, piece);
            } else {
                chunks.extend(self.split_recursive(piece, finer));
            }
        }

        if !fitting.is_empty() {
            chunks.extend(self.merge(&fitting));
        }

        chunks
    }

    /// Greedily join consecutive pieces into windows, keeping a tail of at most
    /// `chunk_overlap` characters as the start of the next window.
    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let mut merged = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);

            if total + len > self.chunk_size && !window.is_empty() {
                push_trimmed(&mut merged, &window.iter().copied().collect::<String>());

                while total > self.chunk_overlap || (total > 0 && total + len > self.chunk_size) {
                    let Some(front) = window.pop_front() else {
                        break;
                    };
                    total -= char_len(front);
                }
            }

            window.push_back(piece);
            total += len;
        }

        push_trimmed(&mut merged, &window.iter().copied().collect::<String>());
        merged
    }
}

fn pick_separator<'a>(text: &str, separators: &'a [String]) -> (&'a str, &'a [String]) {
    for (i, separator) in separators.iter().enumerate() {
        if separator.is_empty() {
            return ("", &[]);
        }
        if text.contains(separator.as_str()) {
            return (separator, &separators[i + 1..]);
        }
    }
    ("", &[])
}

/// Split on `separator`, keeping it at the end of the preceding piece so the pieces
/// concatenate back to the input and a sentence keeps its closing period.
fn split_keeping_separator<'t>(text: &'t str, separator: &str) -> Vec<&'t str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    text.split_inclusive(separator).collect()
}

fn push_trimmed(out: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_config() {
        assert!(RecursiveSplitter::new(0, 0).is_err());
        assert!(RecursiveSplitter::new(100, 100).is_err());
        assert!(RecursiveSplitter::new(100, 20).is_ok());
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let splitter = RecursiveSplitter::new(750, 150).unwrap();
        let chunks = splitter.split("  Short text about async work.  ");
        assert_eq!(chunks, vec!["Short text about async work.".to_string()]);
    }

    #[test]
    fn test_empty_and_blank_text() {
        let splitter = RecursiveSplitter::new(50, 10).unwrap();
        assert!(splitter.split("").is_empty());
        assert!(splitter.split("   \n\n  ").is_empty());
    }

    #[test]
    fn test_prefers_paragraph_boundaries() {
        let splitter = RecursiveSplitter::new(40, 0).unwrap();
        let text = "First paragraph is here.\n\nSecond paragraph follows.";
        let chunks = splitter.split(text);
        assert_eq!(
            chunks,
            vec![
                "First paragraph is here.".to_string(),
                "Second paragraph follows.".to_string(),
            ]
        );
    }

    #[test]
    fn test_chunks_respect_size_and_are_substrings() {
        let splitter = RecursiveSplitter::new(60, 15).unwrap();
        let text = "GitLab values results. We iterate quickly and ship small changes. \
                    Everyone can contribute.\n\nAsync communication is the default; \
                    meetings are optional and recorded. Handbook first means documenting \
                    decisions before acting on them.";
        let chunks = splitter.split(text);
        assert!(chunks.len() > 2);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 60, "too long: {:?}", chunk);
            assert!(text.contains(chunk.as_str()), "not a slice of the input: {:?}", chunk);
        }
    }

    #[test]
    fn test_overlap_carries_text_forward() {
        let splitter = RecursiveSplitter::new(20, 10).unwrap();
        let chunks = splitter.split("one two three four five six seven eight");
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let last_word = pair[0].split_whitespace().last().unwrap();
            assert!(
                pair[1].contains(last_word),
                "expected overlap between {:?} and {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_unbroken_text_falls_back_to_characters() {
        let splitter = RecursiveSplitter::new(8, 2).unwrap();
        let chunks = splitter.split("abcdefghijklmnopqrstuvwxyz");
        assert!(chunks.len() > 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 8));
        assert!(chunks[0].starts_with("abc"));
    }

    #[test]
    fn test_multibyte_text_counts_characters() {
        let splitter = RecursiveSplitter::new(5, 1).unwrap();
        let chunks = splitter.split("ééééééééééééé");
        assert!(chunks.iter().all(|c| c.chars().count() <= 5));
    }

    #[test]
    fn test_sentences_keep_their_closing_period() {
        let splitter = RecursiveSplitter::new(60, 0).unwrap();
        let chunks = splitter.split(
            "GitLab values results and iteration above all. Everyone can contribute to the handbook. \
             Async work is the default for teams.",
        );
        assert_eq!(
            chunks,
            vec![
                "GitLab values results and iteration above all.".to_string(),
                "Everyone can contribute to the handbook.".to_string(),
                "Async work is the default for teams.".to_string(),
            ]
        );
    }

    #[test]
    fn test_no_chunk_starts_with_sentence_punctuation() {
        let text = "Iteration means shipping the smallest change. Results matter more than hours. \
                    Transparency is the default. Collaboration crosses team lines. \
                    Efficiency favours boring solutions. Diversity makes teams stronger.";
        for (size, overlap) in [(30, 0), (45, 10), (60, 20), (90, 30)] {
            let splitter = RecursiveSplitter::new(size, overlap).unwrap();
            for chunk in splitter.split(text) {
                assert!(!chunk.starts_with('.'), "size {}: {:?}", size, chunk);
                assert!(chunk.chars().count() <= size);
            }
        }
    }

    #[test]
    fn test_custom_separators_get_character_fallback() {
        let splitter = RecursiveSplitter::new(10, 0)
            .unwrap()
            .with_separators(vec!["|".to_string()]);
        let chunks = splitter.split("aaaa|bbbb|cccccccccccccc");
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
    }
}
