use std::collections::VecDeque;

use crate::domain::DomainError;

/// Splits cleaned text on blank lines. Chunk size is not bounded.
pub fn chunk_paragraphs(content: &str) -> Vec<String> {
    content
        .split("\n\n")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub const DEFAULT_CHUNK_SIZE: usize = 500;
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;
const DEFAULT_SEPARATORS: [&str; 5] = ["\n\n", "\n", ".", " ", ""];

/// Size-bounded splitter that prefers paragraph, then line, then sentence,
/// then word boundaries, and finally cuts between characters.
///
/// Separators stay attached to the start of the piece that follows them, so
/// concatenated pieces reproduce the input. Sizes are counted in chars.
#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl Default for RecursiveSplitter {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RecursiveSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, DomainError> {
        if chunk_size == 0 {
            return Err(DomainError::validation("chunk size must be positive"));
        }
        if chunk_overlap >= chunk_size {
            return Err(DomainError::validation(format!(
                "chunk overlap {chunk_overlap} must be smaller than chunk size {chunk_size}"
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
            ..Default::default()
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_with(text, &self.separators)
            .into_iter()
            .map(|chunk| chunk.trim().to_string())
            .filter(|chunk| !chunk.is_empty())
            .collect()
    }

    fn split_with(&self, text: &str, separators: &[String]) -> Vec<String> {
        let (separator, finer) = pick_separator(text, separators);

        let mut chunks = Vec::new();
        let mut fitting = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(&piece) < self.chunk_size {
                fitting.push(piece);
                continue;
            }

            if !fitting.is_empty() {
                chunks.extend(self.merge(std::mem::take(&mut fitting)));
            }
            if finer.is_empty() {
                chunks.push(piece);
            } else {
                chunks.extend(self.split_with(&piece, finer));
            }
        }

        if !fitting.is_empty() {
            chunks.extend(self.merge(fitting));
        }
        chunks
    }

    /// Greedily packs pieces up to `chunk_size`, carrying at most
    /// `chunk_overlap` chars of trailing pieces into the next chunk.
    fn merge(&self, pieces: Vec<String>) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<String> = VecDeque::new();
        let mut total = 0;

        for piece in pieces {
            let len = char_len(&piece);

            if total + len > self.chunk_size && !window.is_empty() {
                push_joined(&window, &mut chunks);

                while total > self.chunk_overlap || (total > 0 && total + len > self.chunk_size) {
                    let Some(front) = window.pop_front() else {
                        break;
                    };
                    total -= char_len(&front);
                }
            }

            total += len;
            window.push_back(piece);
        }

        push_joined(&window, &mut chunks);
        chunks
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

fn split_keeping_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(String::from).collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(text[start..idx].to_string());
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(text[start..].to_string());
    }
    pieces
}

fn push_joined(window: &VecDeque<String>, chunks: &mut Vec<String>) {
    let joined: String = window.iter().map(String::as_str).collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_chunks() {
        let chunks = chunk_paragraphs("Hello world.\n\nSecond para.");
        assert_eq!(chunks, vec!["Hello world.", "Second para."]);
    }

    #[test]
    fn test_paragraph_chunks_drop_blank_segments() {
        let chunks = chunk_paragraphs("\n\nOne\n\n   \n\n\n\nTwo  \n\n");
        assert_eq!(chunks, vec!["One", "Two"]);
        assert!(chunk_paragraphs("").is_empty());
    }

    #[test]
    fn test_paragraph_chunks_rejoin_to_input() {
        let cleaned = "First paragraph\nwith two lines.\n\nSecond.\n\nThird one.";
        assert_eq!(chunk_paragraphs(cleaned).join("\n\n"), cleaned);
    }

    #[test]
    fn test_splitter_rejects_bad_config() {
        assert!(RecursiveSplitter::new(0, 0).is_err());
        assert!(RecursiveSplitter::new(10, 10).is_err());
        assert!(RecursiveSplitter::new(10, 3).is_ok());
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let splitter = RecursiveSplitter::default();
        assert_eq!(splitter.split("  A short page.  "), vec!["A short page."]);
        assert!(splitter.split("   \n\n ").is_empty());
    }

    #[test]
    fn test_prefers_paragraph_boundaries() {
        let splitter = RecursiveSplitter::new(12, 0).unwrap();
        assert_eq!(
            splitter.split("para one.\n\npara two."),
            vec!["para one.", "para two."]
        );
    }

    #[test]
    fn test_word_split_carries_overlap() {
        let splitter = RecursiveSplitter::new(10, 5).unwrap();
        assert_eq!(
            splitter.split("ab cd ef gh ij kl"),
            vec!["ab cd ef", "ef gh ij", "ij kl"]
        );
    }

    #[test]
    fn test_hard_cut_without_separators() {
        let splitter = RecursiveSplitter::new(4, 0).unwrap();
        assert_eq!(splitter.split("abcdefghij"), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_chunks_respect_size_and_are_verbatim() {
        let text = "The pump must be primed before start-up. Check the seals daily.\n\
                    Replace filters every 500 hours. Log all pressure readings.\n\n\
                    Safety: never open the housing while the unit is pressurised."
            .repeat(8);
        let splitter = RecursiveSplitter::new(120, 20).unwrap();
        let chunks = splitter.split(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(!chunk.is_empty());
            assert!(chunk.chars().count() <= 120, "oversized chunk: {chunk:?}");
            assert!(text.contains(chunk.as_str()), "chunk not verbatim: {chunk:?}");
        }
    }
}
