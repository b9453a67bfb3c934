/*!
 * Sentence-respecting text chunking.
 *
 * Translation backends accept a bounded number of characters per request, so
 * long section bodies are split into chunks before being sent. Chunks close on
 * sentence boundaries where possible; a sentence that alone exceeds the budget
 * is re-tokenized into words so the boundary can fall mid-sentence.
 */

use std::collections::VecDeque;

use once_cell::sync::Lazy;
use regex::Regex;

/// A contiguous, sentence-boundary-respecting slice of a larger text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Zero-based position of this chunk in the split sequence
    pub index: usize,
    /// Chunk text, at most `max_chars` characters unless a single token
    /// already exceeded the budget
    pub text: String,
}

/// Sentence boundary: terminal punctuation followed by whitespace.
static SENTENCE_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)(.*?[.!?。])\s+").unwrap());

/// Split `text` into sentences, keeping terminal punctuation attached.
pub fn sentence_tokenize(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    let mut sentences = Vec::new();
    let mut last_end = 0;
    for caps in SENTENCE_BOUNDARY.captures_iter(trimmed) {
        let whole = caps.get(0).map(|m| m.end()).unwrap_or(0);
        if let Some(sentence) = caps.get(1) {
            let s = sentence.as_str().trim();
            if !s.is_empty() {
                sentences.push(s.to_string());
            }
        }
        last_end = whole;
    }
    let tail = trimmed[last_end..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

/// Split a sentence into whitespace-delimited words.
fn word_tokenize(sentence: &str) -> Vec<String> {
    sentence.split_whitespace().map(str::to_string).collect()
}

/// Lazy iterator over size-bounded, sentence-aligned chunks of a text.
///
/// The split is a pure function of `(text, max_chars)`: re-creating the
/// splitter on the same input yields the same chunk sequence. Concatenating
/// the chunks with a single space between the pieces of each chunk restores
/// the sentence content of the source.
pub struct ChunkSplitter {
    queue: VecDeque<String>,
    max_chars: usize,
    next_index: usize,
}

impl ChunkSplitter {
    /// Create a splitter over `text` with a chunk budget of `max_chars`
    /// characters. Empty or whitespace-only input yields no chunks.
    pub fn new(text: &str, max_chars: usize) -> Self {
        ChunkSplitter {
            queue: sentence_tokenize(text).into(),
            max_chars: max_chars.max(1),
            next_index: 0,
        }
    }
}

impl Iterator for ChunkSplitter {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.queue.is_empty() {
            return None;
        }
        let mut current = String::new();
        let mut budget = self.max_chars;
        while let Some(piece) = self.queue.pop_front() {
            let len = piece.chars().count();
            if budget >= len {
                current.push_str(&piece);
                current.push(' ');
                // One separator character is consumed per accepted piece.
                budget = budget.saturating_sub(len + 1);
            } else if len > self.max_chars {
                let words = word_tokenize(&piece);
                if words.len() <= 1 {
                    // A single token longer than the whole budget: force-emit
                    // it as its own chunk so the loop always terminates.
                    if current.is_empty() {
                        current.push_str(&piece);
                        current.push(' ');
                        break;
                    }
                    self.queue.push_front(piece);
                    break;
                }
                for word in words.into_iter().rev() {
                    self.queue.push_front(word);
                }
            } else {
                self.queue.push_front(piece);
                break;
            }
        }
        let text = current.trim_end_matches(' ').to_string();
        if text.is_empty() {
            return None;
        }
        let chunk = Chunk { index: self.next_index, text };
        self.next_index += 1;
        Some(chunk)
    }
}

/// Eagerly split `text` into chunks. Convenience wrapper over [`ChunkSplitter`].
pub fn split(text: &str, max_chars: usize) -> Vec<Chunk> {
    ChunkSplitter::new(text, max_chars).collect()
}
