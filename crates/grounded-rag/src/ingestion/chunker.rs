//! Text chunking with boundary-aware cuts and character overlap
//!
//! Sizes are counted in chars. Each chunk is cut at the best boundary found
//! inside its window, in priority order: paragraph break, sentence break,
//! word break, then a raw cut at the window end. The next chunk starts
//! `overlap` chars before the previous cut.

use unicode_segmentation::UnicodeSegmentation;

use crate::config::ChunkingConfig;
use crate::error::{Error, Result};

/// A chunk of text with its char span in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpan<'a> {
    pub text: &'a str,
    pub char_start: usize,
    pub char_end: usize,
}

/// Text chunker with configurable size and overlap
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Maximum chunk size in characters
    chunk_size: usize,
    /// Characters repeated at the start of the following chunk
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker, rejecting an overlap that would stall progress
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 || overlap >= chunk_size {
            return Err(Error::InvalidChunkConfig { chunk_size, overlap });
        }
        Ok(Self { chunk_size, overlap })
    }

    /// Build from the chunking section of the config
    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split text into ordered chunk texts
    pub fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        self.split_spans(text).into_iter().map(|s| s.text).collect()
    }

    /// Split text into ordered chunks with char offsets
    pub fn split_spans<'a>(&self, text: &'a str) -> Vec<ChunkSpan<'a>> {
        if text.is_empty() {
            return Vec::new();
        }

        // Byte offset of every char, plus one past the end
        let offsets: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let total = offsets.len() - 1;

        let span = |start: usize, end: usize| ChunkSpan {
            text: &text[offsets[start]..offsets[end]],
            char_start: start,
            char_end: end,
        };

        if total <= self.chunk_size {
            return vec![span(0, total)];
        }

        let boundaries = Boundaries::scan(text, &offsets);
        let mut chunks = Vec::with_capacity(total / (self.chunk_size - self.overlap) + 1);
        let mut start = 0;

        loop {
            if total - start <= self.chunk_size {
                chunks.push(span(start, total));
                break;
            }

            let window_end = start + self.chunk_size;
            let min_end = start + self.overlap + 1;
            let end = boundaries.best_cut(min_end, window_end);

            chunks.push(span(start, end));
            start = end - self.overlap;
        }

        chunks
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        let config = ChunkingConfig::default();
        Self {
            chunk_size: config.chunk_size,
            overlap: config.chunk_overlap,
        }
    }
}

/// Split with explicit parameters
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<&str>> {
    Ok(TextChunker::new(chunk_size, overlap)?.split(text))
}

/// Candidate cut positions (char indices) over the whole text, ascending
struct Boundaries {
    paragraphs: Vec<usize>,
    sentences: Vec<usize>,
    words: Vec<usize>,
}

impl Boundaries {
    fn scan(text: &str, offsets: &[usize]) -> Self {
        let char_at = |byte: usize| offsets.binary_search(&byte).unwrap_or_else(|i| i);

        let paragraphs = text
            .match_indices("\n\n")
            .map(|(i, m)| char_at(i + m.len()))
            .collect();

        // Sentence segmentation runs on the full text since UAX #29 looks ahead
        let sentences = text
            .split_sentence_bound_indices()
            .map(|(i, _)| i)
            .filter(|&i| i > 0)
            .map(char_at)
            .collect();

        let mut words = Vec::new();
        let mut prev_ws = false;
        for (idx, c) in text.chars().enumerate() {
            let ws = c.is_whitespace();
            if prev_ws && !ws {
                words.push(idx);
            }
            prev_ws = ws;
        }

        Self {
            paragraphs,
            sentences,
            words,
        }
    }

    /// Rightmost cut in `[min_end, max_end]` by boundary priority
    fn best_cut(&self, min_end: usize, max_end: usize) -> usize {
        [&self.paragraphs, &self.sentences, &self.words]
            .into_iter()
            .find_map(|positions| last_within(positions, min_end, max_end))
            .unwrap_or(max_end)
    }
}

fn last_within(positions: &[usize], min: usize, max: usize) -> Option<usize> {
    let upper = positions.partition_point(|&p| p <= max);
    positions[..upper].last().copied().filter(|&p| p >= min)
}
