//! Vector index for chunk storage and exact cosine search
//!
//! Entries are append-only. Searches score every stored embedding while
//! holding the read lock, so each search sees the entries published before
//! it started and nothing half-written.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::types::DocumentChunk;

/// Search result with chunk and similarity
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// The retrieved chunk, embedding included
    pub chunk: Arc<DocumentChunk>,
    /// Cosine similarity in `[-1, 1]`
    pub score: f32,
}

/// A stored chunk; its embedding is always set
#[derive(Debug)]
struct IndexEntry {
    chunk: Arc<DocumentChunk>,
}

impl IndexEntry {
    fn vector(&self) -> &[f32] {
        self.chunk.embedding.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Default)]
struct IndexInner {
    entries: Vec<IndexEntry>,
    /// Fixed by the first insert
    dimensions: Option<usize>,
}

impl IndexInner {
    fn check_dimensions(&self, actual: usize) -> Result<()> {
        match self.dimensions {
            Some(expected) if expected != actual => {
                Err(Error::DimensionMismatch { expected, actual })
            }
            _ => Ok(()),
        }
    }
}

/// In-memory vector index shared between ingestion and queries
#[derive(Debug, Default)]
pub struct VectorIndex {
    inner: RwLock<IndexInner>,
}

impl VectorIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one chunk with its embedding
    pub fn insert(&self, chunk: DocumentChunk, embedding: Vec<f32>) -> Result<()> {
        self.insert_batch(vec![(chunk, embedding)]).map(|_| ())
    }

    /// Append a batch of chunks, all or nothing
    ///
    /// Every embedding is validated before any entry becomes visible to
    /// searches. Returns the stored chunks in input order.
    pub fn insert_batch(
        &self,
        pairs: Vec<(DocumentChunk, Vec<f32>)>,
    ) -> Result<Vec<Arc<DocumentChunk>>> {
        if pairs.is_empty() {
            return Ok(Vec::new());
        }

        let mut batch_dims = None;
        let mut entries = Vec::with_capacity(pairs.len());
        for (chunk, embedding) in pairs {
            if embedding.is_empty() {
                return Err(Error::internal(format!(
                    "Embedding for chunk {} is empty",
                    chunk.id
                )));
            }
            if !is_finite(&embedding) {
                return Err(Error::retrieval(format!(
                    "Embedding for chunk {} contains non-finite values",
                    chunk.id
                )));
            }
            let expected = *batch_dims.get_or_insert(embedding.len());
            if expected != embedding.len() {
                return Err(Error::DimensionMismatch {
                    expected,
                    actual: embedding.len(),
                });
            }
            entries.push(IndexEntry {
                chunk: Arc::new(chunk.with_embedding(embedding)),
            });
        }
        let dims = batch_dims.unwrap_or_default();
        let stored: Vec<_> = entries.iter().map(|e| Arc::clone(&e.chunk)).collect();

        let mut inner = self.inner.write();
        inner.check_dimensions(dims)?;
        inner.dimensions = Some(dims);
        inner.entries.extend(entries);

        tracing::debug!(
            "Indexed {} chunks ({} total, {} dims)",
            stored.len(),
            inner.entries.len(),
            dims
        );

        Ok(stored)
    }

    /// Top `k` entries by cosine similarity, most similar first
    ///
    /// Equal scores keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if !is_finite(query) {
            return Err(Error::retrieval("Query embedding contains non-finite values"));
        }
        let inner = self.inner.read();
        if inner.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        inner.check_dimensions(query.len())?;

        let mut hits: Vec<SearchHit> = inner
            .entries
            .iter()
            .map(|entry| SearchHit {
                chunk: Arc::clone(&entry.chunk),
                score: cosine_similarity(query, entry.vector()),
            })
            .collect();
        drop(inner);

        // Stable sort keeps insertion order among ties
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(k);

        Ok(hits)
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Embedding dimensionality, once something has been inserted
    pub fn dimensions(&self) -> Option<usize> {
        self.inner.read().dimensions
    }

    /// Whether any entry came from the given source label
    pub fn contains_source(&self, source: &str) -> bool {
        self.inner
            .read()
            .entries
            .iter()
            .any(|e| e.chunk.metadata.source == source)
    }

    /// Distinct source labels with their entry counts, in first-insert order
    pub fn sources(&self) -> Vec<(String, usize)> {
        let inner = self.inner.read();
        let mut order: Vec<String> = Vec::new();
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for entry in &inner.entries {
            let source = entry.chunk.metadata.source.as_str();
            let count = counts.entry(source).or_insert(0);
            if *count == 0 {
                order.push(source.to_string());
            }
            *count += 1;
        }
        order
            .into_iter()
            .map(|s| {
                let n = counts.get(s.as_str()).copied().unwrap_or_default();
                (s, n)
            })
            .collect()
    }

    /// Remove every entry and reset the dimensionality
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.entries.clear();
        inner.dimensions = None;
        tracing::debug!("Vector index cleared");
    }
}

fn is_finite(vector: &[f32]) -> bool {
    vector.iter().all(|x| x.is_finite())
}

/// Cosine similarity between two vectors
///
/// Returns 0.0 if the lengths differ or either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut mag_a = 0.0f64;
    let mut mag_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        mag_a += x * x;
        mag_b += y * y;
    }

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    (dot / (mag_a.sqrt() * mag_b.sqrt())).clamp(-1.0, 1.0) as f32
}
