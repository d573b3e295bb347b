//! Flat exact-search vector index.

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("entry {0} has an empty vector")]
    EmptyVector(usize),

    #[error("entry {0} contains a non-finite value")]
    NonFinite(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub vector: Vec<f32>,
    pub chunk_text: String,
    pub source_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<'a> {
    pub entry: &'a IndexEntry,
    /// Squared Euclidean distance to the query.
    pub distance: f32,
}

/// Immutable set of entries searched by brute force.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorIndex {
    dimension: usize,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Build a fresh index. All vectors must share one non-zero dimension.
    ///
    /// # Errors
    ///
    /// Returns an error if a vector is empty, contains NaN/infinity, or its
    /// dimension differs from the first entry.
    pub fn build(entries: Vec<IndexEntry>) -> Result<Self, IndexError> {
        let dimension = entries.first().map_or(0, |e| e.vector.len());
        for (i, entry) in entries.iter().enumerate() {
            if entry.vector.is_empty() {
                return Err(IndexError::EmptyVector(i));
            }
            if entry.vector.len() != dimension {
                return Err(IndexError::DimensionMismatch {
                    expected: dimension,
                    actual: entry.vector.len(),
                });
            }
            if entry.vector.iter().any(|x| !x.is_finite()) {
                return Err(IndexError::NonFinite(i));
            }
        }
        Ok(Self { dimension, entries })
    }

    /// The `k` entries closest to `query`, nearest first.
    ///
    /// Equal distances keep insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is non-empty and `query` has a different dimension.
    pub fn nearest_neighbors(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor<'_>>, IndexError> {
        if k == 0 || self.entries.is_empty() {
            return Ok(Vec::new());
        }
        if query.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<Neighbor<'_>> = self
            .entries
            .iter()
            .map(|entry| Neighbor {
                entry,
                distance: squared_l2(query, &entry.vector),
            })
            .collect();

        // stable sort: ties stay in insertion order
        scored.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        scored.truncate(k);
        Ok(scored)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Vector length shared by all entries; 0 for an empty index.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[must_use]
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Distinct source URLs in insertion order.
    #[must_use]
    pub fn sources(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for entry in &self.entries {
            if !seen.contains(&entry.source_url.as_str()) {
                seen.push(entry.source_url.as_str());
            }
        }
        seen
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
