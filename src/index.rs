use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::chunking::TextChunk;
use crate::gemini::Embedding;

/// One indexed chunk together with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    chunk: TextChunk,
    vector: Vec<f32>,
}

/// In-memory nearest-neighbor index over embedded chunks.
///
/// Entries keep their insertion order, which is the original chunk order in
/// the document; similarity ties resolve in that order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VectorIndex {
    dimension: usize,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk with its embedding. The first insert fixes the index
    /// dimension.
    pub fn insert(&mut self, chunk: TextChunk, embedding: Embedding) {
        if self.entries.is_empty() {
            self.dimension = embedding.values.len();
        } else {
            debug_assert_eq!(
                embedding.values.len(),
                self.dimension,
                "all embeddings in an index must share one dimension"
            );
        }
        self.entries.push(IndexEntry {
            chunk,
            vector: embedding.values,
        });
    }

    /// Return the `k` chunks most similar to the query embedding, ordered by
    /// non-increasing cosine similarity. An empty index yields an empty
    /// result, not an error.
    pub fn similarity_search(&self, query: &[f32], k: usize) -> Vec<TextChunk> {
        if !self.entries.is_empty() {
            debug_assert_eq!(
                query.len(),
                self.dimension,
                "query embedding dimension must match the index"
            );
        }

        let mut scored: Vec<(f32, &TextChunk)> = self
            .entries
            .iter()
            .map(|entry| (cosine_similarity(query, &entry.vector), &entry.chunk))
            .collect();

        // Stable sort keeps document order for equal scores
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        scored
            .into_iter()
            .take(k)
            .map(|(_, chunk)| chunk.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dimension of the stored vectors; zero while the index is empty.
    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Cosine similarity between two vectors; zero when either is empty or has
/// zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let len = a.len().min(b.len());
    if len == 0 {
        return 0.0;
    }

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()).take(len) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str, start_position: usize) -> TextChunk {
        TextChunk {
            text: text.to_string(),
            start_position,
        }
    }

    fn embedding(values: &[f32]) -> Embedding {
        Embedding {
            values: values.to_vec(),
        }
    }

    fn sample_index() -> VectorIndex {
        let mut index = VectorIndex::new();
        index.insert(chunk("north", 0), embedding(&[0.0, 1.0]));
        index.insert(chunk("east", 100), embedding(&[1.0, 0.0]));
        index.insert(chunk("northeast", 200), embedding(&[1.0, 1.0]));
        index
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_search_orders_by_similarity() {
        let index = sample_index();
        let results = index.similarity_search(&[1.0, 0.1], 3);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].text, "east");
        assert_eq!(results[1].text, "northeast");
        assert_eq!(results[2].text, "north");
    }

    #[test]
    fn test_search_returns_at_most_k() {
        let index = sample_index();
        assert_eq!(index.similarity_search(&[1.0, 0.0], 2).len(), 2);
        assert_eq!(index.similarity_search(&[1.0, 0.0], 10).len(), 3);
        assert!(index.similarity_search(&[1.0, 0.0], 0).is_empty());
    }

    #[test]
    fn test_search_on_empty_index() {
        let index = VectorIndex::new();
        assert!(index.similarity_search(&[1.0, 0.0], 3).is_empty());
    }

    #[test]
    fn test_ties_keep_document_order() {
        let mut index = VectorIndex::new();
        // Parallel vectors score identically against any query
        index.insert(chunk("first", 0), embedding(&[1.0, 0.0]));
        index.insert(chunk("second", 100), embedding(&[2.0, 0.0]));
        index.insert(chunk("third", 200), embedding(&[3.0, 0.0]));

        let results = index.similarity_search(&[1.0, 0.0], 3);
        assert_eq!(results[0].text, "first");
        assert_eq!(results[1].text, "second");
        assert_eq!(results[2].text, "third");
    }

    #[test]
    #[should_panic(expected = "share one dimension")]
    fn test_insert_rejects_mismatched_dimension() {
        let mut index = VectorIndex::new();
        index.insert(chunk("a", 0), embedding(&[1.0, 0.0]));
        index.insert(chunk("b", 100), embedding(&[1.0, 0.0, 0.0]));
    }

    #[test]
    #[should_panic(expected = "must match the index")]
    fn test_search_rejects_mismatched_query_dimension() {
        let index = sample_index();
        index.similarity_search(&[1.0, 0.0, 0.0], 3);
    }

    #[test]
    fn test_dimension_fixed_by_first_insert() {
        let mut index = VectorIndex::new();
        assert_eq!(index.dimension(), 0);
        index.insert(chunk("a", 0), embedding(&[1.0, 2.0, 3.0]));
        assert_eq!(index.dimension(), 3);
        assert_eq!(index.len(), 1);
    }
}
