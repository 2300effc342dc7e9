//! Flat in-memory similarity index over precomputed corpus embeddings.
//!
//! Each category's index file is a JSON document with a `dimension` and a
//! row-major `vectors` list; row position is the retrieval id of the chunk
//! at the same position in the category's chunk file. Search is exhaustive
//! cosine similarity, which is plenty for corpora of a few thousand rows
//! and keeps scoring fully deterministic.

use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct IndexFile {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

/// Immutable vector index for one category.
#[derive(Debug)]
pub struct FlatIndex {
    dimension: usize,
    /// L2-normalized rows, so search is a plain dot product.
    rows: Vec<Vec<f32>>,
}

impl FlatIndex {
    /// Parses and validates an index file. Any malformed row makes the
    /// whole file corrupt; the registry turns that into an absent category.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let file: IndexFile = serde_json::from_str(&raw)?;

        if file.dimension == 0 {
            return Err(anyhow!("index {} has zero dimension", path.display()));
        }
        let mut rows = Vec::with_capacity(file.vectors.len());
        for (i, row) in file.vectors.into_iter().enumerate() {
            if row.len() != file.dimension {
                return Err(anyhow!(
                    "index {} row {i} has {} values, expected {}",
                    path.display(),
                    row.len(),
                    file.dimension
                ));
            }
            rows.push(normalize(row));
        }

        Ok(Self {
            dimension: file.dimension,
            rows,
        })
    }

    /// Builds an index directly from vectors. Used by tests.
    pub fn from_vectors(dimension: usize, vectors: Vec<Vec<f32>>) -> Result<Self> {
        if vectors.iter().any(|v| v.len() != dimension) {
            return Err(anyhow!("vector dimension mismatch"));
        }
        Ok(Self {
            dimension,
            rows: vectors.into_iter().map(normalize).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Top-k neighbors by cosine similarity, best first. Ties break on the
    /// lower row id so a fixed index and query always order identically.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(f32, usize)>> {
        if query.len() != self.dimension {
            return Err(anyhow!(
                "query has {} dims, index has {}",
                query.len(),
                self.dimension
            ));
        }

        let query = normalize(query.to_vec());
        let mut scored: Vec<(f32, usize)> = self
            .rows
            .iter()
            .enumerate()
            .map(|(id, row)| (dot(&query, row), id))
            .collect();

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.1.cmp(&b.1))
        });
        scored.truncate(k);
        Ok(scored)
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis_index() -> FlatIndex {
        FlatIndex::from_vectors(
            3,
            vec![
                vec![1.0, 0.0, 0.0],
                vec![0.0, 1.0, 0.0],
                vec![0.0, 0.0, 1.0],
                vec![1.0, 1.0, 0.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn search_ranks_by_cosine_similarity() {
        let index = axis_index();
        assert_eq!(index.dimension(), 3);
        assert!(!index.is_empty());
        let hits = index.search(&[1.0, 0.0, 0.0], 2).unwrap();
        assert_eq!(hits[0].1, 0);
        assert_eq!(hits[1].1, 3);
        assert!(hits[0].0 > hits[1].0);
    }

    #[test]
    fn ties_break_on_lower_row_id() {
        let index = FlatIndex::from_vectors(
            2,
            vec![vec![1.0, 0.0], vec![2.0, 0.0], vec![0.0, 1.0]],
        )
        .unwrap();
        // Rows 0 and 1 normalize to the same unit vector.
        let hits = index.search(&[1.0, 0.0], 3).unwrap();
        assert_eq!(hits[0].1, 0);
        assert_eq!(hits[1].1, 1);
    }

    #[test]
    fn oversized_k_returns_all_rows() {
        let index = axis_index();
        let hits = index.search(&[0.0, 1.0, 0.0], 50).unwrap();
        assert_eq!(hits.len(), 4);
    }

    #[test]
    fn dimension_mismatch_is_an_error() {
        let index = axis_index();
        assert!(index.search(&[1.0, 0.0], 2).is_err());
    }

    #[test]
    fn corrupt_file_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(FlatIndex::load(&path).is_err());

        let ragged = dir.path().join("ragged.json");
        std::fs::write(
            &ragged,
            r#"{"dimension": 2, "vectors": [[1.0, 0.0], [1.0]]}"#,
        )
        .unwrap();
        assert!(FlatIndex::load(&ragged).is_err());
    }
}
