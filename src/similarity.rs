//! All-pairs cosine similarity over feature rows.
//!
//! Cosine of a zero vector is undefined; here it is 0 against every row,
//! itself included. Only the upper triangle is computed and mirrored, so the
//! matrix is exactly symmetric.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::AnimeRecord;
use crate::features::{FeatureMatrix, SparseVector};
use crate::utils::math::{cosine_similarity, min_max_scale_columns};

/// Dense, square, row-major N×N similarity matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    n: usize,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    fn zeros(n: usize) -> Self {
        Self {
            n,
            values: vec![0.0; n * n],
        }
    }

    fn set_pair(&mut self, i: usize, j: usize, value: f64) {
        self.values[i * self.n + j] = value;
        self.values[j * self.n + i] = value;
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.n + j]
    }

    /// Similarities of row `i` against every row, in row order.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.n..(i + 1) * self.n]
    }
}

/// Cosine similarity between every pair of feature rows.
pub fn compute_similarity(matrix: &FeatureMatrix) -> SimilarityMatrix {
    let n = matrix.n_rows();
    let unit: Vec<SparseVector> = matrix
        .rows
        .iter()
        .map(|row| {
            let mut r = row.clone();
            r.normalize();
            r
        })
        .collect();

    let mut sim = SimilarityMatrix::zeros(n);
    for i in 0..n {
        if unit[i].is_zero() {
            continue;
        }
        for j in i..n {
            sim.set_pair(i, j, unit[i].dot(&unit[j]));
        }
    }
    info!("Computed {}x{} content similarity matrix", n, n);
    sim
}

/// Cosine similarity of `query` against every row of `matrix`, in row order.
///
/// Used for one-off queries without a precomputed matrix; agrees with
/// [`compute_similarity`] when `query` is one of the rows.
pub fn similarity_row(query: &SparseVector, matrix: &FeatureMatrix) -> Vec<f64> {
    let qn = query.norm();
    if qn == 0.0 {
        return vec![0.0; matrix.n_rows()];
    }
    matrix
        .rows
        .iter()
        .map(|row| {
            let rn = row.norm();
            if rn == 0.0 { 0.0 } else { query.dot(row) / (qn * rn) }
        })
        .collect()
}

/// Per-record `[mean, popularity]` scaled column-wise into [0, 1].
///
/// Non-finite values are treated as 0 before scaling.
pub fn collaborative_features(records: &[AnimeRecord]) -> Vec<Vec<f64>> {
    let finite = |v: f64| if v.is_finite() { v } else { 0.0 };
    let raw: Vec<Vec<f64>> = records
        .iter()
        .map(|r| vec![finite(r.mean), finite(r.popularity)])
        .collect();
    min_max_scale_columns(&raw)
}

/// Score/popularity similarity: cosine over the scaled `[mean, popularity]` pairs.
pub fn compute_collaborative_similarity(records: &[AnimeRecord]) -> SimilarityMatrix {
    let features = collaborative_features(records);
    let n = features.len();
    let mut sim = SimilarityMatrix::zeros(n);
    for i in 0..n {
        for j in i..n {
            sim.set_pair(i, j, cosine_similarity(&features[i], &features[j]));
        }
    }
    debug!("Computed {}x{} collaborative similarity matrix", n, n);
    sim
}
