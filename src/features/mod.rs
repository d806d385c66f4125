//! Feature construction: TF-IDF synopsis vectors followed by multi-hot genre vectors.
//!
//! The vectorizer and encoder are fitted once on the whole catalog and then
//! treated as immutable values; anything that needs to vectorize new text gets
//! them passed in explicitly through [`FittedFeatures`].

pub mod genres;
pub mod stop_words;
pub mod tfidf;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::catalog::AnimeRecord;
use crate::error::{RecommenderError, Result};
use crate::utils::math;

pub use genres::GenreEncoder;
pub use tfidf::TfidfVectorizer;

/// Sparse row with strictly increasing column indices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
}

impl SparseVector {
    pub fn new(indices: Vec<usize>, values: Vec<f64>) -> Self {
        debug_assert_eq!(indices.len(), values.len());
        debug_assert!(indices.windows(2).all(|w| w[0] < w[1]));
        Self { indices, values }
    }

    pub fn norm(&self) -> f64 {
        math::l2_norm(&self.values)
    }

    /// All stored values are zero (or nothing is stored).
    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0.0)
    }

    /// Scale to unit length; a zero vector is left untouched.
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for v in &mut self.values {
                *v /= norm;
            }
        }
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        math::sparse_dot(&self.indices, &self.values, &other.indices, &other.values)
    }

    /// `self` followed by `tail`, whose columns are shifted by `offset`.
    pub fn concat(mut self, tail: SparseVector, offset: usize) -> SparseVector {
        self.indices.extend(tail.indices.into_iter().map(|i| i + offset));
        self.values.extend(tail.values);
        self
    }
}

/// One row per catalog record: `[text columns | genre columns]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    pub text_width: usize,
    pub genre_width: usize,
    pub rows: Vec<SparseVector>,
}

impl FeatureMatrix {
    pub fn width(&self) -> usize {
        self.text_width + self.genre_width
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, index: usize) -> &SparseVector {
        &self.rows[index]
    }

    /// Row as a dense vector, mostly for inspection and tests.
    pub fn dense_row(&self, index: usize) -> Vec<f64> {
        let mut dense = vec![0.0; self.width()];
        let row = &self.rows[index];
        for (&col, &v) in row.indices.iter().zip(&row.values) {
            dense[col] = v;
        }
        dense
    }
}

/// Matrix plus the fitted state that produced it.
#[derive(Debug, Clone)]
pub struct FittedFeatures {
    pub matrix: FeatureMatrix,
    pub vectorizer: TfidfVectorizer,
    pub encoder: GenreEncoder,
}

impl FittedFeatures {
    /// Vectorize a record-like description with the fitted state, no refit.
    pub fn vectorize(&self, synopsis: &str, genres: &[String]) -> SparseVector {
        vectorize_with(&self.vectorizer, &self.encoder, synopsis, genres)
    }
}

pub fn vectorize_with(
    vectorizer: &TfidfVectorizer,
    encoder: &GenreEncoder,
    synopsis: &str,
    genres: &[String],
) -> SparseVector {
    vectorizer
        .transform(synopsis)
        .concat(encoder.transform(genres), vectorizer.width())
}

/// Fit the vectorizer and genre encoder on `records` and build the feature matrix.
///
/// Row `i` of the result belongs to `records[i]`. An empty slice is rejected.
pub fn build_features(records: &[AnimeRecord], max_features: usize) -> Result<FittedFeatures> {
    if records.is_empty() {
        return Err(RecommenderError::invalid_argument(
            "cannot build features for an empty catalog",
        ));
    }

    let synopses: Vec<&str> = records.iter().map(|r| r.synopsis.as_str()).collect();
    let (vectorizer, text_rows) = TfidfVectorizer::fit_transform(&synopses, max_features)?;
    let encoder = GenreEncoder::fit(records.iter().map(|r| r.genres.as_slice()));

    let offset = vectorizer.width();
    let rows: Vec<SparseVector> = text_rows
        .into_iter()
        .zip(records)
        .map(|(text, record)| text.concat(encoder.transform(&record.genres), offset))
        .collect();

    let zero_rows = rows.iter().filter(|r| r.is_zero()).count();
    if zero_rows > 0 {
        warn!(
            "{} of {} records have an all-zero feature vector; their similarities are 0",
            zero_rows,
            rows.len()
        );
    }

    let matrix = FeatureMatrix {
        text_width: vectorizer.width(),
        genre_width: encoder.width(),
        rows,
    };
    info!(
        "Built feature matrix: {} rows x {} columns ({} text, {} genre)",
        matrix.n_rows(),
        matrix.width(),
        matrix.text_width,
        matrix.genre_width
    );

    Ok(FittedFeatures {
        matrix,
        vectorizer,
        encoder,
    })
}
