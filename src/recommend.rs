//! Title → ranked recommendations over precomputed similarity matrices.
//!
//! Ranking order is descending score, then ascending row index, so results do
//! not depend on sort stability. The query's own row is excluded by index
//! wherever it lands in the ranking, not by dropping rank 0.

use serde::Serialize;
use tracing::debug;

use crate::catalog::Catalog;
use crate::error::{RecommenderError, Result};
use crate::features::{FeatureMatrix, FittedFeatures, build_features};
use crate::similarity::{
    SimilarityMatrix, compute_collaborative_similarity, compute_similarity, similarity_row,
};

pub const DEFAULT_TOP_N: usize = 5;

/// One ranked result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub index: usize,
    pub title: String,
    pub score: f64,
}

fn check_top_n(top_n: usize) -> Result<()> {
    if top_n == 0 {
        return Err(RecommenderError::invalid_argument(
            "top_n must be a positive integer",
        ));
    }
    Ok(())
}

/// Order `(index, score)` pairs by score desc, index asc, skipping `exclude`.
fn ranked_indices(scores: &[f64], exclude: Option<usize>, top_n: usize) -> Vec<(usize, f64)> {
    let mut pairs: Vec<(usize, f64)> = scores
        .iter()
        .copied()
        .enumerate()
        .filter(|(i, _)| Some(*i) != exclude)
        .collect();
    pairs.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    pairs.truncate(top_n);
    pairs
}

/// Scored recommendations for `title` against `similarity`.
///
/// Lookup is an exact, case-insensitive match on the whole title; with
/// duplicate titles the lowest row index is the query row.
pub fn rank(
    title: &str,
    catalog: &Catalog,
    similarity: &SimilarityMatrix,
    top_n: usize,
) -> Result<Vec<Recommendation>> {
    check_top_n(top_n)?;
    if similarity.len() != catalog.len() {
        return Err(RecommenderError::invalid_argument(format!(
            "similarity matrix has {} rows but catalog has {}",
            similarity.len(),
            catalog.len()
        )));
    }
    let Some(idx) = catalog.find(title) else {
        debug!("No catalog match for '{}'", title);
        return Err(RecommenderError::NotFound {
            title: title.to_string(),
        });
    };
    debug!("Matched '{}' to row {}", title, idx);

    Ok(ranked_indices(similarity.row(idx), Some(idx), top_n)
        .into_iter()
        .map(|(index, score)| Recommendation {
            index,
            title: catalog.title(index).to_string(),
            score,
        })
        .collect())
}

/// Titles most similar to `title`, highest similarity first.
pub fn recommend(
    title: &str,
    catalog: &Catalog,
    similarity: &SimilarityMatrix,
    top_n: usize,
) -> Result<Vec<String>> {
    Ok(rank(title, catalog, similarity, top_n)?
        .into_iter()
        .map(|r| r.title)
        .collect())
}

/// Catalog plus fitted features and both similarity matrices, all immutable after build.
#[derive(Debug, Clone)]
pub struct Recommender {
    catalog: Catalog,
    features: FittedFeatures,
    content: SimilarityMatrix,
    collaborative: SimilarityMatrix,
}

impl Recommender {
    /// Fit features on `catalog` and precompute both matrices.
    pub fn build(catalog: Catalog, max_features: usize) -> Result<Self> {
        let features = build_features(catalog.records(), max_features)?;
        Ok(Self::from_parts(catalog, features))
    }

    /// Assemble from already-fitted state (e.g. loaded artifacts) without refitting.
    pub fn from_parts(catalog: Catalog, features: FittedFeatures) -> Self {
        let content = compute_similarity(&features.matrix);
        let collaborative = compute_collaborative_similarity(catalog.records());
        Self {
            catalog,
            features,
            content,
            collaborative,
        }
    }

    pub fn recommend_content_based(&self, title: &str, top_n: usize) -> Result<Vec<String>> {
        recommend(title, &self.catalog, &self.content, top_n)
    }

    pub fn recommend_collaborative(&self, title: &str, top_n: usize) -> Result<Vec<String>> {
        recommend(title, &self.catalog, &self.collaborative, top_n)
    }

    pub fn rank_content_based(&self, title: &str, top_n: usize) -> Result<Vec<Recommendation>> {
        rank(title, &self.catalog, &self.content, top_n)
    }

    pub fn rank_collaborative(&self, title: &str, top_n: usize) -> Result<Vec<Recommendation>> {
        rank(title, &self.catalog, &self.collaborative, top_n)
    }

    /// Rank every catalog row against a free-text description.
    ///
    /// Nothing is excluded since the description is not a catalog row.
    pub fn recommend_for_text(
        &self,
        synopsis: &str,
        genres: &[String],
        top_n: usize,
    ) -> Result<Vec<Recommendation>> {
        check_top_n(top_n)?;
        let query = self.features.vectorize(synopsis, genres);
        let scores = similarity_row(&query, &self.features.matrix);
        Ok(ranked_indices(&scores, None, top_n)
            .into_iter()
            .map(|(index, score)| Recommendation {
                index,
                title: self.catalog.title(index).to_string(),
                score,
            })
            .collect())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn features(&self) -> &FittedFeatures {
        &self.features
    }

    pub fn feature_matrix(&self) -> &FeatureMatrix {
        &self.features.matrix
    }

    pub fn content_similarity(&self) -> &SimilarityMatrix {
        &self.content
    }

    pub fn collaborative_similarity(&self) -> &SimilarityMatrix {
        &self.collaborative
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_break_on_lower_index() {
        let ranked = ranked_indices(&[0.5, 0.9, 0.5, 0.9], None, 4);
        let order: Vec<usize> = ranked.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![1, 3, 0, 2]);
    }

    #[test]
    fn excluded_row_is_dropped_even_when_not_first() {
        // query row 2 is a zero vector: every score is 0
        let ranked = ranked_indices(&[0.0, 0.0, 0.0, 0.0], Some(2), 3);
        let order: Vec<usize> = ranked.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![0, 1, 3]);
    }

    #[test]
    fn zero_top_n_is_invalid() {
        assert!(matches!(
            check_top_n(0),
            Err(RecommenderError::InvalidArgument { .. })
        ));
        assert!(check_top_n(1).is_ok());
    }
}
