//! TF-IDF text vectorizer fitted once on the whole synopsis corpus.

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::SparseVector;
use super::stop_words::is_stop_word;
use crate::error::{RecommenderError, Result};

// Two or more word characters between word boundaries.
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").unwrap());

/// Lowercase, split into word tokens, drop stop words.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|t| !is_stop_word(t))
        .map(str::to_string)
        .collect()
}

/// Fitted vectorizer state: vocabulary (term → column) and one IDF weight per column.
///
/// Columns are assigned in lexicographic term order, so the same corpus always
/// yields the same layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    max_features: usize,
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Learn vocabulary and IDF weights from `documents`.
    ///
    /// When more than `max_features` distinct terms remain after stop-word
    /// removal, the terms with the highest total count across the corpus are
    /// kept; equal counts keep the lexicographically smaller term.
    pub fn fit<S: AsRef<str>>(documents: &[S], max_features: usize) -> Result<Self> {
        if documents.is_empty() {
            return Err(RecommenderError::invalid_argument(
                "cannot fit vectorizer on an empty corpus",
            ));
        }
        if max_features == 0 {
            return Err(RecommenderError::invalid_argument(
                "max_features must be at least 1",
            ));
        }

        let mut term_count: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        for doc in documents {
            let mut counts: HashMap<String, usize> = HashMap::new();
            for token in tokenize(doc.as_ref()) {
                *counts.entry(token).or_insert(0) += 1;
            }
            for (term, c) in counts {
                *term_count.entry(term.clone()).or_insert(0) += c;
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let mut terms: Vec<(String, usize)> = term_count.into_iter().collect();
        if terms.len() > max_features {
            terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            terms.truncate(max_features);
        }
        let kept: Vec<String> = {
            let mut names: Vec<String> = terms.into_iter().map(|(t, _)| t).collect();
            names.sort();
            names
        };

        let n_docs = documents.len() as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(kept.len());
        for (col, term) in kept.into_iter().enumerate() {
            let df = doc_freq.get(&term).copied().unwrap_or(0) as f64;
            idf.push(((1.0 + n_docs) / (1.0 + df)).ln() + 1.0);
            vocabulary.insert(term, col);
        }

        debug!(
            "Fitted TF-IDF vocabulary: {} terms from {} documents",
            vocabulary.len(),
            documents.len()
        );
        Ok(Self {
            max_features,
            vocabulary,
            idf,
        })
    }

    /// L2-normalized TF-IDF vector for `text`; unknown terms are ignored.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for token in tokenize(text) {
            if let Some(&col) = self.vocabulary.get(&token) {
                *counts.entry(col).or_insert(0.0) += 1.0;
            }
        }
        let (indices, values): (Vec<usize>, Vec<f64>) = counts
            .into_iter()
            .map(|(col, tf)| (col, tf * self.idf[col]))
            .unzip();
        let mut vector = SparseVector::new(indices, values);
        vector.normalize();
        vector
    }

    pub fn fit_transform<S: AsRef<str>>(
        documents: &[S],
        max_features: usize,
    ) -> Result<(Self, Vec<SparseVector>)> {
        let vectorizer = Self::fit(documents, max_features)?;
        let rows = documents
            .iter()
            .map(|d| vectorizer.transform(d.as_ref()))
            .collect();
        Ok((vectorizer, rows))
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn max_features(&self) -> usize {
        self.max_features
    }

    /// Number of text columns.
    pub fn width(&self) -> usize {
        self.idf.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizer_drops_stop_words_and_short_tokens() {
        assert_eq!(
            tokenize("The Ninja fights a DRAGON, x y!"),
            vec!["ninja", "fights", "dragon"]
        );
    }

    #[test]
    fn vocabulary_is_sorted_and_idf_is_smoothed() {
        let docs = ["ninja fights", "ninja battles", "cooking show"];
        let v = TfidfVectorizer::fit(&docs, 5000).unwrap();
        let terms: Vec<&str> = v.vocabulary().keys().map(String::as_str).collect();
        assert_eq!(terms, vec!["battles", "cooking", "fights", "ninja"]);

        let ninja = v.vocabulary()["ninja"];
        let fights = v.vocabulary()["fights"];
        assert!((v.idf()[ninja] - ((4.0_f64 / 3.0).ln() + 1.0)).abs() < 1e-12);
        assert!((v.idf()[fights] - (2.0_f64.ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn max_features_keeps_most_frequent_terms() {
        let docs = ["alpha alpha beta", "alpha gamma", "delta beta"];
        let v = TfidfVectorizer::fit(&docs, 2).unwrap();
        let terms: Vec<&str> = v.vocabulary().keys().map(String::as_str).collect();
        assert_eq!(terms, vec!["alpha", "beta"]);
    }

    #[test]
    fn ties_at_the_cap_prefer_lexicographic_order() {
        let docs = ["zeta", "beta", "alpha"];
        let v = TfidfVectorizer::fit(&docs, 2).unwrap();
        let terms: Vec<&str> = v.vocabulary().keys().map(String::as_str).collect();
        assert_eq!(terms, vec!["alpha", "beta"]);
    }

    #[test]
    fn transform_is_unit_length_and_ignores_unknown_terms() {
        let docs = ["ninja fights", "cooking show"];
        let v = TfidfVectorizer::fit(&docs, 10).unwrap();
        let row = v.transform("ninja ninja spaceship");
        assert_eq!(row.indices, vec![v.vocabulary()["ninja"]]);
        assert!((row.norm() - 1.0).abs() < 1e-12);
        assert!(v.transform("spaceship").is_zero());
    }

    #[test]
    fn empty_corpus_is_rejected() {
        let docs: [&str; 0] = [];
        assert!(matches!(
            TfidfVectorizer::fit(&docs, 10),
            Err(RecommenderError::InvalidArgument { .. })
        ));
    }
}
