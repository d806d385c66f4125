use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::SparseVector;

/// Multi-hot genre encoder; column order is the sorted set of genre names seen at fit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreEncoder {
    classes: Vec<String>,
}

impl GenreEncoder {
    pub fn fit<'a, I>(genre_lists: I) -> Self
    where
        I: IntoIterator<Item = &'a [String]>,
    {
        let set: BTreeSet<&str> = genre_lists
            .into_iter()
            .flat_map(|genres| genres.iter().map(String::as_str))
            .collect();
        Self {
            classes: set.into_iter().map(str::to_string).collect(),
        }
    }

    /// 1.0 at the column of every known genre in `genres`; duplicates count once.
    pub fn transform(&self, genres: &[String]) -> SparseVector {
        let mut cols: Vec<usize> = Vec::with_capacity(genres.len());
        for genre in genres {
            match self.classes.binary_search(genre) {
                Ok(col) => cols.push(col),
                Err(_) => debug!("Ignoring genre '{}' unknown to the encoder", genre),
            }
        }
        cols.sort_unstable();
        cols.dedup();
        let values = vec![1.0; cols.len()];
        SparseVector::new(cols, values)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Number of genre columns.
    pub fn width(&self) -> usize {
        self.classes.len()
    }
}
