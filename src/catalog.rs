//! The anime catalog: records loaded once, in a fixed row order.
//!
//! Row `i` of the catalog is the join key for feature row `i` and for row and
//! column `i` of every similarity matrix, so the record order is never changed
//! after load.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::deserializers::parse_list_literal;
use crate::error::{RecommenderError, Result};
use crate::serializers::format_list_literal;

/// One row of the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimeRecord {
    pub title: String,
    pub synopsis: String,
    pub genres: Vec<String>,
    pub mean: f64,
    pub popularity: f64,
}

impl AnimeRecord {
    pub fn new(
        title: impl Into<String>,
        synopsis: impl Into<String>,
        genres: &[&str],
        mean: f64,
        popularity: f64,
    ) -> Self {
        Self {
            title: title.into(),
            synopsis: synopsis.into(),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            mean,
            popularity,
        }
    }
}

/// CSV row as stored on disk. Columns other than these are ignored.
#[derive(Debug, Deserialize)]
struct CsvRow {
    title: String,
    #[serde(default)]
    synopsis: Option<String>,
    #[serde(default)]
    genres: Option<String>,
    #[serde(default)]
    mean: Option<f64>,
    #[serde(default)]
    popularity: Option<f64>,
}

#[derive(Debug, Serialize)]
struct CsvRowOut<'a> {
    title: &'a str,
    synopsis: &'a str,
    genres: String,
    mean: f64,
    popularity: f64,
}

/// Missing, NaN and infinite numbers all count as 0.
fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Ordered, immutable collection of records plus a first-occurrence title index.
#[derive(Debug, Clone)]
pub struct Catalog {
    records: Vec<AnimeRecord>,
    /// lowercased title → lowest row index carrying it
    title_index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(records: Vec<AnimeRecord>) -> Self {
        let mut title_index = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            title_index.entry(record.title.to_lowercase()).or_insert(i);
        }
        Self {
            records,
            title_index,
        }
    }

    /// Read a catalog from CSV with at least a `title` column.
    ///
    /// Missing synopsis becomes `""`, missing genres `[]`, missing mean and
    /// popularity `0`, as do non-finite numbers (`NaN`, `inf`). A genres
    /// value that is not a list literal fails the whole load with
    /// [`RecommenderError::MalformedField`].
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for (row, result) in rdr.deserialize::<CsvRow>().enumerate() {
            let raw = result?;
            let genres = match raw.genres.as_deref() {
                None => Vec::new(),
                Some(text) => {
                    parse_list_literal(text).map_err(|message| {
                        RecommenderError::MalformedField {
                            row,
                            field: "genres".to_string(),
                            message,
                        }
                    })?
                }
            };
            records.push(AnimeRecord {
                title: raw.title,
                synopsis: raw.synopsis.unwrap_or_default(),
                genres,
                mean: finite_or_zero(raw.mean),
                popularity: finite_or_zero(raw.popularity),
            });
        }

        debug!("Parsed {} catalog rows", records.len());
        Ok(Self::new(records))
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| RecommenderError::Io {
            message: format!("Failed to open dataset {}: {}", path.display(), e),
        })?;
        let catalog = Self::from_csv_reader(file)?;
        info!(
            "Loaded {} anime records from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Write the catalog in load order with the five core columns.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for record in &self.records {
            wtr.serialize(CsvRowOut {
                title: &record.title,
                synopsis: &record.synopsis,
                genres: format_list_literal(&record.genres),
                mean: record.mean,
                popularity: record.popularity,
            })?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        Ok(buf)
    }

    /// Row index of the first record whose title equals `title` ignoring case.
    pub fn find(&self, title: &str) -> Option<usize> {
        self.title_index.get(&title.to_lowercase()).copied()
    }

    pub fn get(&self, index: usize) -> Option<&AnimeRecord> {
        self.records.get(index)
    }

    pub fn title(&self, index: usize) -> &str {
        &self.records[index].title
    }

    pub fn records(&self) -> &[AnimeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
id,title,synopsis,mean,popularity,genres,status
1,Naruto,A young ninja.,8.0,10,\"['Action', 'Adventure']\",finished
2,Cowboy Bebop,,8.7,,[],finished
3,naruto,Another entry.,,5,,finished
";

    #[test]
    fn loads_rows_with_defaults() {
        let catalog = Catalog::from_csv_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 3);

        let naruto = catalog.get(0).unwrap();
        assert_eq!(naruto.genres, vec!["Action", "Adventure"]);
        assert_eq!(naruto.popularity, 10.0);

        let bebop = catalog.get(1).unwrap();
        assert_eq!(bebop.synopsis, "");
        assert!(bebop.genres.is_empty());
        assert_eq!(bebop.popularity, 0.0);

        let dup = catalog.get(2).unwrap();
        assert_eq!(dup.mean, 0.0);
        assert!(dup.genres.is_empty());
    }

    #[test]
    fn lookup_is_case_insensitive_and_keeps_first_row() {
        let catalog = Catalog::from_csv_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(catalog.find("NARUTO"), Some(0));
        assert_eq!(catalog.find("naruto"), Some(0));
        assert_eq!(catalog.find("cowboy bebop"), Some(1));
        assert_eq!(catalog.find("Naru"), None);
    }

    #[test]
    fn malformed_genres_name_the_row() {
        let csv = "title,genres\nA,['Action']\nB,Action|Comedy\n";
        let err = Catalog::from_csv_reader(csv.as_bytes()).unwrap_err();
        match err {
            RecommenderError::MalformedField { row, field, .. } => {
                assert_eq!(row, 1);
                assert_eq!(field, "genres");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_finite_numbers_become_zero() {
        let csv = "title,mean,popularity\nA,NaN,1\nB,inf,-inf\nC,nan,3\n";
        let catalog = Catalog::from_csv_reader(csv.as_bytes()).unwrap();
        let values: Vec<(f64, f64)> = catalog
            .records()
            .iter()
            .map(|r| (r.mean, r.popularity))
            .collect();
        assert_eq!(values, vec![(0.0, 1.0), (0.0, 0.0), (0.0, 3.0)]);
    }

    #[test]
    fn csv_write_preserves_order_and_fields() {
        let catalog = Catalog::from_csv_reader(SAMPLE.as_bytes()).unwrap();
        let bytes = catalog.to_csv_bytes().unwrap();
        let reloaded = Catalog::from_csv_reader(bytes.as_slice()).unwrap();
        assert_eq!(catalog.records(), reloaded.records());
    }
}
