//! Flatten MyAnimeList ranking dumps into the tabular dataset format.
//!
//! Input is the JSON array saved from the ranking endpoint,
//! `[{"node": {...}, "ranking": {...}}, ...]`. Each node becomes one CSV row
//! and its `genres` objects are reduced to a list literal of names.

use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{RecommenderError, Result};
use crate::serializers::format_list_literal;

#[derive(Debug, Deserialize)]
struct GenreRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct AnimeNode {
    id: Option<u64>,
    title: Option<String>,
    synopsis: Option<String>,
    mean: Option<f64>,
    rank: Option<u64>,
    popularity: Option<u64>,
    num_list_users: Option<u64>,
    num_scoring_users: Option<u64>,
    start_date: Option<String>,
    end_date: Option<String>,
    media_type: Option<String>,
    status: Option<String>,
    #[serde(default)]
    genres: Option<Vec<GenreRef>>,
}

/// One flattened dataset row, column order as written to CSV.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatAnime {
    pub id: Option<u64>,
    pub title: String,
    pub synopsis: Option<String>,
    pub mean: Option<f64>,
    pub rank: Option<u64>,
    pub popularity: Option<u64>,
    pub num_list_users: Option<u64>,
    pub num_scoring_users: Option<u64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub media_type: Option<String>,
    pub status: Option<String>,
    /// list literal, e.g. `['Action', 'Comedy']`
    pub genres: String,
}

/// Parse a ranking dump and flatten every entry that carries a `node`.
pub fn flatten_ranking<R: Read>(reader: R) -> Result<Vec<FlatAnime>> {
    let entries: Vec<serde_json::Value> = serde_json::from_reader(reader)?;
    let mut rows = Vec::with_capacity(entries.len());

    for (i, mut entry) in entries.into_iter().enumerate() {
        let Some(node) = entry.get_mut("node").map(serde_json::Value::take) else {
            warn!("Skipping ranking entry {}: no 'node' object", i);
            continue;
        };
        let node: AnimeNode = serde_json::from_value(node)?;
        let Some(title) = node.title else {
            warn!("Skipping ranking entry {}: node has no title", i);
            continue;
        };
        let genre_names: Vec<String> = node
            .genres
            .unwrap_or_default()
            .into_iter()
            .map(|g| g.name)
            .collect();

        rows.push(FlatAnime {
            id: node.id,
            title,
            synopsis: node.synopsis,
            mean: node.mean,
            rank: node.rank,
            popularity: node.popularity,
            num_list_users: node.num_list_users,
            num_scoring_users: node.num_scoring_users,
            start_date: node.start_date,
            end_date: node.end_date,
            media_type: node.media_type,
            status: node.status,
            genres: format_list_literal(&genre_names),
        });
    }
    Ok(rows)
}

pub fn write_csv<W: Write>(rows: &[FlatAnime], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Flatten `input` (JSON) into `output` (CSV); returns the number of rows written.
pub fn preprocess_file(input: &Path, output: &Path) -> Result<usize> {
    let file = std::fs::File::open(input).map_err(|e| RecommenderError::Io {
        message: format!("Failed to open {}: {}", input.display(), e),
    })?;
    let rows = flatten_ranking(std::io::BufReader::new(file))?;
    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    write_csv(&rows, std::fs::File::create(output)?)?;
    info!(
        "Flattened {} records from {} into {}",
        rows.len(),
        input.display(),
        output.display()
    );
    Ok(rows.len())
}
