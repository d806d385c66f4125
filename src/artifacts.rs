//! Persisted model artifacts.
//!
//! One directory holds the fitted vectorizer, the genre encoder, the feature
//! matrix, the dataset they were built from and a manifest tying them
//! together. Row `i` of the matrix always belongs to row `i` of the CSV; the
//! manifest fingerprint and shape checks refuse to load a directory where that
//! no longer holds.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::error::{RecommenderError, Result};
use crate::features::{FeatureMatrix, FittedFeatures, GenreEncoder, TfidfVectorizer};
use crate::recommend::Recommender;

pub const VECTORIZER_FILE: &str = "tfidf_vectorizer.json";
pub const ENCODER_FILE: &str = "genre_encoder.json";
pub const FEATURES_FILE: &str = "features_matrix.msgpack";
pub const DATASET_FILE: &str = "anime_recommender_df.csv";
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub rows: usize,
    pub text_width: usize,
    pub genre_width: usize,
    pub max_features: usize,
    /// blake3 hex digest of the persisted dataset CSV bytes
    pub dataset_blake3: String,
    pub created_at: DateTime<Utc>,
}

/// Everything read back from an artifact directory, already cross-checked.
#[derive(Debug, Clone)]
pub struct LoadedArtifacts {
    pub manifest: Manifest,
    pub catalog: Catalog,
    pub features: FittedFeatures,
}

impl LoadedArtifacts {
    pub fn into_recommender(self) -> Recommender {
        Recommender::from_parts(self.catalog, self.features)
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    pub fn save(&self, recommender: &Recommender) -> Result<Manifest> {
        fs::create_dir_all(&self.dir)?;
        let features = recommender.features();
        let dataset = recommender.catalog().to_csv_bytes()?;

        let manifest = Manifest {
            rows: recommender.catalog().len(),
            text_width: features.matrix.text_width,
            genre_width: features.matrix.genre_width,
            max_features: features.vectorizer.max_features(),
            dataset_blake3: blake3::hash(&dataset).to_hex().to_string(),
            created_at: Utc::now(),
        };

        fs::write(self.path(DATASET_FILE), &dataset)?;
        fs::write(
            self.path(VECTORIZER_FILE),
            serde_json::to_vec_pretty(&features.vectorizer)?,
        )?;
        fs::write(
            self.path(ENCODER_FILE),
            serde_json::to_vec_pretty(&features.encoder)?,
        )?;
        fs::write(self.path(FEATURES_FILE), rmp_serde::to_vec(&features.matrix)?)?;
        // Manifest last: a directory without one was never completely written.
        fs::write(self.path(MANIFEST_FILE), serde_json::to_vec_pretty(&manifest)?)?;

        info!(
            "Saved artifacts for {} records to {}",
            manifest.rows,
            self.dir.display()
        );
        Ok(manifest)
    }

    pub fn load_manifest(&self) -> Result<Manifest> {
        self.read_json(MANIFEST_FILE)
    }

    pub fn load(&self) -> Result<LoadedArtifacts> {
        let manifest = self.load_manifest()?;

        let dataset = self.read(DATASET_FILE)?;
        let digest = blake3::hash(&dataset).to_hex().to_string();
        if digest != manifest.dataset_blake3 {
            return Err(RecommenderError::artifact_mismatch(format!(
                "{} fingerprint {} does not match manifest {}",
                DATASET_FILE, digest, manifest.dataset_blake3
            )));
        }
        let catalog = Catalog::from_csv_reader(dataset.as_slice())?;

        let vectorizer: TfidfVectorizer = self.read_json(VECTORIZER_FILE)?;
        let encoder: GenreEncoder = self.read_json(ENCODER_FILE)?;
        let matrix: FeatureMatrix = rmp_serde::from_slice(&self.read(FEATURES_FILE)?)?;

        check_shape("dataset rows", manifest.rows, catalog.len())?;
        check_shape("feature rows", manifest.rows, matrix.n_rows())?;
        check_shape("vectorizer width", manifest.text_width, vectorizer.width())?;
        check_shape("matrix text width", manifest.text_width, matrix.text_width)?;
        check_shape("encoder width", manifest.genre_width, encoder.width())?;
        check_shape("matrix genre width", manifest.genre_width, matrix.genre_width)?;
        check_shape(
            "max_features",
            manifest.max_features,
            vectorizer.max_features(),
        )?;

        debug!(
            "Loaded artifacts from {} (created {})",
            self.dir.display(),
            manifest.created_at
        );
        Ok(LoadedArtifacts {
            manifest,
            catalog,
            features: FittedFeatures {
                matrix,
                vectorizer,
                encoder,
            },
        })
    }

    fn read(&self, file: &str) -> Result<Vec<u8>> {
        let path = self.path(file);
        fs::read(&path).map_err(|e| RecommenderError::Io {
            message: format!("Failed to read {}: {}", path.display(), e),
        })
    }

    fn read_json<T: DeserializeOwned>(&self, file: &str) -> Result<T> {
        Ok(serde_json::from_slice(&self.read(file)?)?)
    }
}

fn check_shape(what: &str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(RecommenderError::artifact_mismatch(format!(
            "{what}: manifest says {expected}, artifact has {actual}"
        )));
    }
    Ok(())
}
