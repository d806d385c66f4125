use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{RecommenderError, Result};

/// Main configuration structure loaded from anime_recommender.toml and environment variables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub features: FeaturesConfig,
    #[serde(default)]
    pub recommend: RecommendConfig,
    /// Runtime configuration loaded from environment variables
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

/// Where the dataset and the persisted artifacts live
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DataConfig {
    pub data_dir: PathBuf,
    /// Dataset CSV, relative to `data_dir` unless absolute
    pub dataset: PathBuf,
    pub artifacts_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            dataset: PathBuf::from("anime_nonairing_1000_preprocessed.csv"),
            artifacts_dir: PathBuf::from("data"),
        }
    }
}

impl DataConfig {
    pub fn dataset_path(&self) -> PathBuf {
        self.data_dir.join(&self.dataset)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeaturesConfig {
    /// Vocabulary cap for the synopsis TF-IDF
    pub max_features: usize,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self { max_features: 5000 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RecommendConfig {
    pub top_n: usize,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            top_n: crate::recommend::DEFAULT_TOP_N,
        }
    }
}

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub log_level: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_level: "anime_recommender=info".to_string(),
        }
    }
}

impl RuntimeConfig {
    pub fn load_from_env() -> Self {
        Self {
            log_level: std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "anime_recommender=info".to_string()),
        }
    }
}

impl Config {
    /// Load configuration from TOML file and environment variables
    /// Uses ANIME_REC_CONFIG environment variable or defaults to "anime_recommender.toml"
    pub fn load() -> Result<Self> {
        load_env_file();

        let config_path = std::env::var("ANIME_REC_CONFIG")
            .unwrap_or_else(|_| "anime_recommender.toml".to_string());

        let mut config = match std::fs::read_to_string(&config_path) {
            Ok(content) => Self::from_toml_str(&content)?,
            Err(_) => {
                tracing::warn!("Config file {} not found, using defaults", config_path);
                Self::default()
            }
        };

        config.apply_env_overrides()?;
        config.runtime = RuntimeConfig::load_from_env();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Env-first overrides for paths and tuning knobs
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(dir) = std::env::var("ANIME_DATA_DIR") {
            self.data.data_dir = PathBuf::from(dir);
            tracing::debug!("ANIME_DATA_DIR env override applied");
        }
        if let Ok(dataset) = std::env::var("ANIME_DATASET") {
            self.data.dataset = PathBuf::from(dataset);
            tracing::debug!("ANIME_DATASET env override applied");
        }
        if let Ok(dir) = std::env::var("ANIME_ARTIFACTS_DIR") {
            self.data.artifacts_dir = PathBuf::from(dir);
            tracing::debug!("ANIME_ARTIFACTS_DIR env override applied");
        }
        if let Ok(v) = std::env::var("ANIME_MAX_FEATURES") {
            self.features.max_features = parse_env("ANIME_MAX_FEATURES", &v)?;
        }
        if let Ok(v) = std::env::var("ANIME_TOP_N") {
            self.recommend.top_n = parse_env("ANIME_TOP_N", &v)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.recommend.top_n == 0 {
            return Err(RecommenderError::Config {
                message: "recommend.top_n must be at least 1".to_string(),
            });
        }
        if self.features.max_features == 0 {
            return Err(RecommenderError::Config {
                message: "features.max_features must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_env(name: &str, value: &str) -> Result<usize> {
    value.trim().parse().map_err(|_| RecommenderError::Config {
        message: format!("{name} must be a non-negative integer, got '{value}'"),
    })
}

/// Load variables from an env file without overriding ones already set.
///
/// Looks at `ANIME_REC_ENV_FILE` if set, else `./.env`, else `../.env`. Safe to
/// call more than once; the binary calls it before installing the log
/// subscriber so a `RUST_LOG` in the file takes effect.
pub fn load_env_file() {
    if let Ok(env_path) = std::env::var("ANIME_REC_ENV_FILE") {
        let _ = dotenvy::from_path(env_path);
    } else if dotenvy::from_path(".env").is_err() {
        let _ = dotenvy::from_path("../.env");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml_str("[recommend]\ntop_n = 8\n").unwrap();
        assert_eq!(config.recommend.top_n, 8);
        assert_eq!(config.features.max_features, 5000);
        assert_eq!(
            config.data.dataset_path(),
            PathBuf::from("data/anime_nonairing_1000_preprocessed.csv")
        );
    }

    #[test]
    fn zero_values_fail_validation() {
        let config = Config::from_toml_str("[recommend]\ntop_n = 0\n").unwrap();
        assert!(config.validate().is_err());
        let config = Config::from_toml_str("[features]\nmax_features = 0\n").unwrap();
        assert!(config.validate().is_err());
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn bad_toml_is_a_config_error() {
        assert!(matches!(
            Config::from_toml_str("[recommend]\ntop_n = \"many\"\n"),
            Err(RecommenderError::Config { .. })
        ));
    }

    #[test]
    fn env_file_is_loaded_from_configured_path() {
        let path = std::env::temp_dir().join(format!("anime-rec-env-{}.env", std::process::id()));
        std::fs::write(&path, "ANIME_REC_TEST_LOG_LEVEL=anime_recommender=debug\n").unwrap();
        unsafe {
            std::env::set_var("ANIME_REC_ENV_FILE", &path);
        }

        load_env_file();
        assert_eq!(
            std::env::var("ANIME_REC_TEST_LOG_LEVEL").unwrap(),
            "anime_recommender=debug"
        );

        unsafe {
            std::env::remove_var("ANIME_REC_ENV_FILE");
        }
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn env_numbers_must_parse() {
        assert_eq!(parse_env("X", " 12 ").unwrap(), 12);
        assert!(parse_env("X", "-1").is_err());
    }
}
