pub mod artifacts;
pub mod catalog;
pub mod config;
pub mod deserializers;
pub mod error;
pub mod features;
pub mod preprocess;
pub mod recommend;
pub mod serializers;
pub mod similarity;
pub mod utils;

pub use catalog::{AnimeRecord, Catalog};
pub use error::{RecommenderError, Result};
pub use features::{FeatureMatrix, FittedFeatures, build_features};
pub use recommend::{Recommendation, Recommender, rank, recommend};
pub use similarity::{SimilarityMatrix, compute_similarity};

