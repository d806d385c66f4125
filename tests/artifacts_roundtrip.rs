use std::path::PathBuf;

use anime_recommender::artifacts::{ArtifactStore, DATASET_FILE, FEATURES_FILE, MANIFEST_FILE};
use anime_recommender::{AnimeRecord, Catalog, Recommender, RecommenderError};

/// Unique scratch directory, removed on drop.
struct ScratchDir(PathBuf);

impl ScratchDir {
    fn new(tag: &str) -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "anime-rec-{}-{}-{}",
            tag,
            std::process::id(),
            nanos
        ));
        std::fs::create_dir_all(&dir).unwrap();
        Self(dir)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

fn recommender() -> Recommender {
    let catalog = Catalog::new(vec![
        AnimeRecord::new(
            "Naruto",
            "A young ninja trains hard.",
            &["Action", "Adventure"],
            8.0,
            10.0,
        ),
        AnimeRecord::new(
            "Boruto",
            "The son of a ninja, with a team.",
            &["Action"],
            6.0,
            90.0,
        ),
        AnimeRecord::new(
            "Girls' Band",
            "Girls form a rock band,\nthen tour.",
            &["Music", "Girls' Love"],
            7.7,
            400.0,
        ),
        AnimeRecord::new("Empty", "", &[], 0.0, 0.0),
    ]);
    Recommender::build(catalog, 5000).unwrap()
}

#[test]
fn saved_artifacts_reproduce_recommendations() {
    let scratch = ScratchDir::new("roundtrip");
    let original = recommender();
    let store = ArtifactStore::new(&scratch.0);
    let manifest = store.save(&original).unwrap();
    assert_eq!(manifest.rows, 4);

    let loaded = store.load().unwrap();
    assert_eq!(loaded.manifest, manifest);
    assert_eq!(loaded.catalog.records(), original.catalog().records());
    assert_eq!(&loaded.features.matrix, original.feature_matrix());
    assert_eq!(loaded.features.vectorizer, original.features().vectorizer);
    assert_eq!(loaded.features.encoder, original.features().encoder);

    let reloaded = loaded.into_recommender();
    for title in ["Naruto", "boruto", "GIRLS' BAND", "Empty"] {
        assert_eq!(
            reloaded.recommend_content_based(title, 3).unwrap(),
            original.recommend_content_based(title, 3).unwrap()
        );
        assert_eq!(
            reloaded.recommend_collaborative(title, 3).unwrap(),
            original.recommend_collaborative(title, 3).unwrap()
        );
    }
}

#[test]
fn edited_dataset_is_refused() {
    let scratch = ScratchDir::new("tamper");
    let store = ArtifactStore::new(&scratch.0);
    store.save(&recommender()).unwrap();

    let path = scratch.0.join(DATASET_FILE);
    let mut csv = std::fs::read_to_string(&path).unwrap();
    csv.push_str("Extra,,[],0.0,0.0\n");
    std::fs::write(&path, csv).unwrap();

    assert!(matches!(
        store.load(),
        Err(RecommenderError::ArtifactMismatch { .. })
    ));
}

#[test]
fn missing_files_are_io_errors() {
    let scratch = ScratchDir::new("missing");
    let store = ArtifactStore::new(&scratch.0);
    assert!(matches!(store.load(), Err(RecommenderError::Io { .. })));

    store.save(&recommender()).unwrap();
    std::fs::remove_file(scratch.0.join(FEATURES_FILE)).unwrap();
    assert!(matches!(store.load(), Err(RecommenderError::Io { .. })));
    assert!(scratch.0.join(MANIFEST_FILE).exists());
}
