//! Command-line front end for the anime recommender.
//!
//! Usage:
//!   anime-rec                       # interactive prompt, then save artifacts
//!   anime-rec build
//!   anime-rec recommend --title "Naruto" --top-n 10 --mode both
//!   anime-rec describe --synopsis "a ninja seeks revenge" --genre Action
//!   anime-rec preprocess --input data/anime_airing_1000.json --output data/airing.csv
//!   anime-rec inspect

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use prettytable::{Table, row};
use tracing::info;
use tracing_subscriber::EnvFilter;

use anime_recommender::artifacts::ArtifactStore;
use anime_recommender::config::{Config, RuntimeConfig, load_env_file};
use anime_recommender::preprocess;
use anime_recommender::{Catalog, Recommendation, Recommender, RecommenderError};

#[derive(Parser)]
#[command(name = "anime-rec")]
#[command(about = "Content and score/popularity based anime recommendations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit features on the configured dataset and save artifacts
    Build,
    /// Recommend titles similar to a catalog title
    Recommend {
        #[arg(long)]
        title: String,
        #[arg(long)]
        top_n: Option<usize>,
        #[arg(long, value_enum, default_value_t = Mode::Both)]
        mode: Mode,
        /// Use saved artifacts instead of refitting from the dataset
        #[arg(long)]
        from_artifacts: bool,
    },
    /// Rank catalog titles against a free-text description
    Describe {
        #[arg(long)]
        synopsis: String,
        #[arg(long = "genre")]
        genres: Vec<String>,
        #[arg(long)]
        top_n: Option<usize>,
        #[arg(long)]
        from_artifacts: bool,
    },
    /// Flatten a ranking JSON dump into the dataset CSV format
    Preprocess {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// Show the manifest of the saved artifacts
    Inspect,
    /// Prompt for a title, print both recommendation lists, save artifacts
    Interactive,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Content,
    Collaborative,
    Both,
}

fn main() -> Result<()> {
    load_env_file();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(RuntimeConfig::load_from_env().log_level))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load().context("Failed to load configuration")?;

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Build => build(&config),
        Commands::Recommend {
            title,
            top_n,
            mode,
            from_artifacts,
        } => {
            let recommender = load_recommender(&config, from_artifacts)?;
            let top_n = top_n.unwrap_or(config.recommend.top_n);
            recommend_cmd(&recommender, &title, top_n, mode)
        }
        Commands::Describe {
            synopsis,
            genres,
            top_n,
            from_artifacts,
        } => {
            let recommender = load_recommender(&config, from_artifacts)?;
            let top_n = top_n.unwrap_or(config.recommend.top_n);
            let recs = recommender.recommend_for_text(&synopsis, &genres, top_n)?;
            print_table("Closest matches", &recs);
            Ok(())
        }
        Commands::Preprocess { input, output } => {
            let n = preprocess::preprocess_file(&input, &output)?;
            println!("Preprocessing complete: {} rows written to {}", n, output.display());
            Ok(())
        }
        Commands::Inspect => inspect(&config),
        Commands::Interactive => interactive(&config),
    }
}

fn build_from_dataset(config: &Config) -> Result<Recommender> {
    let path = config.data.dataset_path();
    let catalog = Catalog::from_csv_path(&path)
        .with_context(|| format!("Failed to load dataset {}", path.display()))?;
    Ok(Recommender::build(catalog, config.features.max_features)?)
}

fn load_recommender(config: &Config, from_artifacts: bool) -> Result<Recommender> {
    if from_artifacts {
        let store = ArtifactStore::new(&config.data.artifacts_dir);
        let loaded = store
            .load()
            .with_context(|| format!("Failed to load artifacts from {}", store.dir().display()))?;
        Ok(loaded.into_recommender())
    } else {
        build_from_dataset(config)
    }
}

fn build(config: &Config) -> Result<()> {
    let recommender = build_from_dataset(config)?;
    let manifest = ArtifactStore::new(&config.data.artifacts_dir).save(&recommender)?;
    println!(
        "Models saved successfully ({} records, {} text + {} genre features).",
        manifest.rows, manifest.text_width, manifest.genre_width
    );
    Ok(())
}

fn recommend_cmd(recommender: &Recommender, title: &str, top_n: usize, mode: Mode) -> Result<()> {
    if matches!(mode, Mode::Content | Mode::Both) {
        match recommender.rank_content_based(title, top_n) {
            Ok(recs) => print_table("Content-based recommendations", &recs),
            Err(e) => return report_lookup_error(recommender.catalog(), title, e),
        }
    }
    if matches!(mode, Mode::Collaborative | Mode::Both) {
        match recommender.rank_collaborative(title, top_n) {
            Ok(recs) => print_table("Collaborative (score/popularity) recommendations", &recs),
            Err(e) => return report_lookup_error(recommender.catalog(), title, e),
        }
    }
    Ok(())
}

fn report_lookup_error(catalog: &Catalog, title: &str, err: RecommenderError) -> Result<()> {
    if !err.is_not_found() {
        return Err(err.into());
    }
    println!("Title '{}' not found.", title);
    let suggestions = suggest_titles(catalog, title, 3);
    if !suggestions.is_empty() {
        println!("Did you mean: {}", suggestions.join(", "));
    }
    Ok(())
}

/// Closest catalog titles by Jaro-Winkler similarity, best first.
fn suggest_titles(catalog: &Catalog, query: &str, limit: usize) -> Vec<String> {
    let query = query.to_lowercase();
    let mut scored: Vec<(f64, usize)> = catalog
        .records()
        .iter()
        .enumerate()
        .map(|(i, r)| (strsim::jaro_winkler(&query, &r.title.to_lowercase()), i))
        .filter(|(score, _)| *score >= 0.85)
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

    let mut out: Vec<String> = Vec::new();
    for (_, i) in scored {
        let title = catalog.title(i);
        if !out.iter().any(|t| t == title) {
            out.push(title.to_string());
        }
        if out.len() == limit {
            break;
        }
    }
    out
}

fn print_table(heading: &str, recs: &[Recommendation]) {
    println!("\n{}:", heading);
    let mut table = Table::new();
    table.add_row(row!["#", "Title", "Score"]);
    for (rank, rec) in recs.iter().enumerate() {
        table.add_row(row![rank + 1, rec.title, format!("{:.4}", rec.score)]);
    }
    table.printstd();
}

fn inspect(config: &Config) -> Result<()> {
    let store = ArtifactStore::new(&config.data.artifacts_dir);
    let manifest = store.load_manifest()?;
    println!("Artifacts in {}", store.dir().display());
    println!("{}", serde_json::to_string_pretty(&manifest)?);
    Ok(())
}

fn interactive(config: &Config) -> Result<()> {
    let recommender = build_from_dataset(config)?;
    let top_n = config.recommend.top_n;

    print!("Enter an anime title for recommendations: ");
    std::io::stdout().flush()?;
    let mut title = String::new();
    std::io::stdin().lock().read_line(&mut title)?;
    let title = title.trim();

    for (label, result) in [
        (
            "Content-based recommendations",
            recommender.recommend_content_based(title, top_n),
        ),
        (
            "Collaborative (score/popularity) recommendations",
            recommender.recommend_collaborative(title, top_n),
        ),
    ] {
        println!("\n{}:", label);
        match result {
            Ok(titles) => println!("{:?}", titles),
            Err(e) if e.is_not_found() => {
                println!("Title '{}' not found.", title);
                println!("[]");
            }
            Err(e) => return Err(e.into()),
        }
    }

    ArtifactStore::new(&config.data.artifacts_dir).save(&recommender)?;
    info!("Artifacts refreshed after interactive session");
    println!("Models saved successfully.");
    Ok(())
}
