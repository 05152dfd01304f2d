//! Ames price trainer CLI
//!
//! Offline trainer: loads the housing CSV, runs the cross-validated grid
//! search, reports test metrics and feature importances, and persists the
//! artifact the prediction service loads at startup.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use ames_trainer::{train_artifact_from_csv, ParamGrid};

#[derive(Parser, Debug)]
#[command(name = "ames-train")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Random-forest trainer for the Ames price service", long_about = None)]
struct Args {
    /// Input CSV dataset path (headered, Ames column labels)
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for the artifact and its hash
    #[arg(short, long, default_value = "models/ames")]
    output: PathBuf,

    /// Tree counts to grid-search
    #[arg(long, value_delimiter = ',', default_value = "100,200")]
    trees: Vec<usize>,

    /// Max depths to grid-search (0 means unlimited)
    #[arg(long, value_delimiter = ',', default_value = "10,20,0")]
    max_depth: Vec<usize>,

    /// Minimum split sizes to grid-search
    #[arg(long, value_delimiter = ',', default_value = "2,5")]
    min_split: Vec<usize>,

    /// Cross-validation fold count
    #[arg(long, default_value = "3")]
    folds: usize,

    /// Held-out test fraction
    #[arg(long, default_value = "0.2")]
    test_fraction: f64,

    /// Random seed for splitting and bootstrap sampling
    #[arg(long, default_value = "42")]
    seed: i64,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("Ames price trainer v{}", env!("CARGO_PKG_VERSION"));

    let grid = ParamGrid {
        num_trees: args.trees.clone(),
        max_depth: args
            .max_depth
            .iter()
            .map(|&depth| if depth == 0 { None } else { Some(depth) })
            .collect(),
        min_samples_split: args.min_split.clone(),
    };

    info!("Loading dataset from: {}", args.input.display());
    let (artifact, report) = train_artifact_from_csv(
        &args.input,
        &grid,
        args.folds,
        args.test_fraction,
        args.seed,
    )?;

    info!(
        "Loaded {} complete samples ({} train / {} test)",
        report.samples, report.train_samples, report.test_samples
    );
    info!(
        "Selected configuration: trees={} max_depth={:?} min_split={} (cv rmse {:.2})",
        report.selected.config.num_trees,
        report.selected.config.max_depth,
        report.selected.config.min_samples_split,
        report.selected.cv_rmse
    );

    info!("Model performance on test set:");
    info!("  R2:   {:.4}", report.r2);
    info!("  RMSE: {:.2}", report.rmse);
    info!("  MAE:  {:.2}", report.mae);

    info!("Feature importances:");
    let mut ranked: Vec<(&String, f64)> = artifact
        .feature_names
        .iter()
        .zip(artifact.model.feature_importances.iter().copied())
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    for (name, importance) in ranked {
        info!("  {name}: {importance:.3}");
    }

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;

    let artifact_path = args.output.join("artifact.json");
    artifact
        .save(&artifact_path)
        .context("failed to write artifact")?;

    let hash_hex = artifact.hash_hex().context("failed to hash artifact")?;
    let hash_path = args.output.join("artifact.hash");
    std::fs::write(&hash_path, &hash_hex).context("failed to write hash file")?;

    info!("Artifact: {}", artifact_path.display());
    info!("Hash:     {hash_hex}");

    Ok(())
}
