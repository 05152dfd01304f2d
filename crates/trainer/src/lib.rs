//! Ames price trainer
//!
//! Offline pipeline that mirrors the serving-time encoding over a training
//! CSV, fits a random forest with a small cross-validated grid search, and
//! persists the artifact the prediction service consumes.

pub mod cart;
pub mod dataset;
pub mod forest;
pub mod metrics;
pub mod sampling;
pub mod search;

use std::path::Path;

use ames_model::Artifact;
use anyhow::{Context, Result};

pub use cart::TreeConfig;
pub use dataset::Dataset;
pub use forest::{ForestConfig, ForestTrainer};
pub use sampling::LcgRng;
pub use search::{grid_search, ParamGrid, SelectedConfig};

/// Train an artifact directly from a CSV file with the given grid.
///
/// Convenience wrapper over the full pipeline: load, split, grid-search,
/// refit, bundle. The caller owns reporting and persistence.
pub fn train_artifact_from_csv(
    path: &Path,
    grid: &ParamGrid,
    folds: usize,
    test_fraction: f64,
    seed: i64,
) -> Result<(Artifact, TrainingReport)> {
    let dataset = Dataset::from_csv(path).context("failed to load dataset")?;

    let (train_idx, test_idx) =
        sampling::train_test_split(dataset.len(), test_fraction, seed);

    let selected = grid_search(&dataset.features, &dataset.targets, &train_idx, grid, folds, seed);

    let trainer = ForestTrainer::new(selected.config.clone());
    let model = trainer.fit_subset(&dataset.features, &dataset.targets, &train_idx);

    let predicted: Vec<f64> = test_idx
        .iter()
        .map(|&i| model.predict(&dataset.features[i]))
        .collect();
    let actual: Vec<f64> = test_idx.iter().map(|&i| dataset.targets[i]).collect();

    let report = TrainingReport {
        samples: dataset.len(),
        train_samples: train_idx.len(),
        test_samples: test_idx.len(),
        selected: selected.clone(),
        r2: metrics::r2_score(&actual, &predicted),
        rmse: metrics::rmse(&actual, &predicted),
        mae: metrics::mae(&actual, &predicted),
    };

    let artifact = Artifact::new(model, dataset.vocab);
    Ok((artifact, report))
}

/// Summary of a completed training run
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub samples: usize,
    pub train_samples: usize,
    pub test_samples: usize,
    pub selected: SelectedConfig,
    pub r2: f64,
    pub rmse: f64,
    pub mae: f64,
}
