//! Random-forest fitting
//!
//! Fits `num_trees` CART trees on bootstrap resamples and aggregates their
//! split gains into a normalized feature-importance vector. Each tree seeds
//! its own RNG from the run seed and the tree index, so the whole ensemble
//! is reproducible.

use ames_model::RandomForestModel;
use tracing::debug;

use crate::cart::{CartBuilder, TreeConfig};
use crate::sampling::{bootstrap, LcgRng};

/// Random-forest training configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForestConfig {
    pub num_trees: usize,
    /// `None` grows trees until the split limits stop them
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub seed: i64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            num_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

/// Random-forest trainer
pub struct ForestTrainer {
    config: ForestConfig,
}

impl ForestTrainer {
    pub fn new(config: ForestConfig) -> Self {
        Self { config }
    }

    /// Fit a forest on every row of the dataset.
    pub fn fit(&self, features: &[Vec<f64>], targets: &[f64]) -> RandomForestModel {
        let indices: Vec<usize> = (0..features.len()).collect();
        self.fit_subset(features, targets, &indices)
    }

    /// Fit a forest on a row subset (training partition or CV fold).
    pub fn fit_subset(
        &self,
        features: &[Vec<f64>],
        targets: &[f64],
        indices: &[usize],
    ) -> RandomForestModel {
        let feature_count = features.first().map(|row| row.len()).unwrap_or(0);
        let mut importance_totals = vec![0.0; feature_count];
        let mut trees = Vec::with_capacity(self.config.num_trees);

        for tree_idx in 0..self.config.num_trees {
            debug!("fitting tree {}/{}", tree_idx + 1, self.config.num_trees);

            // Offset by a prime so neighboring seeds do not share bootstrap
            // streams.
            let mut rng = LcgRng::new(self.config.seed + 7919 * (tree_idx as i64 + 1));
            let sample = bootstrap(&mut rng, indices);

            let tree_config = TreeConfig {
                max_depth: self.config.max_depth,
                min_samples_split: self.config.min_samples_split,
            };

            let builder = CartBuilder::new(features, targets, tree_config);
            let (tree, gains) = builder.build(&sample);

            for (total, gain) in importance_totals.iter_mut().zip(&gains) {
                *total += gain;
            }

            trees.push(tree);
        }

        let feature_importances = normalize(importance_totals);
        RandomForestModel::new(trees, feature_importances)
    }
}

/// Scale gain totals so they sum to 1; all-zero totals stay zero.
fn normalize(totals: Vec<f64>) -> Vec<f64> {
    let sum: f64 = totals.iter().sum();
    if sum <= 0.0 {
        return totals;
    }
    totals.into_iter().map(|total| total / sum).collect()
}
