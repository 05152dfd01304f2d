//! Random-forest representation and inference
//!
//! Trees are stored as flat node vectors (node 0 is the root) and evaluated
//! by an iterative index walk. Prediction averages the tree outputs; tree
//! traversal is read-only, so concurrent requests may score the same model
//! without locking.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structural problems detected by [`RandomForestModel::validate`]
#[derive(Debug, Error)]
pub enum ForestError {
    #[error("model has no trees")]
    EmptyForest,

    #[error("tree {tree} is invalid: {reason}")]
    InvalidTree { tree: usize, reason: String },

    #[error("expected {expected} feature importances, found {found}")]
    ImportanceMismatch { expected: usize, found: usize },
}

/// A decision tree node (internal or leaf)
///
/// Internal nodes carry a feature index and threshold and point at their
/// children by index. Leaf nodes are marked with `feature_idx == -1` and
/// carry the prediction in `leaf`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Feature index to split on (-1 for leaf nodes)
    pub feature_idx: i32,

    /// Split threshold; `value <= threshold` goes left
    pub threshold: f64,

    /// Left child index (-1 for leaf nodes)
    pub left: i32,

    /// Right child index (-1 for leaf nodes)
    pub right: i32,

    /// Leaf prediction (Some for leaf nodes, None for internal nodes)
    pub leaf: Option<f64>,
}

impl Node {
    /// Create a new internal (split) node
    pub fn internal(feature_idx: i32, threshold: f64, left: i32, right: i32) -> Self {
        Self {
            feature_idx,
            threshold,
            left,
            right,
            leaf: None,
        }
    }

    /// Create a new leaf node
    pub fn leaf(value: f64) -> Self {
        Self {
            feature_idx: -1,
            threshold: 0.0,
            left: -1,
            right: -1,
            leaf: Some(value),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.feature_idx < 0 || self.leaf.is_some()
    }
}

/// A single regression tree with flat node storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    /// Tree nodes (node 0 is the root)
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Evaluate this tree on a feature vector.
    ///
    /// Malformed structure (dangling index, out-of-range feature) yields
    /// 0.0 rather than panicking; `validate` exists to reject such trees
    /// before they are ever scored.
    pub fn evaluate(&self, features: &[f64]) -> f64 {
        if self.nodes.is_empty() {
            return 0.0;
        }

        let mut idx = 0usize;

        loop {
            if idx >= self.nodes.len() {
                return 0.0;
            }

            let node = &self.nodes[idx];

            if node.is_leaf() {
                return node.leaf.unwrap_or(0.0);
            }

            let feature_idx = node.feature_idx as usize;
            if feature_idx >= features.len() {
                return 0.0;
            }

            idx = if features[feature_idx] <= node.threshold {
                node.left as usize
            } else {
                node.right as usize
            };
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        let count = self.nodes.len() as i32;
        for (i, node) in self.nodes.iter().enumerate() {
            if node.is_leaf() {
                if node.leaf.is_none() {
                    return Err(format!("leaf node {i} has no value"));
                }
                continue;
            }

            if node.left < 0 || node.left >= count || node.right < 0 || node.right >= count {
                return Err(format!(
                    "node {i} points at children {}..{} outside 0..{count}",
                    node.left, node.right
                ));
            }
        }

        Ok(())
    }
}

/// A fitted random-forest regressor plus its static importance vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestModel {
    /// Trees in the ensemble
    pub trees: Vec<Tree>,

    /// Normalized per-feature importance in canonical slot order
    pub feature_importances: Vec<f64>,
}

impl RandomForestModel {
    pub fn new(trees: Vec<Tree>, feature_importances: Vec<f64>) -> Self {
        Self {
            trees,
            feature_importances,
        }
    }

    /// Predict a single target value: the mean of the tree outputs.
    pub fn predict(&self, features: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }

        let sum: f64 = self.trees.iter().map(|tree| tree.evaluate(features)).sum();
        sum / self.trees.len() as f64
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Validate model structure against the expected feature count.
    pub fn validate(&self, feature_count: usize) -> Result<(), ForestError> {
        if self.trees.is_empty() {
            return Err(ForestError::EmptyForest);
        }

        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate().map_err(|reason| ForestError::InvalidTree {
                tree: i,
                reason,
            })?;
        }

        if self.feature_importances.len() != feature_count {
            return Err(ForestError::ImportanceMismatch {
                expected: feature_count,
                found: self.feature_importances.len(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_tree_model() -> RandomForestModel {
        // Tree 1: features[0] <= 50 ? 100 : 200
        let tree1 = Tree::new(vec![
            Node::internal(0, 50.0, 1, 2),
            Node::leaf(100.0),
            Node::leaf(200.0),
        ]);

        // Tree 2: features[1] <= 30 ? -50 : 50
        let tree2 = Tree::new(vec![
            Node::internal(1, 30.0, 1, 2),
            Node::leaf(-50.0),
            Node::leaf(50.0),
        ]);

        RandomForestModel::new(vec![tree1, tree2], vec![0.75, 0.25])
    }

    #[test]
    fn test_tree_evaluate() {
        let model = two_tree_model();
        assert_eq!(model.trees[0].evaluate(&[30.0, 0.0]), 100.0);
        assert_eq!(model.trees[0].evaluate(&[80.0, 0.0]), 200.0);
    }

    #[test]
    fn test_predict_averages_trees() {
        let model = two_tree_model();

        // Tree 1 -> 100, tree 2 -> -50, mean = 25
        assert_eq!(model.predict(&[30.0, 20.0]), 25.0);

        // Tree 1 -> 200, tree 2 -> 50, mean = 125
        assert_eq!(model.predict(&[80.0, 40.0]), 125.0);
    }

    #[test]
    fn test_predict_is_reentrant() {
        let model = two_tree_model();
        let features = [30.0, 20.0];

        let first = model.predict(&features);
        let second = model.predict(&features);
        assert_eq!(first, second);
    }

    #[test]
    fn test_validate_accepts_sound_model() {
        let model = two_tree_model();
        assert!(model.validate(2).is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_forest() {
        let model = RandomForestModel::new(vec![], vec![]);
        assert!(matches!(model.validate(0), Err(ForestError::EmptyForest)));
    }

    #[test]
    fn test_validate_rejects_dangling_child() {
        let tree = Tree::new(vec![Node::internal(0, 1.0, 1, 9), Node::leaf(0.0)]);
        let model = RandomForestModel::new(vec![tree], vec![1.0]);
        assert!(matches!(
            model.validate(1),
            Err(ForestError::InvalidTree { tree: 0, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_importance_mismatch() {
        let mut model = two_tree_model();
        model.feature_importances.pop();
        assert!(matches!(
            model.validate(2),
            Err(ForestError::ImportanceMismatch {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn test_malformed_tree_scores_zero() {
        let tree = Tree::new(vec![Node::internal(5, 1.0, 1, 2)]);
        assert_eq!(tree.evaluate(&[0.0]), 0.0);
    }
}
