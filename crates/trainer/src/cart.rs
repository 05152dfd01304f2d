//! CART regression tree builder
//!
//! Exact-greedy construction: every midpoint between consecutive distinct
//! feature values is a candidate threshold, scored by the reduction in sum
//! of squared errors. Ties keep the first candidate in feature/threshold
//! order, so a given sample set always produces the same tree.

use std::cmp::Ordering;

use ames_model::forest::{Node, Tree};

/// Training parameters for a single tree
#[derive(Clone, Debug)]
pub struct TreeConfig {
    /// Maximum depth; `None` grows until the other limits stop the split
    pub max_depth: Option<usize>,
    /// Minimum number of samples a node needs to be considered for a split
    pub min_samples_split: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
        }
    }
}

#[derive(Debug, Clone)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    gain: f64,
}

/// Builds one regression tree over a row subset and accumulates the SSE
/// reduction each feature contributed, for feature-importance reporting.
pub struct CartBuilder<'a> {
    config: TreeConfig,
    features: &'a [Vec<f64>],
    targets: &'a [f64],
    feature_count: usize,
    importance: Vec<f64>,
}

impl<'a> CartBuilder<'a> {
    pub fn new(features: &'a [Vec<f64>], targets: &'a [f64], config: TreeConfig) -> Self {
        assert_eq!(features.len(), targets.len());

        let feature_count = features.first().map(|row| row.len()).unwrap_or(0);

        Self {
            config,
            features,
            targets,
            feature_count,
            importance: vec![0.0; feature_count],
        }
    }

    /// Build a tree over the given row indices (typically a bootstrap
    /// resample). Returns the tree and the per-feature gain totals.
    pub fn build(mut self, indices: &[usize]) -> (Tree, Vec<f64>) {
        let mut nodes = Vec::new();
        self.build_node(indices, 0, &mut nodes);
        (Tree::new(nodes), self.importance)
    }

    fn build_node(&mut self, indices: &[usize], depth: usize, nodes: &mut Vec<Node>) -> i32 {
        let current_idx = nodes.len() as i32;
        let leaf_value = self.mean_target(indices);

        let depth_exhausted = self
            .config
            .max_depth
            .is_some_and(|max_depth| depth >= max_depth);

        if depth_exhausted || indices.len() < self.config.min_samples_split {
            nodes.push(Node::leaf(leaf_value));
            return current_idx;
        }

        let split = match self.find_best_split(indices) {
            Some(split) if split.gain > 0.0 => split,
            _ => {
                nodes.push(Node::leaf(leaf_value));
                return current_idx;
            }
        };

        let (left_indices, right_indices) =
            self.split_samples(indices, split.feature_idx, split.threshold);

        if left_indices.is_empty() || right_indices.is_empty() {
            nodes.push(Node::leaf(leaf_value));
            return current_idx;
        }

        self.importance[split.feature_idx] += split.gain;

        // Reserve the current node; children fill in below it.
        nodes.push(Node::internal(split.feature_idx as i32, split.threshold, 0, 0));

        let left_idx = self.build_node(&left_indices, depth + 1, nodes);
        let right_idx = self.build_node(&right_indices, depth + 1, nodes);

        nodes[current_idx as usize].left = left_idx;
        nodes[current_idx as usize].right = right_idx;

        current_idx
    }

    /// Scan every feature for the threshold with the largest SSE reduction.
    fn find_best_split(&self, indices: &[usize]) -> Option<SplitCandidate> {
        let parent_sse = self.sse(indices);
        let mut best: Option<SplitCandidate> = None;

        for feature_idx in 0..self.feature_count {
            let mut order: Vec<usize> = indices.to_vec();
            order.sort_by(|&a, &b| {
                self.features[a][feature_idx]
                    .partial_cmp(&self.features[b][feature_idx])
                    .unwrap_or(Ordering::Equal)
            });

            // Prefix sums over the sorted order allow O(1) SSE per cut.
            let n = order.len();
            let mut prefix_sum = vec![0.0; n + 1];
            let mut prefix_sq = vec![0.0; n + 1];
            for (i, &idx) in order.iter().enumerate() {
                let target = self.targets[idx];
                prefix_sum[i + 1] = prefix_sum[i] + target;
                prefix_sq[i + 1] = prefix_sq[i] + target * target;
            }

            let total_sum = prefix_sum[n];
            let total_sq = prefix_sq[n];

            for cut in 1..n {
                let lo = self.features[order[cut - 1]][feature_idx];
                let hi = self.features[order[cut]][feature_idx];
                if lo >= hi {
                    continue;
                }

                let left_n = cut as f64;
                let right_n = (n - cut) as f64;

                let left_sum = prefix_sum[cut];
                let left_sse = prefix_sq[cut] - left_sum * left_sum / left_n;

                let right_sum = total_sum - left_sum;
                let right_sse =
                    (total_sq - prefix_sq[cut]) - right_sum * right_sum / right_n;

                let gain = parent_sse - left_sse - right_sse;

                let candidate = SplitCandidate {
                    feature_idx,
                    threshold: (lo + hi) / 2.0,
                    gain,
                };

                // Strictly-greater keeps the first candidate on ties.
                best = match best {
                    None => Some(candidate),
                    Some(current) if candidate.gain > current.gain => Some(candidate),
                    Some(current) => Some(current),
                };
            }
        }

        best
    }

    fn split_samples(
        &self,
        indices: &[usize],
        feature_idx: usize,
        threshold: f64,
    ) -> (Vec<usize>, Vec<usize>) {
        let mut left = Vec::new();
        let mut right = Vec::new();

        for &idx in indices {
            if self.features[idx][feature_idx] <= threshold {
                left.push(idx);
            } else {
                right.push(idx);
            }
        }

        (left, right)
    }

    fn sse(&self, indices: &[usize]) -> f64 {
        if indices.is_empty() {
            return 0.0;
        }

        let n = indices.len() as f64;
        let sum: f64 = indices.iter().map(|&idx| self.targets[idx]).sum();
        let sq: f64 = indices
            .iter()
            .map(|&idx| self.targets[idx] * self.targets[idx])
            .sum();

        sq - sum * sum / n
    }

    fn mean_target(&self, indices: &[usize]) -> f64 {
        if indices.is_empty() {
            return 0.0;
        }

        let sum: f64 = indices.iter().map(|&idx| self.targets[idx]).sum();
        sum / indices.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        // Target steps at feature 0 == 2.5; feature 1 is noise-free filler.
        let features = vec![
            vec![1.0, 10.0],
            vec![2.0, 20.0],
            vec![3.0, 10.0],
            vec![4.0, 20.0],
        ];
        let targets = vec![100.0, 100.0, 500.0, 500.0];
        (features, targets)
    }

    #[test]
    fn test_splits_on_informative_feature() {
        let (features, targets) = step_data();
        let indices: Vec<usize> = (0..features.len()).collect();

        let builder = CartBuilder::new(&features, &targets, TreeConfig::default());
        let (tree, importance) = builder.build(&indices);

        let root = &tree.nodes[0];
        assert_eq!(root.feature_idx, 0);
        assert_eq!(root.threshold, 2.5);

        assert!(importance[0] > 0.0);
        assert_eq!(importance[1], 0.0);

        assert_eq!(tree.evaluate(&[1.5, 0.0]), 100.0);
        assert_eq!(tree.evaluate(&[3.5, 0.0]), 500.0);
    }

    #[test]
    fn test_max_depth_zero_is_a_stump() {
        let (features, targets) = step_data();
        let indices: Vec<usize> = (0..features.len()).collect();

        let config = TreeConfig {
            max_depth: Some(0),
            min_samples_split: 2,
        };
        let (tree, _) = CartBuilder::new(&features, &targets, config).build(&indices);

        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.nodes[0].leaf, Some(300.0));
    }

    #[test]
    fn test_min_samples_split_stops_growth() {
        let (features, targets) = step_data();
        let indices: Vec<usize> = (0..features.len()).collect();

        let config = TreeConfig {
            max_depth: None,
            min_samples_split: 5,
        };
        let (tree, _) = CartBuilder::new(&features, &targets, config).build(&indices);

        assert_eq!(tree.nodes.len(), 1);
    }

    #[test]
    fn test_constant_target_is_a_leaf() {
        let features = vec![vec![1.0], vec![2.0], vec![3.0]];
        let targets = vec![7.0, 7.0, 7.0];
        let indices = vec![0, 1, 2];

        let (tree, importance) =
            CartBuilder::new(&features, &targets, TreeConfig::default()).build(&indices);

        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.nodes[0].leaf, Some(7.0));
        assert_eq!(importance, vec![0.0]);
    }

    #[test]
    fn test_deterministic_construction() {
        let (features, targets) = step_data();
        let indices: Vec<usize> = (0..features.len()).collect();

        let (tree1, _) =
            CartBuilder::new(&features, &targets, TreeConfig::default()).build(&indices);
        let (tree2, _) =
            CartBuilder::new(&features, &targets, TreeConfig::default()).build(&indices);

        assert_eq!(tree1, tree2);
    }
}
