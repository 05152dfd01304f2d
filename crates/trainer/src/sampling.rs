//! Deterministic sampling utilities
//!
//! A fixed seed must reproduce the same model bit-for-bit across runs, so
//! all randomness flows through a small LCG rather than a platform RNG.

use std::num::Wrapping;

/// Linear Congruential Generator for deterministic pseudo-randomness
/// Uses constants from Numerical Recipes (glibc)
#[derive(Clone, Debug)]
pub struct LcgRng {
    state: Wrapping<i64>,
}

impl LcgRng {
    const MULTIPLIER: i64 = 1103515245;
    const INCREMENT: i64 = 12345;
    const MODULUS: i64 = 1 << 31;

    pub fn new(seed: i64) -> Self {
        Self {
            state: Wrapping(seed.abs() % Self::MODULUS),
        }
    }

    /// Generate next random i64 in range [0, MODULUS)
    pub fn next_i64(&mut self) -> i64 {
        self.state = self.state * Wrapping(Self::MULTIPLIER) + Wrapping(Self::INCREMENT);
        (self.state.0 & (Self::MODULUS - 1)).abs()
    }

    /// Generate a random index in range [0, len)
    pub fn next_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        (self.next_i64() % len as i64) as usize
    }
}

/// Fisher-Yates shuffle of the indices 0..n, driven by the seed.
pub fn shuffle_indices(n: usize, seed: i64) -> Vec<usize> {
    let mut rng = LcgRng::new(seed);
    let mut indices: Vec<usize> = (0..n).collect();

    for i in (1..n).rev() {
        let j = rng.next_index(i + 1);
        indices.swap(i, j);
    }

    indices
}

/// Split 0..n into shuffled (train, test) index sets.
///
/// `test_fraction` is clamped so both partitions are non-empty whenever
/// n >= 2.
pub fn train_test_split(n: usize, test_fraction: f64, seed: i64) -> (Vec<usize>, Vec<usize>) {
    let shuffled = shuffle_indices(n, seed);

    let mut test_len = (n as f64 * test_fraction).round() as usize;
    if n >= 2 {
        test_len = test_len.clamp(1, n - 1);
    }

    let (test, train) = shuffled.split_at(test_len);
    (train.to_vec(), test.to_vec())
}

/// Partition indices into k cross-validation folds.
///
/// Returns (train, validation) index pairs. Fold sizes differ by at most
/// one; the input order is preserved, so callers pass already-shuffled
/// indices.
pub fn kfold(indices: &[usize], k: usize) -> Vec<(Vec<usize>, Vec<usize>)> {
    let k = k.max(2).min(indices.len());
    let mut folds = Vec::with_capacity(k);

    for fold in 0..k {
        let validation: Vec<usize> = indices
            .iter()
            .enumerate()
            .filter(|(i, _)| i % k == fold)
            .map(|(_, &idx)| idx)
            .collect();
        let train: Vec<usize> = indices
            .iter()
            .enumerate()
            .filter(|(i, _)| i % k != fold)
            .map(|(_, &idx)| idx)
            .collect();

        folds.push((train, validation));
    }

    folds
}

/// Draw a bootstrap resample (with replacement) of the given indices.
pub fn bootstrap(rng: &mut LcgRng, indices: &[usize]) -> Vec<usize> {
    (0..indices.len())
        .map(|_| indices[rng.next_index(indices.len())])
        .collect()
}
