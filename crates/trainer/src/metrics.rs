//! Regression metrics for the held-out test partition

/// Coefficient of determination.
///
/// Returns 0.0 for a constant target (zero total variance), matching the
/// convention that the model explains nothing a mean predictor would not.
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    assert_eq!(actual.len(), predicted.len());
    if actual.is_empty() {
        return 0.0;
    }

    let mean = actual.iter().sum::<f64>() / actual.len() as f64;

    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p) * (a - p))
        .sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - mean) * (a - mean)).sum();

    if ss_tot == 0.0 {
        return 0.0;
    }

    1.0 - ss_res / ss_tot
}

/// Root-mean-squared error.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    assert_eq!(actual.len(), predicted.len());
    if actual.is_empty() {
        return 0.0;
    }

    let mse: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p) * (a - p))
        .sum::<f64>()
        / actual.len() as f64;

    mse.sqrt()
}

/// Mean absolute error.
pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    assert_eq!(actual.len(), predicted.len());
    if actual.is_empty() {
        return 0.0;
    }

    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / actual.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_prediction() {
        let actual = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(r2_score(&actual, &actual), 1.0);
        assert_eq!(rmse(&actual, &actual), 0.0);
        assert_eq!(mae(&actual, &actual), 0.0);
    }

    #[test]
    fn test_known_errors() {
        let actual = [2.0, 4.0, 6.0];
        let predicted = [1.0, 4.0, 8.0];

        // errors: -1, 0, 2
        assert!((mae(&actual, &predicted) - 1.0).abs() < 1e-12);
        assert!((rmse(&actual, &predicted) - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_mean_predictor_has_zero_r2() {
        let actual = [1.0, 2.0, 3.0];
        let predicted = [2.0, 2.0, 2.0];
        assert!(r2_score(&actual, &predicted).abs() < 1e-12);
    }

    #[test]
    fn test_constant_target() {
        let actual = [5.0, 5.0, 5.0];
        let predicted = [4.0, 5.0, 6.0];
        assert_eq!(r2_score(&actual, &predicted), 0.0);
    }
}
