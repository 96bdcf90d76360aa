//! This file defines some functions that checks some pre-conditions
//! E.g., Shape of data

use crate::classifier::Label;
use crate::constants::SIMPLEX_TOLERANCE;
use crate::error::{CartBoostError, Result};


/// Check whether the given parameter is positive.
#[inline(always)]
pub(crate) fn positive(name: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(CartBoostError::InvalidConfiguration(
            format!("`{name}` must be positive, got {value}")
        ));
    }
    Ok(())
}


/// Check whether the training sample is valid or not.
/// `data` and `target` must have the same, non-zero length
/// and every example must have `n_feature` features.
#[inline(always)]
pub(crate) fn sample(
    data: &[Vec<f64>],
    target: &[Label],
    n_feature: usize,
) -> Result<()>
{
    if data.len() != target.len() {
        return Err(CartBoostError::InvalidInput(format!(
            "{} examples are given with {} labels",
            data.len(), target.len(),
        )));
    }


    // Since the previous check guarantees `n_data == n_target`,
    // we only need to check `n_data`.
    if data.is_empty() {
        return Err(CartBoostError::InvalidInput(
            "the training set is empty".into()
        ));
    }

    features(data, n_feature)
}


/// Check whether every example has `n_feature` features.
#[inline(always)]
pub(crate) fn features(data: &[Vec<f64>], n_feature: usize) -> Result<()> {
    match data.iter().position(|x| x.len() != n_feature) {
        Some(row) => Err(CartBoostError::InvalidInput(format!(
            "example {row} has {} features, expected {n_feature}",
            data[row].len(),
        ))),
        None => Ok(()),
    }
}


/// Check whether a single example has `n_feature` features.
#[inline(always)]
pub(crate) fn example(example: &[f64], n_feature: usize) -> Result<()> {
    if example.len() != n_feature {
        return Err(CartBoostError::InvalidInput(format!(
            "an example has {} features, expected {n_feature}",
            example.len(),
        )));
    }
    Ok(())
}


/// Returns `true` if `dist` is a probability vector.
#[inline(always)]
pub(crate) fn simplex(dist: &[f64]) -> bool {
    let sum = dist.iter().sum::<f64>();
    (sum - 1f64).abs() < SIMPLEX_TOLERANCE
        && dist.iter().all(|d| *d >= 0f64)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_failure() {
        let err = positive("input_dim", 0).unwrap_err();
        assert!(matches!(err, CartBoostError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_sample_success() {
        let data = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
        let target = vec![0, 1];
        assert!(sample(&data, &target, 2).is_ok());
    }

    #[test]
    fn test_sample_length_mismatch() {
        let data = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
        let target = vec![0];
        let err = sample(&data, &target, 2).unwrap_err();
        assert!(matches!(err, CartBoostError::InvalidInput(_)));
    }

    #[test]
    fn test_sample_empty() {
        let err = sample(&[], &[], 2).unwrap_err();
        assert!(matches!(err, CartBoostError::InvalidInput(_)));
    }

    #[test]
    fn test_sample_ragged_row() {
        let data = vec![vec![0.0, 1.0], vec![1.0]];
        let target = vec![0, 1];
        let err = sample(&data, &target, 2).unwrap_err();
        assert!(matches!(err, CartBoostError::InvalidInput(_)));
    }

    #[test]
    fn test_simplex() {
        assert!(simplex(&[0.25, 0.25, 0.5]));
        assert!(!simplex(&[0.25, 0.25]));
        assert!(!simplex(&[1.5, -0.5]));
    }
}
