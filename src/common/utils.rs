//! This file provides some common functions
//! such as label counting and distribution normalization.
use rayon::prelude::*;

use crate::classifier::Label;

use std::collections::HashSet;


/// Returns the most frequent label among `target[i]` for `i` in `indices`.
/// Ties are broken by the order in which the labels are first seen
/// while scanning `indices`.
///
/// Returns `None` if `indices` is empty.
#[inline]
pub(crate) fn majority_label(target: &[Label], indices: &[usize])
    -> Option<Label>
{
    // `(label, count)` pairs in first-seen order.
    let mut counter: Vec<(Label, usize)> = Vec::new();
    for &i in indices {
        let y = target[i];
        match counter.iter_mut().find(|(l, _)| *l == y) {
            Some((_, cnt)) => { *cnt += 1; },
            None => { counter.push((y, 1)); },
        }
    }


    counter.into_iter()
        .fold(None, |best: Option<(Label, usize)>, (y, cnt)| {
            match best {
                Some((_, c)) if c >= cnt => best,
                _ => Some((y, cnt)),
            }
        })
        .map(|(y, _)| y)
}


/// Returns the number of distinct labels in `target`.
#[inline]
pub(crate) fn distinct_labels<'a, I>(target: I) -> usize
    where I: IntoIterator<Item = &'a Label>,
{
    target.into_iter()
        .collect::<HashSet<_>>()
        .len()
}


/// Returns the fraction of positions where
/// `predictions` and `target` agree.
#[inline]
pub(crate) fn accuracy(predictions: &[Label], target: &[Label]) -> f64 {
    let n_sample = target.len() as f64;
    let correct = predictions.iter()
        .zip(target)
        .filter(|(p, y)| p == y)
        .count() as f64;

    correct / n_sample
}


/// Normalizes the distribution stored as logarithms
/// and writes the result back as probabilities.
/// Taking the maximum out of the exponent prevents overflow.
#[inline]
pub(crate) fn normalize_log_distribution(log_dist: &mut [f64]) {
    let max = log_dist.iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);

    log_dist.par_iter_mut()
        .for_each(|d| { *d = (*d - max).exp(); });

    let z = log_dist.iter().sum::<f64>();
    log_dist.par_iter_mut()
        .for_each(|d| { *d /= z; });
}
