//! Defines the splitting criteria
//! and the exhaustive split search of the decision tree.

use rayon::prelude::*;

use serde::{Serialize, Deserialize};

use std::fmt;
use std::str::FromStr;
use std::cmp::Ordering;
use std::ops::Add;
use std::collections::BTreeMap;

use crate::classifier::Label;
use crate::error::CartBoostError;
use super::split_rule::*;


/// Number of examples per label on one side of a split.
/// `BTreeMap` keeps the summation order deterministic.
pub(crate) type LabelToCount = BTreeMap<Label, usize>;


/// Score for a splitting.
/// This is just a wrapper for `f64`.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub(crate) struct Score(f64);


impl From<f64> for Score {
    #[inline(always)]
    fn from(score: f64) -> Self {
        Self(score)
    }
}


impl PartialEq for Score {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}


impl PartialOrd for Score {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}


impl Add for Score {
    type Output = Self;
    #[inline]
    fn add(self, other: Self) -> Self::Output {
        Self(self.0 + other.0)
    }
}


/// Splitting criteria for growing decision tree.
/// A candidate split is scored by the **sum** of the impurities
/// of its two sides, and the candidate with the smallest score wins.
/// * `Criterion::Gini` uses the Gini impurity `1 - Σ p_c^2`.
/// * `Criterion::Entropy` uses the entropic impurity `- Σ p_c ln p_c`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Criterion {
    /// Gini index.
    #[default]
    Gini,
    /// Binary entropy function.
    Entropy,
}


impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Gini => "Gini index",
            Self::Entropy => "Entropy",
        };

        write!(f, "{name}")
    }
}


impl FromStr for Criterion {
    type Err = CartBoostError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gini" => Ok(Self::Gini),
            "entropy" => Ok(Self::Entropy),
            _ => Err(CartBoostError::InvalidConfiguration(format!(
                "unknown criterion `{s}`, expected one of `gini`, `entropy`"
            ))),
        }
    }
}


impl Criterion {
    /// Returns the impurity of a side holding the given label counts.
    #[inline]
    pub(crate) fn impurity(&self, counts: &LabelToCount) -> f64 {
        match self {
            Self::Gini => gini_impurity(counts),
            Self::Entropy => entropic_impurity(counts),
        }
    }


    /// Returns the best splitting rule based on the criterion.
    ///
    /// Every feature in `0..n_feature` and every value
    /// `data[i][feature]` (`i` in `indices`) is tried as a threshold.
    /// Candidates that leave one side empty are skipped,
    /// so `None` means that no split separates the examples.
    /// Ties are broken by the first candidate found,
    /// scanning features in the outer loop and examples in the inner loop.
    ///
    /// Time complexity: `O(d * n^2)`, where
    /// - `d` is `n_feature` and
    /// - `n` is `indices.len()`.
    pub(crate) fn best_split(
        &self,
        data: &[Vec<f64>],
        target: &[Label],
        indices: &[usize],
        n_feature: usize,
    ) -> Option<(Splitter, Score)>
    {
        // `collect` keeps the feature order,
        // which is needed for the first-found tie-break.
        let per_feature = (0..n_feature).into_par_iter()
            .map(|feature| {
                self.best_split_on(feature, data, target, indices)
            })
            .collect::<Vec<_>>();

        per_feature.into_iter()
            .flatten()
            .fold(None, |best, (rule, score)| {
                match best {
                    Some((_, s)) if s <= score => best,
                    _ => Some((rule, score)),
                }
            })
    }


    /// Returns the best threshold on a single feature.
    fn best_split_on(
        &self,
        feature: usize,
        data: &[Vec<f64>],
        target: &[Label],
        indices: &[usize],
    ) -> Option<(Splitter, Score)>
    {
        let mut best: Option<(Splitter, Score)> = None;

        for &i in indices {
            let rule = Splitter::new(feature, data[i][feature]);
            let (left, right) = partition_counts(&rule, data, target, indices);

            let n_left = left.values().sum::<usize>();
            if n_left == 0 || n_left == indices.len() { continue; }

            let score = Score::from(self.impurity(&left))
                + Score::from(self.impurity(&right));

            if best.map_or(true, |(_, s)| score < s) {
                best = Some((rule, score));
            }
        }
        best
    }
}


/// Counts the labels on each side of the given rule.
#[inline]
fn partition_counts(
    rule: &Splitter,
    data: &[Vec<f64>],
    target: &[Label],
    indices: &[usize],
) -> (LabelToCount, LabelToCount)
{
    let mut left = LabelToCount::new();
    let mut right = LabelToCount::new();
    for &i in indices {
        let side = match rule.split(&data[i]) {
            LeftRight::Left => &mut left,
            LeftRight::Right => &mut right,
        };
        *side.entry(target[i]).or_insert(0) += 1;
    }
    (left, right)
}


/// Returns the gini-impurity of the given map.
/// The squared counts are summed as integers
/// so that equal class proportions give bit-identical impurities.
#[inline(always)]
pub(crate) fn gini_impurity(counts: &LabelToCount) -> f64 {
    let total = counts.values().sum::<usize>() as u128;
    if total == 0 { return 0f64; }

    let squares = counts.values()
        .map(|&c| (c as u128) * (c as u128))
        .sum::<u128>();

    let total_sq = total * total;
    (total_sq - squares) as f64 / total_sq as f64
}


/// Returns the entropic-impurity of the given map.
#[inline(always)]
pub(crate) fn entropic_impurity(counts: &LabelToCount) -> f64 {
    let total = counts.values().sum::<usize>() as f64;
    if total <= 0f64 { return 0f64; }

    counts.values()
        .map(|&c| {
            let r = c as f64 / total;
            if r <= 0f64 { 0f64 } else { -r * r.ln() }
        })
        .sum::<f64>()
}


#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(Label, usize)]) -> LabelToCount {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_gini_pure() {
        assert_eq!(gini_impurity(&counts(&[(1, 5)])), 0f64);
    }

    #[test]
    fn test_gini_balanced_binary() {
        assert_eq!(gini_impurity(&counts(&[(0, 3), (1, 3)])), 0.5);
    }

    #[test]
    fn test_gini_empty() {
        assert_eq!(gini_impurity(&LabelToCount::new()), 0f64);
    }

    #[test]
    fn test_entropy_balanced_binary() {
        let e = entropic_impurity(&counts(&[(0, 2), (1, 2)]));
        assert!((e - 2f64.ln()).abs() < 1e-12);
        assert_eq!(entropic_impurity(&counts(&[(4, 9)])), 0f64);
    }

    #[test]
    fn test_criterion_from_str() {
        assert_eq!("gini".parse::<Criterion>().unwrap(), Criterion::Gini);
        assert_eq!("Entropy".parse::<Criterion>().unwrap(), Criterion::Entropy);
        assert!("twoing".parse::<Criterion>().is_err());
    }

    #[test]
    fn test_best_split_separable() {
        let data = vec![
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
        ];
        let target = vec![0, 0, 1, 1];
        let indices = vec![0, 1, 2, 3];
        let (rule, score) = Criterion::Gini
            .best_split(&data, &target, &indices, 2)
            .unwrap();
        assert_eq!(rule.feature, 0);
        assert_eq!(rule.threshold, 1.0);
        assert_eq!(score, Score::from(0f64));
    }

    #[test]
    fn test_best_split_first_found_tie_break() {
        // Both features separate the labels perfectly.
        let data = vec![
            vec![0.0, 5.0],
            vec![1.0, 6.0],
        ];
        let target = vec![0, 1];
        let indices = vec![0, 1];
        let (rule, _) = Criterion::Gini
            .best_split(&data, &target, &indices, 2)
            .unwrap();
        assert_eq!(rule.feature, 0);
        assert_eq!(rule.threshold, 1.0);
    }

    #[test]
    fn test_best_split_identical_examples() {
        let data = vec![vec![2.0, 2.0]; 4];
        let target = vec![0, 1, 0, 1];
        let indices = vec![0, 1, 2, 3];
        assert!(
            Criterion::Gini
                .best_split(&data, &target, &indices, 2)
                .is_none()
        );
    }
}
