//! This file defines split rules for decision tree.
use serde::{Serialize, Deserialize};


/// The output of the function `split` of `Splitter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LeftRight {
    Left,
    Right,
}


/// An axis-aligned splitting rule `x[feature] < threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub(crate) struct Splitter {
    pub(crate) feature: usize,
    pub(crate) threshold: f64,
}


impl Splitter {
    #[inline]
    pub(crate) fn new(feature: usize, threshold: f64) -> Self {
        Self { feature, threshold, }
    }


    /// Defines the splitting.
    #[inline]
    pub(crate) fn split(&self, example: &[f64]) -> LeftRight {
        if example[self.feature] < self.threshold {
            LeftRight::Left
        } else {
            LeftRight::Right
        }
    }
}
