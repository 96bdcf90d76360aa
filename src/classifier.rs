//! The core trait for the models in this crate.
//!
//! Both a single [`DecisionTree`](crate::DecisionTree)
//! and the weighted vote of many trees
//! ([`WeightedMajority`](crate::WeightedMajority),
//! [`BoostingTree`](crate::BoostingTree)) classify an example
//! through [`Classifier`].
use rayon::prelude::*;

use crate::error::Result;


/// Class label type.
/// Labels are compared by equality only, so any encoding works.
pub type Label = i64;


/// A trait that defines the function used in the combined classifier
/// of the boosting algorithm.
pub trait Classifier {
    /// Predicts the label of the given example.
    /// Returns an error if `example` does not have the
    /// dimension the model was built for,
    /// or if the model is not trained.
    fn classify(&self, example: &[f64]) -> Result<Label>;


    /// Predicts the labels of the given examples.
    /// The examples are classified in parallel;
    /// the output order follows `examples`.
    fn classify_all(&self, examples: &[Vec<f64>]) -> Result<Vec<Label>>
        where Self: Sync
    {
        examples.par_iter()
            .map(|example| self.classify(example))
            .collect()
    }
}
