//! The combined hypotheses output by the boosting algorithm.

pub(crate) mod weighted_majority;


pub use weighted_majority::{
    WeakLearner,
    WeightedMajority,
};
