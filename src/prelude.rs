//! Exports the standard models and traits.
//!
pub use crate::booster::BoostingTree;


pub use crate::weak_learner::{
    Criterion,
    DecisionTree,
    Evaluation,
    Node,
};


pub use crate::hypothesis::{
    WeakLearner,
    WeightedMajority,
};


pub use crate::classifier::{
    Classifier,
    Label,
};


pub use crate::error::{
    CartBoostError,
    Result,
};
