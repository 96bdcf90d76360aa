//! The files in `weak_learner/` directory defines
//! the weak learners combined by the boosting algorithm.

/// Defines Decision Tree.
pub mod decision_tree;


pub use self::decision_tree::{
    Criterion,
    DecisionTree,
    Evaluation,
    Node,
};
