//! Defines the decision tree weak learner.

/// Defines the decision tree.
mod dtree;

/// Defines the inner representations of `DecisionTree`.
mod node;
mod criterion;
mod split_rule;


pub use dtree::{DecisionTree, Evaluation};
pub use criterion::Criterion;
pub use node::{Node, BranchNode, LeafNode};
