#![warn(missing_docs)]

//!
//! A crate that trains classifiers by recursive partitioning
//! of a labeled feature matrix and combines many such trees
//! into a weighted ensemble by boosting.
//!
//! This crate includes two models.
//!
//! - [`DecisionTree`]
//!     A CART-style binary tree.
//!     Every node tries each feature and each observed value as a
//!     threshold and keeps the split with the smallest sum of
//!     the impurities of its two sides.
//!
//!
//! - [`BoostingTree`]
//!     An ensemble of decision trees.
//!     Each round fits a tree on a bootstrap sample drawn from
//!     a distribution over the training examples,
//!     weighs the tree by its error, and moves the distribution
//!     towards the examples the tree misclassified.
//!     The ensemble predicts by weighted majority vote.
//!
//! Both models take the features as `&[Vec<f64>]` (one row per example)
//! and the labels as `&[Label]`.
//! Progress is reported through the [`log`] facade.

pub mod booster;
pub mod classifier;
pub mod constants;
pub mod error;
pub mod hypothesis;
pub mod prelude;
pub mod weak_learner;

mod common;


pub use booster::BoostingTree;
pub use classifier::{Classifier, Label};
pub use error::{CartBoostError, Result};
pub use hypothesis::{WeakLearner, WeightedMajority};
pub use weak_learner::{
    Criterion,
    DecisionTree,
    Evaluation,
    Node,
};
