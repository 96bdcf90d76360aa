//! Provides the boosting algorithm.

mod bootstrap;
mod boosting_tree;


pub use self::boosting_tree::BoostingTree;
