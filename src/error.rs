//! Errors
//!
//! The error type shared by [`DecisionTree`](crate::DecisionTree)
//! and [`BoostingTree`](crate::BoostingTree).
use thiserror::Error;


/// Errors that can occur while building, training,
/// or querying a model.
#[derive(Debug, Error)]
pub enum CartBoostError {
    /// A constructor received a parameter out of its domain.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),


    /// The feature matrix or the label vector has a wrong shape.
    #[error("Invalid input: {0}")]
    InvalidInput(String),


    /// Every boosting round within the retry budget produced a tree
    /// whose weighted error is at least `0.5`.
    #[error("No weak learner with error < 0.5 was found after {retries} consecutive retries")]
    DegenerateWeakLearner {
        /// Number of consecutive rejected rounds.
        retries: usize,
    },


    /// The model is queried before a successful `train`.
    #[error("The model is not trained yet")]
    NotTrained,


    /// Training stopped because the cancellation flag was raised.
    #[error("Training was cancelled after {completed} accepted weak learners")]
    Cancelled {
        /// Number of weak learners accepted before the cancellation.
        completed: usize,
    },


    /// Unable to write model to file.
    #[error("Unable to write model: {0}")]
    UnableToWrite(String),


    /// Unable to read model from file.
    #[error("Unable to read model: {0}")]
    UnableToRead(String),
}


/// A `Result` alias whose error type is [`CartBoostError`].
pub type Result<T> = std::result::Result<T, CartBoostError>;
