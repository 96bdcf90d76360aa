//! Defines some common functions used in this library.

/// Defines some checker functions.
pub(crate) mod checker;

/// Defines some useful functions such as label counting.
pub(crate) mod utils;
