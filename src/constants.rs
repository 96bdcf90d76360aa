//! Numeric constants and default parameters.

/// The reliability weight given to a weak learner
/// that classifies its whole bootstrap sample correctly.
pub const MAX_ALPHA:           f64 = 10f64;
/// Tolerance used when checking that a distribution sums to `1`.
pub const SIMPLEX_TOLERANCE:   f64 = 1e-9;

/// Seed of the resampling generator unless one is given.
pub const DEFAULT_SEED:        u64 = 1234;
/// Consecutive rejected rounds tolerated before boosting gives up.
pub const DEFAULT_MAX_RETRIES: usize = 100;

/// Column width of the verbose round table.
pub const PRINT_WIDTH:         usize = 10;
