//! Error types for segment/slack optimization.

use twarp_cow::AlignError;

/// Errors from segment/slack optimization.
///
/// Alignment failures that depend on the trial parameters are recorded as
/// infeasible trials instead; only parameter-independent failures surface here.
#[derive(Debug, thiserror::Error)]
pub enum OptimizeError {
    /// Returned when a search range is reversed or degenerate.
    #[error("invalid search space: segment {segment_min}..={segment_max}, slack {slack_min}..={slack_max}")]
    InvalidSearchSpace {
        /// Smallest segment length.
        segment_min: usize,
        /// Largest segment length.
        segment_max: usize,
        /// Smallest slack.
        slack_min: usize,
        /// Largest slack.
        slack_max: usize,
    },

    /// Returned when the band fraction is negative, above 1, or not finite.
    #[error("band fraction must be in [0, 1], got {fraction}")]
    InvalidBandFraction {
        /// The rejected fraction.
        fraction: f64,
    },

    /// Returned when zero local-search seeds are requested.
    #[error("at least one local-search seed is required")]
    NoSeeds,

    /// Returned when the local-search step cap is zero.
    #[error("max steps per seed must be at least 1")]
    NoSteps,

    /// Wraps an alignment failure that does not depend on segment/slack.
    #[error("alignment failed: {0}")]
    Align(#[from] AlignError),
}
