//! Error types for signal validation and correlation optimized warping.

/// Errors from signal and signal-matrix validation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Returned when an empty slice is provided as a signal.
    #[error("signal must be non-empty")]
    EmptySignal,

    /// Returned when a matrix is built from zero rows.
    #[error("signal matrix must contain at least one row")]
    EmptyMatrix,

    /// Returned when a matrix row has a different length than the first row.
    #[error("signal matrix row {row} has {got} points, expected {expected}")]
    RaggedMatrix {
        /// Zero-based row index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        got: usize,
    },

    /// Returned when a signal contains NaN, infinity, or negative infinity.
    #[error("signal row {row} contains non-finite value at index {index}")]
    NonFiniteValue {
        /// Row of the offending value (0 for a standalone signal).
        row: usize,
        /// Position of the first non-finite value found.
        index: usize,
    },
}

/// Errors from the alignment engine.
///
/// All variants are fatal: the call is aborted and no partial result is returned.
#[derive(Debug, thiserror::Error)]
pub enum AlignError {
    /// Returned when the correlation power is outside `1..=4`.
    #[error("correlation power must be in 1..=4, got {power}")]
    InvalidCorrelationPower {
        /// The rejected power.
        power: u32,
    },

    /// Returned when the nominal segment length cannot form a segment.
    #[error("segment length {segment} is invalid for signals of {reference_len} (reference) and {sample_len} (sample) points")]
    SegmentTooLong {
        /// Nominal segment length in points.
        segment: usize,
        /// Reference length.
        reference_len: usize,
        /// Sample length.
        sample_len: usize,
    },

    /// Returned when reference and sample divide into a different number of
    /// segments and equal segment lengths were not requested.
    #[error("reference yields {reference} segments but sample yields {sample}; enable equal segment lengths")]
    SegmentCountMismatch {
        /// Segment count of the reference.
        reference: usize,
        /// Segment count of the sample.
        sample: usize,
    },

    /// Returned when a segment spans fewer than two points.
    #[error("segment {segment} must contain at least two points")]
    SegmentTooShort {
        /// Zero-based segment index.
        segment: usize,
    },

    /// Returned when a segment is too short to support the requested slack.
    #[error("slack {slack} requires segments of at least {required} intervals, segment {segment} has {intervals}")]
    SlackTooLarge {
        /// Requested slack.
        slack: usize,
        /// Minimum interval count (`slack + 2`).
        required: usize,
        /// Zero-based index of the shortest offending segment.
        segment: usize,
        /// Interval count of that segment.
        intervals: usize,
    },

    /// Returned when per-boundary slack is requested.
    #[error("per-boundary slack ({len} values) is not supported; use a uniform slack")]
    PerBoundarySlackUnsupported {
        /// Number of slack values supplied.
        len: usize,
    },

    /// Returned when explicit boundaries do not start at `(0, 0)` and end at the last indices.
    #[error("explicit boundaries must start at (0, 0) and end at ({reference_end}, {sample_end})")]
    InvalidBoundaryAnchors {
        /// Required last reference boundary (`m - 1`).
        reference_end: usize,
        /// Required last sample boundary (`p - 1`).
        sample_end: usize,
    },

    /// Returned when the reference and sample boundary arrays differ in length.
    #[error("boundary arrays differ in length: {reference} (reference) vs {sample} (sample)")]
    BoundaryCountMismatch {
        /// Reference boundary count.
        reference: usize,
        /// Sample boundary count.
        sample: usize,
    },

    /// Returned when the band is narrower than the reference/sample length mismatch.
    #[error("band width {band} is too narrow for a length mismatch of {mismatch}")]
    BandTooNarrow {
        /// Requested band width.
        band: usize,
        /// `|m - p|`.
        mismatch: usize,
    },

    /// Returned when the band leaves a boundary with no feasible position.
    #[error("band constraint leaves boundary {boundary} without a feasible position")]
    BandIncompatible {
        /// Zero-based boundary index.
        boundary: usize,
    },

    /// Returned when the final boundary of a row cannot be reached from the start.
    #[error("sample row {row} has no feasible warp path; choose a different segment/slack")]
    UnreachableEndpoint {
        /// Zero-based sample row.
        row: usize,
    },
}
