//! Configuration builder for correlation optimized warping.

use crate::bounds::BandConstraint;
use crate::error::AlignError;
use crate::result::CowResult;
use crate::segment::{SegmentSpec, SlackSpec};
use crate::signal::{Signal, SignalMatrix};

/// Configuration for aligning sample signals to a reference.
///
/// Construct via [`CowConfig::new`] (or [`CowConfig::uniform`]), then chain
/// `with_*` methods to override defaults.
///
/// # Defaults
///
/// | Parameter               | Default                         |
/// |-------------------------|---------------------------------|
/// | `correlation_power`     | 1                               |
/// | `equal_segment_lengths` | false                           |
/// | `band`                  | `BandConstraint::Unconstrained` |
/// | `keep_full_table`       | false                           |
/// | `extend_baseline`       | false                           |
/// | `verbose`               | false                           |
/// | `seed`                  | 42                              |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CowConfig {
    pub(crate) segment: SegmentSpec,
    pub(crate) slack: usize,
    pub(crate) correlation_power: u32,
    pub(crate) equal_segment_lengths: bool,
    pub(crate) band: BandConstraint,
    pub(crate) keep_full_table: bool,
    pub(crate) extend_baseline: bool,
    pub(crate) verbose: bool,
    pub(crate) seed: u64,
}

impl CowConfig {
    /// Create a configuration from a segment specification and a slack.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`AlignError::PerBoundarySlackUnsupported`] | `slack` holds more than one per-boundary value |
    pub fn new(segment: SegmentSpec, slack: SlackSpec) -> Result<Self, AlignError> {
        let slack = slack.uniform()?;
        Ok(Self {
            segment,
            slack,
            correlation_power: 1,
            equal_segment_lengths: false,
            band: BandConstraint::Unconstrained,
            keep_full_table: false,
            extend_baseline: false,
            verbose: false,
            seed: 42,
        })
    }

    /// Create a configuration with uniform segments of `segment_length` points
    /// and a uniform `slack`.
    #[must_use]
    pub fn uniform(segment_length: usize, slack: usize) -> Self {
        Self {
            segment: SegmentSpec::Length(segment_length),
            slack,
            correlation_power: 1,
            equal_segment_lengths: false,
            band: BandConstraint::Unconstrained,
            keep_full_table: false,
            extend_baseline: false,
            verbose: false,
            seed: 42,
        }
    }

    /// Set the power each segment correlation is raised to. Must be in `1..=4`;
    /// checked when aligning.
    #[must_use]
    pub fn with_correlation_power(mut self, correlation_power: u32) -> Self {
        self.correlation_power = correlation_power;
        self
    }

    /// Let reference and sample segments differ in length so both frames hold
    /// the same number of segments.
    #[must_use]
    pub fn with_equal_segment_lengths(mut self, equal_segment_lengths: bool) -> Self {
        self.equal_segment_lengths = equal_segment_lengths;
        self
    }

    /// Set the global band constraint.
    #[must_use]
    pub fn with_band(mut self, band: BandConstraint) -> Self {
        self.band = band;
        self
    }

    /// Keep every row's cost table in the diagnostics.
    #[must_use]
    pub fn with_keep_full_table(mut self, keep_full_table: bool) -> Self {
        self.keep_full_table = keep_full_table;
        self
    }

    /// Pad reference and samples with baseline noise before aligning.
    ///
    /// Helps late peaks that sit close to the end of the signal. The padding is
    /// trimmed from the warped output.
    #[must_use]
    pub fn with_extend_baseline(mut self, extend_baseline: bool) -> Self {
        self.extend_baseline = extend_baseline;
        self
    }

    /// Collect human-readable log lines in the diagnostics.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the seed for baseline-extension noise.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the segment specification.
    #[must_use]
    pub fn segment(&self) -> &SegmentSpec {
        &self.segment
    }

    /// Return the uniform slack.
    #[must_use]
    pub fn slack(&self) -> usize {
        self.slack
    }

    /// Return the correlation power.
    #[must_use]
    pub fn correlation_power(&self) -> u32 {
        self.correlation_power
    }

    /// Return whether equal segment lengths are enabled.
    #[must_use]
    pub fn equal_segment_lengths(&self) -> bool {
        self.equal_segment_lengths
    }

    /// Return the band constraint.
    #[must_use]
    pub fn band(&self) -> BandConstraint {
        self.band
    }

    /// Return whether full cost tables are kept.
    #[must_use]
    pub fn keep_full_table(&self) -> bool {
        self.keep_full_table
    }

    /// Return whether baseline extension is enabled.
    #[must_use]
    pub fn extend_baseline(&self) -> bool {
        self.extend_baseline
    }

    /// Return whether log lines are collected.
    #[must_use]
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Return the baseline-noise seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Align every row of `samples` to `reference`.
    ///
    /// Rows are warped independently and in parallel; the segmentation and
    /// feasibility windows are shared.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`AlignError::InvalidCorrelationPower`] | Power outside `1..=4` |
    /// | [`AlignError::BandTooNarrow`] | Band narrower than the length mismatch |
    /// | [`AlignError::SegmentTooShort`] | Segment of fewer than two points |
    /// | [`AlignError::SegmentTooLong`] | Segment longer than either signal |
    /// | [`AlignError::SegmentCountMismatch`] | Frames yield different segment counts |
    /// | [`AlignError::BoundaryCountMismatch`] | Explicit boundary arrays differ in length |
    /// | [`AlignError::InvalidBoundaryAnchors`] | Explicit boundaries do not span both signals |
    /// | [`AlignError::SlackTooLarge`] | A segment has fewer than `slack + 2` intervals |
    /// | [`AlignError::BandIncompatible`] | The band empties some boundary window |
    /// | [`AlignError::UnreachableEndpoint`] | Some row has no feasible path |
    pub fn align(&self, reference: &Signal, samples: &SignalMatrix) -> Result<CowResult, AlignError> {
        crate::cow::align(self, reference, samples)
    }
}
