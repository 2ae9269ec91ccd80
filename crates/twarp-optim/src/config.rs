//! Configuration builder for segment/slack optimization.

use std::time::Duration;

use twarp_cow::{Signal, SignalMatrix};

use crate::error::OptimizeError;
use crate::result::OptimizeResult;

/// Inclusive ranges of segment lengths and slacks to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSpace {
    segment_min: usize,
    segment_max: usize,
    slack_min: usize,
    slack_max: usize,
}

impl SearchSpace {
    /// Create a search space over `segment_min..=segment_max` and
    /// `slack_min..=slack_max`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`OptimizeError::InvalidSearchSpace`] | `segment_min == 0`, `slack_max == 0`, or a range is reversed |
    pub fn new(
        segment_min: usize,
        segment_max: usize,
        slack_min: usize,
        slack_max: usize,
    ) -> Result<Self, OptimizeError> {
        if segment_min == 0 || slack_max == 0 || segment_min > segment_max || slack_min > slack_max {
            return Err(OptimizeError::InvalidSearchSpace {
                segment_min,
                segment_max,
                slack_min,
                slack_max,
            });
        }
        Ok(Self {
            segment_min,
            segment_max,
            slack_min,
            slack_max,
        })
    }

    /// Return the smallest segment length.
    #[must_use]
    pub fn segment_min(&self) -> usize {
        self.segment_min
    }

    /// Return the largest segment length.
    #[must_use]
    pub fn segment_max(&self) -> usize {
        self.segment_max
    }

    /// Return the smallest slack.
    #[must_use]
    pub fn slack_min(&self) -> usize {
        self.slack_min
    }

    /// Return the largest slack.
    #[must_use]
    pub fn slack_max(&self) -> usize {
        self.slack_max
    }
}

/// Configuration for the segment/slack optimizer.
///
/// Construct via [`OptimizeConfig::new`], then chain `with_*` methods to
/// override defaults.
///
/// # Defaults
///
/// | Parameter         | Default |
/// |-------------------|---------|
/// | `n_seeds`         | 3       |
/// | `max_steps`       | 50      |
/// | `band_fraction`   | 0.15    |
/// | `extend_baseline` | true    |
/// | `max_duration`    | none    |
/// | `verbose`         | false   |
/// | `seed`            | 42      |
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeConfig {
    search_space: SearchSpace,
    n_seeds: usize,
    max_steps: usize,
    band_fraction: f64,
    extend_baseline: bool,
    max_duration: Option<Duration>,
    verbose: bool,
    seed: u64,
}

impl OptimizeConfig {
    /// Create a configuration for `search_space` with default settings.
    #[must_use]
    pub fn new(search_space: SearchSpace) -> Self {
        Self {
            search_space,
            n_seeds: 3,
            max_steps: 50,
            band_fraction: 0.15,
            extend_baseline: true,
            max_duration: None,
            verbose: false,
            seed: 42,
        }
    }

    /// Set how many of the best distinct grid scores seed a local search.
    #[must_use]
    pub fn with_n_seeds(mut self, n_seeds: usize) -> Self {
        self.n_seeds = n_seeds;
        self
    }

    /// Set the maximum number of trials appended per local search.
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Set the band width as a fraction of the reference length, rounded to
    /// the nearest point. Zero leaves the alignment unconstrained.
    #[must_use]
    pub fn with_band_fraction(mut self, band_fraction: f64) -> Self {
        self.band_fraction = band_fraction;
        self
    }

    /// Pad signals with baseline noise before each alignment.
    #[must_use]
    pub fn with_extend_baseline(mut self, extend_baseline: bool) -> Self {
        self.extend_baseline = extend_baseline;
        self
    }

    /// Stop local search once this much wall-clock time has passed. Trials
    /// already started always finish.
    #[must_use]
    pub fn with_max_duration(mut self, max_duration: Option<Duration>) -> Self {
        self.max_duration = max_duration;
        self
    }

    /// Collect human-readable progress lines in the diagnostics.
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

    /// Return the search space.
    #[must_use]
    pub fn search_space(&self) -> SearchSpace {
        self.search_space
    }

    /// Return the number of local-search seeds.
    #[must_use]
    pub fn n_seeds(&self) -> usize {
        self.n_seeds
    }

    /// Return the per-seed step cap.
    #[must_use]
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Return the band fraction.
    #[must_use]
    pub fn band_fraction(&self) -> f64 {
        self.band_fraction
    }

    /// Return whether baseline extension is enabled.
    #[must_use]
    pub fn extend_baseline(&self) -> bool {
        self.extend_baseline
    }

    /// Return the wall-clock limit.
    #[must_use]
    pub fn max_duration(&self) -> Option<Duration> {
        self.max_duration
    }

    /// Return whether progress lines are collected.
    #[must_use]
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Return the baseline-noise seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub(crate) fn validate(&self) -> Result<(), OptimizeError> {
        if !(0.0..=1.0).contains(&self.band_fraction) {
            return Err(OptimizeError::InvalidBandFraction {
                fraction: self.band_fraction,
            });
        }
        if self.n_seeds == 0 {
            return Err(OptimizeError::NoSeeds);
        }
        if self.max_steps == 0 {
            return Err(OptimizeError::NoSteps);
        }
        Ok(())
    }

    /// Find the segment length and slack that maximize the warping effect of
    /// aligning `samples` to `reference`.
    ///
    /// When `reference` is `None` the sample row with the highest cumulative
    /// correlation to the others is used. A coarse grid over the search space
    /// is evaluated first; the best distinct grid scores then seed a
    /// triangle-reflection local search. Trials the alignment engine rejects
    /// are recorded as infeasible with a score of zero.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`OptimizeError::InvalidBandFraction`] | Band fraction outside `[0, 1]` or NaN |
    /// | [`OptimizeError::NoSeeds`] | `n_seeds == 0` |
    /// | [`OptimizeError::NoSteps`] | `max_steps == 0` |
    /// | [`OptimizeError::Align`] | The band is narrower than the length mismatch |
    pub fn optimize(
        &self,
        samples: &SignalMatrix,
        reference: Option<&Signal>,
    ) -> Result<OptimizeResult, OptimizeError> {
        crate::search::optimize(self, samples, reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_space_rejects_degenerate_ranges() {
        assert!(SearchSpace::new(5, 15, 1, 5).is_ok());
        assert!(SearchSpace::new(0, 15, 1, 5).is_err());
        assert!(SearchSpace::new(16, 15, 1, 5).is_err());
        assert!(SearchSpace::new(5, 15, 3, 2).is_err());
        assert!(SearchSpace::new(5, 15, 0, 0).is_err());
    }

    #[test]
    fn defaults() {
        let cfg = OptimizeConfig::new(SearchSpace::new(5, 15, 1, 5).unwrap());
        assert_eq!(cfg.n_seeds(), 3);
        assert_eq!(cfg.max_steps(), 50);
        assert_eq!(cfg.band_fraction(), 0.15);
        assert!(cfg.extend_baseline());
        assert_eq!(cfg.max_duration(), None);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_catches_bad_settings() {
        let cfg = OptimizeConfig::new(SearchSpace::new(5, 15, 1, 5).unwrap());
        assert!(matches!(
            cfg.clone().with_band_fraction(1.5).validate(),
            Err(OptimizeError::InvalidBandFraction { .. })
        ));
        assert!(matches!(
            cfg.clone().with_band_fraction(f64::NAN).validate(),
            Err(OptimizeError::InvalidBandFraction { .. })
        ));
        assert!(matches!(cfg.clone().with_n_seeds(0).validate(), Err(OptimizeError::NoSeeds)));
        assert!(matches!(cfg.with_max_steps(0).validate(), Err(OptimizeError::NoSteps)));
    }
}
