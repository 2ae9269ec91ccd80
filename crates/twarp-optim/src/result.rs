//! Optimization output and run diagnostics.

use std::time::Duration;

use twarp_cow::Signal;

use crate::record::OptimizationRecord;

/// Output of a segment/slack optimization.
#[derive(Debug, Clone)]
pub struct OptimizeResult {
    /// The first record with the highest warping effect.
    pub best: OptimizationRecord,
    /// Index of `best` in `records`.
    pub best_index: usize,
    /// Every trial in evaluation order, grid phase first.
    pub records: Vec<OptimizationRecord>,
    /// Run diagnostics.
    pub diagnostics: OptimizeDiagnostics,
}

impl OptimizeResult {
    /// Optimal segment length. Zero only when the best trial is infeasible
    /// and sits below the search space.
    #[must_use]
    pub fn segment(&self) -> usize {
        usize::try_from(self.best.segment).unwrap_or(0)
    }

    /// Optimal slack.
    #[must_use]
    pub fn slack(&self) -> usize {
        usize::try_from(self.best.slack).unwrap_or(0)
    }
}

/// One local-search run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedRun {
    /// Record index the run started from.
    pub record: usize,
    /// Records appended during the run.
    pub steps: usize,
    /// True when the run ended because it reached the step cap.
    pub hit_step_cap: bool,
}

/// Diagnostics collected during optimization.
#[derive(Debug, Clone)]
pub struct OptimizeDiagnostics {
    /// Simplicity of the unwarped samples.
    pub base_simplicity: f64,
    /// Reference the samples were aligned to.
    pub reference: Signal,
    /// Sample row the reference was copied from when selected automatically.
    pub reference_row: Option<usize>,
    /// Local-search runs in the order they were started.
    pub seeds: Vec<SeedRun>,
    /// Number of times the alignment engine was invoked.
    pub alignment_calls: usize,
    /// Wall-clock time of the whole run.
    pub elapsed: Duration,
    /// Human-readable progress lines, collected only when verbose.
    pub log: Vec<String>,
}
