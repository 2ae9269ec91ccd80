//! Trial evaluation: run the alignment engine for one (segment, slack) pair
//! and score the warped matrix.

use tracing::debug;
use twarp_cow::{AlignError, BandConstraint, CowConfig, Signal, SignalMatrix};

use crate::error::OptimizeError;
use crate::record::{OptimizationRecord, RecordBook, TrialScores, is_admissible};
use crate::score::{peak_factor, row_norms, simplicity};

/// Shared inputs for every trial of one optimization run.
pub(crate) struct Evaluator<'a> {
    reference: &'a Signal,
    samples: &'a SignalMatrix,
    original_norms: Vec<f64>,
    band: BandConstraint,
    extend_baseline: bool,
    seed: u64,
    alignment_calls: usize,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(
        reference: &'a Signal,
        samples: &'a SignalMatrix,
        band: BandConstraint,
        extend_baseline: bool,
        seed: u64,
    ) -> Self {
        Self {
            reference,
            samples,
            original_norms: row_norms(samples),
            band,
            extend_baseline,
            seed,
            alignment_calls: 0,
        }
    }

    /// Number of times the alignment engine was invoked.
    pub(crate) fn alignment_calls(&self) -> usize {
        self.alignment_calls
    }

    /// Append the record for `(segment, slack)` to `book` and return its index.
    ///
    /// Pairs seen before are copied without calling the engine. Inadmissible
    /// pairs and pairs the engine rejects are recorded as infeasible.
    pub(crate) fn evaluate(
        &mut self,
        book: &mut RecordBook,
        segment: i64,
        slack: i64,
    ) -> Result<usize, OptimizeError> {
        if let Some(source) = book.lookup(segment, slack) {
            return Ok(book.push_reused(source));
        }
        if !is_admissible(segment, slack) {
            return Ok(book.push(OptimizationRecord::infeasible(segment, slack)));
        }
        // Admissible pairs are positive.
        let record = match self.score(segment as usize, slack as usize)? {
            Some(scores) => OptimizationRecord::evaluated(segment, slack, scores),
            None => OptimizationRecord::infeasible(segment, slack),
        };
        Ok(book.push(record))
    }

    fn score(&mut self, segment: usize, slack: usize) -> Result<Option<TrialScores>, OptimizeError> {
        self.alignment_calls += 1;
        let config = CowConfig::uniform(segment, slack)
            .with_band(self.band)
            .with_extend_baseline(self.extend_baseline)
            .with_seed(self.seed);
        match config.align(self.reference, self.samples) {
            Ok(result) => Ok(Some(TrialScores {
                simplicity: simplicity(&result.warped),
                peak_factor: peak_factor(&self.original_norms, &result.warped),
            })),
            Err(err) if depends_on_parameters(&err) => {
                debug!(segment, slack, error = %err, "trial rejected by alignment engine");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn depends_on_parameters(err: &AlignError) -> bool {
    matches!(
        err,
        AlignError::SegmentTooLong { .. }
            | AlignError::SegmentTooShort { .. }
            | AlignError::SegmentCountMismatch { .. }
            | AlignError::SlackTooLarge { .. }
            | AlignError::BandIncompatible { .. }
            | AlignError::UnreachableEndpoint { .. }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_dependent_failures_become_infeasible_trials() {
        for err in [
            AlignError::SegmentCountMismatch { reference: 2, sample: 3 },
            AlignError::BandIncompatible { boundary: 1 },
            AlignError::UnreachableEndpoint { row: 0 },
            AlignError::SlackTooLarge { slack: 3, required: 5, segment: 0, intervals: 4 },
        ] {
            assert!(depends_on_parameters(&err), "{err}");
        }
    }

    #[test]
    fn pair_independent_failures_abort() {
        for err in [
            AlignError::BandTooNarrow { band: 2, mismatch: 5 },
            AlignError::InvalidCorrelationPower { power: 7 },
        ] {
            assert!(!depends_on_parameters(&err), "{err}");
        }
    }
}
