//! Optimization records and the append-only trial log.

use std::collections::HashMap;

/// Warping-effect components of one evaluated trial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TrialScores {
    /// Simplicity of the warped matrix.
    pub simplicity: f64,
    /// Peak factor of the warped matrix.
    pub peak_factor: f64,
}

/// One (segment, slack) trial. Never mutated once appended.
///
/// Coordinates are signed because local-search moves may step below zero;
/// such trials are infeasible and score zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizationRecord {
    /// Segment length in points.
    pub segment: i64,
    /// Slack.
    pub slack: i64,
    /// Composite score, `simplicity + peak_factor`.
    pub warping_effect: f64,
    /// Simplicity component.
    pub simplicity: f64,
    /// Peak-factor component.
    pub peak_factor: f64,
    /// False when the pair violates `segment > slack + 3`, `slack >= 1`, or
    /// could not be aligned.
    pub feasible: bool,
    /// Index of the earlier record this one was copied from, when the pair
    /// had already been tried.
    pub reused_from: Option<usize>,
}

impl OptimizationRecord {
    pub(crate) fn evaluated(segment: i64, slack: i64, scores: TrialScores) -> Self {
        Self {
            segment,
            slack,
            warping_effect: scores.simplicity + scores.peak_factor,
            simplicity: scores.simplicity,
            peak_factor: scores.peak_factor,
            feasible: true,
            reused_from: None,
        }
    }

    pub(crate) fn infeasible(segment: i64, slack: i64) -> Self {
        Self {
            segment,
            slack,
            warping_effect: 0.0,
            simplicity: 0.0,
            peak_factor: 0.0,
            feasible: false,
            reused_from: None,
        }
    }

    /// Return true if the engine was skipped because the pair was already known.
    #[must_use]
    pub fn is_reused(&self) -> bool {
        self.reused_from.is_some()
    }
}

/// Return true if `(segment, slack)` passes the basic feasibility inequality.
#[must_use]
pub fn is_admissible(segment: i64, slack: i64) -> bool {
    segment > slack + 3 && slack >= 1
}

/// Append-only list of trials with lookup of earlier identical pairs.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordBook {
    records: Vec<OptimizationRecord>,
    first_seen: HashMap<(i64, i64), usize>,
}

impl RecordBook {
    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn get(&self, index: usize) -> &OptimizationRecord {
        &self.records[index]
    }

    /// Index of the first record for `(segment, slack)`.
    pub(crate) fn lookup(&self, segment: i64, slack: i64) -> Option<usize> {
        self.first_seen.get(&(segment, slack)).copied()
    }

    /// Append a copy of an earlier record for the same pair.
    pub(crate) fn push_reused(&mut self, source: usize) -> usize {
        let mut record = self.records[source];
        record.reused_from = Some(source);
        self.records.push(record);
        self.records.len() - 1
    }

    pub(crate) fn push(&mut self, record: OptimizationRecord) -> usize {
        let index = self.records.len();
        self.first_seen
            .entry((record.segment, record.slack))
            .or_insert(index);
        self.records.push(record);
        index
    }

    /// Record indices of the first occurrences of the `n` highest distinct
    /// scores, ordered by ascending score.
    pub(crate) fn seed_indices(&self, n: usize) -> Vec<usize> {
        let mut firsts: Vec<(f64, usize)> = Vec::new();
        for (i, r) in self.records.iter().enumerate() {
            if !firsts.iter().any(|&(score, _)| score == r.warping_effect) {
                firsts.push((r.warping_effect, i));
            }
        }
        firsts.sort_by(|a, b| a.0.total_cmp(&b.0));
        let skip = firsts.len().saturating_sub(n);
        firsts.into_iter().skip(skip).map(|(_, i)| i).collect()
    }

    /// Index of the first record with the highest score.
    pub(crate) fn best(&self) -> Option<usize> {
        self.records
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, r)| match best {
                Some((_, score)) if r.warping_effect <= score => best,
                _ => Some((i, r.warping_effect)),
            })
            .map(|(i, _)| i)
    }

    pub(crate) fn into_records(self) -> Vec<OptimizationRecord> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(segment: i64, slack: i64, s: f64) -> OptimizationRecord {
        OptimizationRecord::evaluated(
            segment,
            slack,
            TrialScores {
                simplicity: s,
                peak_factor: 0.0,
            },
        )
    }

    #[test]
    fn admissibility_inequality() {
        assert!(is_admissible(8, 4));
        assert!(!is_admissible(7, 4));
        assert!(!is_admissible(10, 0));
        assert!(!is_admissible(-2, -1));
    }

    #[test]
    fn lookup_returns_first_occurrence() {
        let mut book = RecordBook::default();
        book.push(scored(10, 2, 0.5));
        let copy = book.push_reused(0);
        assert_eq!(book.lookup(10, 2), Some(0));
        assert_eq!(book.get(copy).reused_from, Some(0));
        assert_eq!(book.get(copy).warping_effect, 0.5);
        assert_eq!(book.lookup(11, 2), None);
    }

    #[test]
    fn seeds_are_top_distinct_scores_ascending() {
        let mut book = RecordBook::default();
        for (i, s) in [0.0, 0.9, 0.4, 0.9, 0.7, 0.0, 0.8].iter().enumerate() {
            book.push(scored(10 + i as i64, 1, *s));
        }
        // distinct firsts: 0.0@0, 0.4@2, 0.7@4, 0.8@6, 0.9@1
        assert_eq!(book.seed_indices(3), vec![4, 6, 1]);
        assert_eq!(book.seed_indices(10), vec![0, 2, 4, 6, 1]);
    }

    #[test]
    fn best_prefers_first_of_ties() {
        let mut book = RecordBook::default();
        book.push(scored(5, 1, 0.3));
        book.push(scored(6, 1, 0.8));
        book.push(scored(7, 1, 0.8));
        assert_eq!(book.best(), Some(1));
        assert_eq!(RecordBook::default().best(), None);
    }

    #[test]
    fn infeasible_scores_zero() {
        let r = OptimizationRecord::infeasible(4, 2);
        assert_eq!(r.warping_effect, 0.0);
        assert!(!r.feasible);
        assert!(!r.is_reused());
    }
}
