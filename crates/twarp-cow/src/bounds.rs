//! Band constraint and feasible boundary windows.

use std::ops::RangeInclusive;

use crate::error::AlignError;
use crate::segment::Segmentation;

/// Global constraint on how far a boundary may stray from the diagonal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BandConstraint {
    /// No band; only the slope constraint applies.
    #[default]
    Unconstrained,

    /// Boundary `i` must lie within `w` points of the diagonal projection of
    /// its reference position onto the sample frame.
    Width(usize),
}

impl BandConstraint {
    /// Build from a raw width where `0` means unconstrained.
    #[must_use]
    pub fn from_width(width: usize) -> Self {
        if width == 0 {
            Self::Unconstrained
        } else {
            Self::Width(width)
        }
    }

    /// Return the band width, `0` when unconstrained.
    #[must_use]
    pub fn width(&self) -> usize {
        match self {
            Self::Unconstrained => 0,
            Self::Width(w) => *w,
        }
    }

    /// Check that the band can absorb the length mismatch between a reference
    /// of `m` points and a sample of `p` points.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`AlignError::BandTooNarrow`] | `|m - p|` exceeds the band width |
    pub fn check_lengths(&self, m: usize, p: usize) -> Result<(), AlignError> {
        let mismatch = m.abs_diff(p);
        match self {
            Self::Width(w) if mismatch > *w => Err(AlignError::BandTooNarrow {
                band: *w,
                mismatch,
            }),
            _ => Ok(()),
        }
    }

    /// Return the sample positions allowed for a boundary at reference index
    /// `reference_pos`, for a reference of `m` and a sample of `p` points.
    ///
    /// For unconstrained, returns `0..=p-1`. For width `w`, returns
    /// `[ceil(proj - w), floor(proj + w)]` clamped to `[0, p-1]`, where
    /// `proj = reference_pos * (p-1) / (m-1)`. The range is empty when the
    /// clamped bounds cross.
    #[must_use]
    pub fn position_range(&self, reference_pos: usize, m: usize, p: usize) -> RangeInclusive<usize> {
        let last = p - 1;
        match self {
            Self::Unconstrained => 0..=last,
            Self::Width(w) => {
                let proj = if m > 1 {
                    reference_pos as f64 * last as f64 / (m - 1) as f64
                } else {
                    0.0
                };
                let w = *w as f64;
                let lo = (proj - w).ceil().max(0.0) as usize;
                let hi = (proj + w).floor();
                if hi < 0.0 {
                    return 1..=0;
                }
                lo..=(hi as usize).min(last)
            }
        }
    }
}

/// Inclusive feasible sample positions for every segment boundary.
///
/// Node `k` of boundary `i` sits at sample position `lower(i) + k`. The first
/// boundary is pinned to `0` and the last to `p - 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeasibleBounds {
    lower: Vec<usize>,
    upper: Vec<usize>,
    node_offsets: Vec<usize>,
}

impl FeasibleBounds {
    /// Intersect the slope windows of `segmentation` with `band`.
    ///
    /// The slope window of boundary `i` out of `N` is
    /// `nominal_i ± slack * min(i, N - i)`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`AlignError::BandIncompatible`] | The band leaves some boundary with no position |
    pub fn new(
        segmentation: &Segmentation,
        band: BandConstraint,
        m: usize,
        p: usize,
    ) -> Result<Self, AlignError> {
        let n = segmentation.n_segments();
        let s = segmentation.slack();
        let nominal = segmentation.sample_boundaries();
        let reference = segmentation.reference_boundaries();

        let mut lower = Vec::with_capacity(n + 1);
        let mut upper = Vec::with_capacity(n + 1);
        for i in 0..=n {
            let reach = s * i.min(n - i);
            let band_range = band.position_range(reference[i], m, p);
            let lo = nominal[i].saturating_sub(reach).max(*band_range.start());
            let hi = (nominal[i] + reach).min(p - 1).min(*band_range.end());
            if lo > hi {
                return Err(AlignError::BandIncompatible { boundary: i });
            }
            lower.push(lo);
            upper.push(hi);
        }

        let mut node_offsets = Vec::with_capacity(n + 2);
        node_offsets.push(0);
        for i in 0..=n {
            node_offsets.push(node_offsets[i] + upper[i] - lower[i] + 1);
        }

        Ok(Self {
            lower,
            upper,
            node_offsets,
        })
    }

    /// Return the number of boundaries (`N + 1`).
    #[must_use]
    pub fn n_boundaries(&self) -> usize {
        self.lower.len()
    }

    /// Lowest feasible position of boundary `i`.
    #[must_use]
    pub fn lower(&self, i: usize) -> usize {
        self.lower[i]
    }

    /// Highest feasible position of boundary `i`.
    #[must_use]
    pub fn upper(&self, i: usize) -> usize {
        self.upper[i]
    }

    /// Feasible positions of boundary `i`.
    #[must_use]
    pub fn range(&self, i: usize) -> RangeInclusive<usize> {
        self.lower[i]..=self.upper[i]
    }

    /// Return true if boundary `i` may sit at `position`.
    #[must_use]
    pub fn contains(&self, i: usize, position: usize) -> bool {
        self.range(i).contains(&position)
    }

    /// Total node count across all boundaries.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.node_offsets[self.lower.len()]
    }

    /// Flat node index of `position` on boundary `i`, if feasible.
    pub(crate) fn node(&self, i: usize, position: usize) -> Option<usize> {
        self.contains(i, position)
            .then(|| self.node_offsets[i] + position - self.lower[i])
    }

    /// First flat node index of boundary `i`.
    pub(crate) fn node_offset(&self, i: usize) -> usize {
        self.node_offsets[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::SegmentSpec;

    fn seg(len: usize, slack: usize, m: usize, p: usize) -> Segmentation {
        Segmentation::build(&SegmentSpec::Length(len), slack, m, p, false).unwrap()
    }

    #[test]
    fn unconstrained_full_range() {
        let c = BandConstraint::Unconstrained;
        assert_eq!(c.position_range(5, 10, 12), 0..=11);
    }

    #[test]
    fn band_projects_onto_sample_frame() {
        // proj = 10 * 40 / 20 = 20
        let c = BandConstraint::Width(3);
        assert_eq!(c.position_range(10, 21, 41), 17..=23);
    }

    #[test]
    fn band_clamped_at_edges() {
        let c = BandConstraint::Width(5);
        assert_eq!(c.position_range(0, 21, 21), 0..=5);
        assert_eq!(c.position_range(20, 21, 21), 15..=20);
    }

    #[test]
    fn zero_width_is_unconstrained() {
        assert_eq!(BandConstraint::from_width(0), BandConstraint::Unconstrained);
        assert_eq!(BandConstraint::from_width(4).width(), 4);
    }

    #[test]
    fn band_too_narrow_for_mismatch() {
        let result = BandConstraint::Width(2).check_lengths(30, 35);
        assert!(matches!(result, Err(AlignError::BandTooNarrow { band: 2, mismatch: 5 })));
        assert!(BandConstraint::Unconstrained.check_lengths(30, 35).is_ok());
    }

    #[test]
    fn slope_windows_pin_ends_and_widen_inward() {
        // boundaries 0, 5, 10, 15, 20 with slack 1
        let s = seg(6, 1, 21, 21);
        let b = FeasibleBounds::new(&s, BandConstraint::Unconstrained, 21, 21).unwrap();
        assert_eq!(b.n_boundaries(), 5);
        assert_eq!(b.range(0), 0..=0);
        assert_eq!(b.range(1), 4..=6);
        assert_eq!(b.range(2), 8..=12);
        assert_eq!(b.range(3), 14..=16);
        assert_eq!(b.range(4), 20..=20);
        assert_eq!(b.n_nodes(), 1 + 3 + 5 + 3 + 1);
    }

    #[test]
    fn band_narrows_slope_window() {
        let s = seg(6, 2, 21, 21);
        let b = FeasibleBounds::new(&s, BandConstraint::Width(1), 21, 21).unwrap();
        assert_eq!(b.range(2), 9..=11);
    }

    #[test]
    fn node_indices_are_flat_and_contiguous() {
        let s = seg(6, 1, 21, 21);
        let b = FeasibleBounds::new(&s, BandConstraint::Unconstrained, 21, 21).unwrap();
        assert_eq!(b.node(0, 0), Some(0));
        assert_eq!(b.node(1, 4), Some(1));
        assert_eq!(b.node(1, 6), Some(3));
        assert_eq!(b.node(2, 8), Some(4));
        assert_eq!(b.node(1, 7), None);
    }
}
