//! Segmentation of the reference and sample into matched segments.

use crate::error::AlignError;

/// How the reference and sample are divided into segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentSpec {
    /// Uniform segments of the given nominal length in points. The remainder is
    /// folded into the last segment of each frame.
    Length(usize),

    /// Explicit boundary pairs. Both arrays hold `N + 1` strictly increasing
    /// point indices, from `0` to the last index of their signal.
    Boundaries {
        /// Boundaries in the reference frame.
        reference: Vec<usize>,
        /// Boundaries in the sample frame.
        sample: Vec<usize>,
    },
}

impl SegmentSpec {
    /// Shift the final explicit boundaries by `padding` so they still end at the
    /// last index of signals extended by that many points.
    pub(crate) fn padded(&self, padding: usize) -> Self {
        match self {
            Self::Length(_) => self.clone(),
            Self::Boundaries { reference, sample } => {
                let pad = |b: &[usize]| {
                    let mut b = b.to_vec();
                    if let Some(last) = b.last_mut() {
                        *last += padding;
                    }
                    b
                };
                Self::Boundaries {
                    reference: pad(reference),
                    sample: pad(sample),
                }
            }
        }
    }
}

/// Maximum boundary displacement allowed per segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlackSpec {
    /// One slack shared by every boundary.
    Uniform(usize),
    /// One slack per boundary. Only a single-element vector is accepted, and
    /// it behaves like [`SlackSpec::Uniform`].
    PerBoundary(Vec<usize>),
}

impl SlackSpec {
    /// Resolve to a single slack value.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`AlignError::PerBoundarySlackUnsupported`] | More (or fewer) than one per-boundary value |
    pub fn uniform(&self) -> Result<usize, AlignError> {
        match self {
            Self::Uniform(s) => Ok(*s),
            Self::PerBoundary(v) if v.len() == 1 => Ok(v[0]),
            Self::PerBoundary(v) => Err(AlignError::PerBoundarySlackUnsupported { len: v.len() }),
        }
    }
}

impl From<usize> for SlackSpec {
    fn from(slack: usize) -> Self {
        Self::Uniform(slack)
    }
}

/// Matched segment boundaries in both coordinate frames.
///
/// Boundaries are point indices; consecutive segments share their boundary
/// point. The first boundary is always `0` and the last is the final index of
/// the respective signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmentation {
    reference: Vec<usize>,
    sample: Vec<usize>,
    slack: usize,
}

impl Segmentation {
    /// Partition a reference of `m` points and samples of `p` points.
    ///
    /// With `equal_lengths`, uniform segmentation uses `floor((m-1)/seg)`
    /// segments and stretches intervals so both frames hold the same count;
    /// otherwise both frames use `seg - 1` intervals per segment and must
    /// produce the same count.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`AlignError::SegmentTooShort`] | Nominal length below 2, or explicit boundaries not strictly increasing |
    /// | [`AlignError::SegmentTooLong`] | Nominal length exceeds either signal |
    /// | [`AlignError::SegmentCountMismatch`] | Frames yield different segment counts |
    /// | [`AlignError::BoundaryCountMismatch`] | Explicit arrays differ in length |
    /// | [`AlignError::InvalidBoundaryAnchors`] | Explicit arrays do not span `0..=m-1` and `0..=p-1` |
    /// | [`AlignError::SlackTooLarge`] | Some segment has fewer than `slack + 2` intervals |
    pub fn build(
        spec: &SegmentSpec,
        slack: usize,
        m: usize,
        p: usize,
        equal_lengths: bool,
    ) -> Result<Self, AlignError> {
        let (reference, sample) = match spec {
            SegmentSpec::Length(seg) => uniform(*seg, m, p, equal_lengths)?,
            SegmentSpec::Boundaries { reference, sample } => {
                explicit(reference, sample, m, p)?;
                (reference.clone(), sample.clone())
            }
        };

        let segmentation = Self {
            reference,
            sample,
            slack,
        };
        segmentation.check_slack()?;
        Ok(segmentation)
    }

    fn check_slack(&self) -> Result<(), AlignError> {
        let required = self.slack + 2;
        let shortest = (0..self.n_segments())
            .flat_map(|i| [(i, self.reference_intervals(i)), (i, self.sample_intervals(i))])
            .min_by_key(|&(_, len)| len);
        match shortest {
            Some((segment, intervals)) if intervals < required => Err(AlignError::SlackTooLarge {
                slack: self.slack,
                required,
                segment,
                intervals,
            }),
            _ => Ok(()),
        }
    }

    /// Return the number of segments.
    #[must_use]
    pub fn n_segments(&self) -> usize {
        self.reference.len() - 1
    }

    /// Return the uniform slack.
    #[must_use]
    pub fn slack(&self) -> usize {
        self.slack
    }

    /// Return the `N + 1` reference-frame boundaries.
    #[must_use]
    pub fn reference_boundaries(&self) -> &[usize] {
        &self.reference
    }

    /// Return the `N + 1` nominal sample-frame boundaries.
    #[must_use]
    pub fn sample_boundaries(&self) -> &[usize] {
        &self.sample
    }

    /// Interval count of segment `i` in the reference frame.
    #[must_use]
    pub fn reference_intervals(&self, i: usize) -> usize {
        self.reference[i + 1] - self.reference[i]
    }

    /// Interval count of segment `i` in the sample frame.
    #[must_use]
    pub fn sample_intervals(&self, i: usize) -> usize {
        self.sample[i + 1] - self.sample[i]
    }

    /// One-line summary per frame, e.g. `"11 points x 4 segments + 13 (reference)"`.
    #[must_use]
    pub fn describe(&self) -> Vec<String> {
        let n = self.n_segments();
        let line = |first: usize, last: usize, frame: &str| {
            if first == last || n == 1 {
                format!("{} points x {n} segments ({frame})", first + 1)
            } else {
                format!("{} points x {} segments + {} ({frame})", first + 1, n - 1, last + 1)
            }
        };
        vec![
            line(self.reference_intervals(0), self.reference_intervals(n - 1), "reference"),
            line(self.sample_intervals(0), self.sample_intervals(n - 1), "sample"),
        ]
    }
}

fn uniform(
    seg: usize,
    m: usize,
    p: usize,
    equal_lengths: bool,
) -> Result<(Vec<usize>, Vec<usize>), AlignError> {
    if seg < 2 {
        return Err(AlignError::SegmentTooShort { segment: 0 });
    }
    let too_long = AlignError::SegmentTooLong {
        segment: seg,
        reference_len: m,
        sample_len: p,
    };
    if seg > m.min(p) {
        return Err(too_long);
    }

    let (n, ref_interval, sample_interval) = if equal_lengths {
        let n = (m - 1) / seg;
        if n == 0 {
            return Err(too_long);
        }
        let sample_interval = (p - 1) / n;
        if sample_interval == 0 {
            return Err(too_long);
        }
        (n, (m - 1) / n, sample_interval)
    } else {
        let interval = seg - 1;
        let n = (m - 1) / interval;
        let n_sample = (p - 1) / interval;
        if n != n_sample {
            return Err(AlignError::SegmentCountMismatch {
                reference: n,
                sample: n_sample,
            });
        }
        (n, interval, interval)
    };

    Ok((
        boundaries(n, ref_interval, m - 1),
        boundaries(n, sample_interval, p - 1),
    ))
}

/// `n + 1` boundaries spaced `interval` apart, with the last pinned to `last`.
fn boundaries(n: usize, interval: usize, last: usize) -> Vec<usize> {
    let mut b: Vec<usize> = (0..n).map(|i| i * interval).collect();
    b.push(last);
    b
}

fn explicit(reference: &[usize], sample: &[usize], m: usize, p: usize) -> Result<(), AlignError> {
    if reference.len() != sample.len() {
        return Err(AlignError::BoundaryCountMismatch {
            reference: reference.len(),
            sample: sample.len(),
        });
    }
    let anchors = AlignError::InvalidBoundaryAnchors {
        reference_end: m.saturating_sub(1),
        sample_end: p.saturating_sub(1),
    };
    if reference.len() < 2 {
        return Err(anchors);
    }
    let last = reference.len() - 1;
    if reference[0] != 0 || sample[0] != 0 || reference[last] + 1 != m || sample[last] + 1 != p {
        return Err(anchors);
    }
    for frame in [reference, sample] {
        if let Some(segment) = frame.windows(2).position(|w| w[1] <= w[0]) {
            return Err(AlignError::SegmentTooShort { segment });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_same_lengths_folds_remainder() {
        // m = 23: 22 intervals / 5 = 4 segments, remainder 2 folded into the last.
        let s = Segmentation::build(&SegmentSpec::Length(6), 1, 23, 23, false).unwrap();
        assert_eq!(s.n_segments(), 4);
        assert_eq!(s.reference_boundaries(), &[0, 5, 10, 15, 22]);
        assert_eq!(s.sample_boundaries(), &[0, 5, 10, 15, 22]);
    }

    #[test]
    fn first_and_last_boundaries_are_pinned() {
        let s = Segmentation::build(&SegmentSpec::Length(5), 1, 40, 38, false).unwrap();
        let r = s.reference_boundaries();
        let x = s.sample_boundaries();
        assert_eq!(r[0], 0);
        assert_eq!(x[0], 0);
        assert_eq!(*r.last().unwrap(), 39);
        assert_eq!(*x.last().unwrap(), 37);
    }

    #[test]
    fn segment_count_mismatch_without_equal_lengths() {
        let result = Segmentation::build(&SegmentSpec::Length(5), 1, 21, 41, false);
        assert!(matches!(
            result,
            Err(AlignError::SegmentCountMismatch { reference: 5, sample: 10 })
        ));
    }

    #[test]
    fn equal_lengths_stretch_sample_intervals() {
        let s = Segmentation::build(&SegmentSpec::Length(5), 1, 21, 41, true).unwrap();
        assert_eq!(s.n_segments(), 4);
        assert_eq!(s.reference_boundaries(), &[0, 5, 10, 15, 20]);
        assert_eq!(s.sample_boundaries(), &[0, 10, 20, 30, 40]);
    }

    #[test]
    fn segment_longer_than_signal_rejected() {
        let result = Segmentation::build(&SegmentSpec::Length(30), 1, 20, 25, false);
        assert!(matches!(result, Err(AlignError::SegmentTooLong { segment: 30, .. })));
    }

    #[test]
    fn slack_must_leave_two_intervals() {
        // 4 intervals per segment, slack 3 needs 5.
        let result = Segmentation::build(&SegmentSpec::Length(5), 3, 21, 21, false);
        assert!(matches!(
            result,
            Err(AlignError::SlackTooLarge { slack: 3, required: 5, intervals: 4, .. })
        ));
        assert!(Segmentation::build(&SegmentSpec::Length(5), 2, 21, 21, false).is_ok());
    }

    #[test]
    fn explicit_boundaries_validated() {
        let ok = SegmentSpec::Boundaries {
            reference: vec![0, 6, 12, 19],
            sample: vec![0, 7, 14, 21],
        };
        let s = Segmentation::build(&ok, 2, 20, 22, false).unwrap();
        assert_eq!(s.n_segments(), 3);
        assert_eq!(s.sample_intervals(2), 7);

        let bad_anchor = SegmentSpec::Boundaries {
            reference: vec![1, 6, 12, 19],
            sample: vec![0, 7, 14, 21],
        };
        assert!(matches!(
            Segmentation::build(&bad_anchor, 1, 20, 22, false),
            Err(AlignError::InvalidBoundaryAnchors { reference_end: 19, sample_end: 21 })
        ));

        let ragged = SegmentSpec::Boundaries {
            reference: vec![0, 19],
            sample: vec![0, 10, 21],
        };
        assert!(matches!(
            Segmentation::build(&ragged, 1, 20, 22, false),
            Err(AlignError::BoundaryCountMismatch { reference: 2, sample: 3 })
        ));

        let backwards = SegmentSpec::Boundaries {
            reference: vec![0, 12, 6, 19],
            sample: vec![0, 7, 14, 21],
        };
        assert!(matches!(
            Segmentation::build(&backwards, 1, 20, 22, false),
            Err(AlignError::SegmentTooShort { segment: 1 })
        ));
    }

    #[test]
    fn per_boundary_slack_only_single_value() {
        assert_eq!(SlackSpec::PerBoundary(vec![3]).uniform().unwrap(), 3);
        assert!(matches!(
            SlackSpec::PerBoundary(vec![1, 2, 3]).uniform(),
            Err(AlignError::PerBoundarySlackUnsupported { len: 3 })
        ));
    }

    #[test]
    fn padding_moves_only_the_last_explicit_boundary() {
        let spec = SegmentSpec::Boundaries {
            reference: vec![0, 6, 19],
            sample: vec![0, 7, 21],
        };
        assert_eq!(
            spec.padded(200),
            SegmentSpec::Boundaries {
                reference: vec![0, 6, 219],
                sample: vec![0, 7, 221],
            }
        );
        assert_eq!(SegmentSpec::Length(8).padded(200), SegmentSpec::Length(8));
    }

    #[test]
    fn describe_mentions_remainder() {
        let s = Segmentation::build(&SegmentSpec::Length(6), 1, 23, 23, false).unwrap();
        let lines = s.describe();
        assert_eq!(lines[0], "6 points x 3 segments + 8 (reference)");
    }
}
