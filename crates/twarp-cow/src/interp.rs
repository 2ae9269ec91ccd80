//! Precomputed linear-interpolation coefficients for candidate segment lengths.

/// Interpolation weights and base indices mapping `n` evenly spaced output
/// points onto each candidate sample span.
///
/// For candidate `c` the interpolated value at output position `k` is
///
/// ```text
/// y[base + idx[k]] + w[k] * (y[base + idx[k] + 1] - y[base + idx[k]])
/// ```
///
/// where `base` is chosen by the caller. Indices are stored relative to the
/// candidate's slack offset (`floor_index - offset`), so that a caller
/// addressing every candidate from the same segment end can use a single
/// `base` per node.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpCoefficients {
    n_points: usize,
    offsets: Vec<isize>,
    weights: Vec<Vec<f64>>,
    indices: Vec<Vec<isize>>,
}

impl InterpCoefficients {
    /// Build coefficients for `n_points` output points and one candidate per
    /// `(span, offset)` pair, where `span` is the candidate's point count.
    ///
    /// Output position `k` maps to `t = k * (span - 1) / (n_points - 1)` on the
    /// candidate; the base index is `floor(t)` clamped to `span - 2` so the last
    /// output lands on the final candidate point with weight 1.
    ///
    /// # Panics
    ///
    /// Panics if `n_points < 2`, if `spans` and `offsets` differ in length, or
    /// if any span has fewer than two points.
    #[must_use]
    pub fn new(n_points: usize, spans: &[usize], offsets: &[isize]) -> Self {
        assert!(n_points >= 2, "need at least two output points, got {n_points}");
        assert_eq!(spans.len(), offsets.len(), "one offset per candidate span");

        let q = (n_points - 1) as f64;
        let mut weights = Vec::with_capacity(spans.len());
        let mut indices = Vec::with_capacity(spans.len());

        for (&span, &offset) in spans.iter().zip(offsets) {
            assert!(span >= 2, "candidate span must have at least two points, got {span}");
            let last_base = span - 2;
            let scale = (span - 1) as f64 / q;
            let mut w = Vec::with_capacity(n_points);
            let mut idx = Vec::with_capacity(n_points);
            for k in 0..n_points {
                let t = k as f64 * scale;
                let j = (t.floor().max(0.0) as usize).min(last_base);
                w.push(t - j as f64);
                idx.push(j as isize - offset);
            }
            weights.push(w);
            indices.push(idx);
        }

        Self {
            n_points,
            offsets: offsets.to_vec(),
            weights,
            indices,
        }
    }

    /// Build coefficients for a segment of `reference_intervals + 1` output points
    /// against every sample span `sample_intervals + offset + 1`, `offset` in `-slack..=slack`.
    #[must_use]
    pub fn for_segment(reference_intervals: usize, sample_intervals: usize, slack: usize) -> Self {
        let offsets = slack_offsets(slack);
        let spans: Vec<usize> = offsets
            .iter()
            .map(|&o| (sample_intervals as isize + o + 1) as usize)
            .collect();
        Self::new(reference_intervals + 1, &spans, &offsets)
    }

    /// Number of output points per candidate.
    #[must_use]
    pub fn n_points(&self) -> usize {
        self.n_points
    }

    /// Number of candidate spans.
    #[must_use]
    pub fn n_candidates(&self) -> usize {
        self.offsets.len()
    }

    /// Slack offset of candidate `c`.
    #[must_use]
    pub fn offset(&self, c: usize) -> isize {
        self.offsets[c]
    }

    /// Fractional weights of candidate `c`.
    #[must_use]
    pub fn weights(&self, c: usize) -> &[f64] {
        &self.weights[c]
    }

    /// Offset-relative base indices of candidate `c`.
    #[must_use]
    pub fn indices(&self, c: usize) -> &[isize] {
        &self.indices[c]
    }

    /// Interpolate candidate `c` from `values`, addressing index `base + idx[k]`.
    ///
    /// Writes `n_points` values into `out`.
    pub(crate) fn interpolate_into(&self, c: usize, values: &[f64], base: isize, out: &mut [f64]) {
        for ((o, &w), &i) in out.iter_mut().zip(&self.weights[c]).zip(&self.indices[c]) {
            let at = (base + i) as usize;
            let lo = values[at];
            *o = lo + w * (values[at + 1] - lo);
        }
    }
}

/// Slack offsets `-slack..=slack` in ascending order.
#[must_use]
pub fn slack_offsets(slack: usize) -> Vec<isize> {
    let s = slack as isize;
    (-s..=s).collect()
}

/// Resample `values` linearly onto `n_out` evenly spaced points spanning the whole slice.
///
/// The first and last outputs equal the first and last inputs.
pub(crate) fn resample(values: &[f64], n_out: usize) -> Vec<f64> {
    let len = values.len();
    if n_out == 1 || len == 1 {
        return vec![values[0]; n_out];
    }
    let scale = (len - 1) as f64 / (n_out - 1) as f64;
    (0..n_out)
        .map(|k| {
            let t = k as f64 * scale;
            let j = (t.floor() as usize).min(len - 2);
            let w = t - j as f64;
            values[j] + w * (values[j + 1] - values[j])
        })
        .collect()
}
