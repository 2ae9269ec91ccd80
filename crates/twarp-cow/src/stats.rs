//! Small numeric helpers shared by the reference selector and the warping engine.

/// Arithmetic mean. Returns 0 for an empty slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median of an unsorted slice (mean of the two middle values for even lengths).
pub(crate) fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    median_sorted(&sorted)
}

/// Median of an already sorted slice.
pub(crate) fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Euclidean norm.
pub(crate) fn norm(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum::<f64>().sqrt()
}

/// Sample standard deviation (divides by `n - 1`). Returns 0 for fewer than two values.
pub(crate) fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (n - 1) as f64).sqrt()
}

/// A mean-centred copy of a segment together with its Euclidean norm.
///
/// Precomputed once per reference segment so the forward pass only has to
/// centre the interpolated sample.
#[derive(Debug, Clone)]
pub(crate) struct Centered {
    pub(crate) values: Vec<f64>,
    pub(crate) norm: f64,
}

impl Centered {
    pub(crate) fn new(values: &[f64]) -> Self {
        let m = mean(values);
        let values: Vec<f64> = values.iter().map(|v| v - m).collect();
        let norm = norm(&values);
        Self { values, norm }
    }

    /// Pearson correlation with `other` (same length).
    ///
    /// A zero-variance operand yields 0 instead of NaN.
    pub(crate) fn correlation(&self, other: &[f64]) -> f64 {
        debug_assert_eq!(self.values.len(), other.len());
        let m = mean(other);
        let mut dot = 0.0;
        let mut ss = 0.0;
        for (&t, &x) in self.values.iter().zip(other) {
            let xc = x - m;
            dot += t * xc;
            ss += xc * xc;
        }
        let cc = dot / (self.norm * ss.sqrt());
        if cc.is_finite() { cc } else { 0.0 }
    }
}

/// Pearson correlation between two equal-length slices, 0 when either is constant.
pub(crate) fn pearson(a: &[f64], b: &[f64]) -> f64 {
    Centered::new(a).correlation(b)
}
