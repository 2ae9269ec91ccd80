//! Reference selection: collapse a matrix of candidate signals into one target vector.

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::signal::{Signal, SignalMatrix};
use crate::stats::{Centered, mean, median, median_sorted};

const BIWEIGHT_MAX_ITER: usize = 100;
const BIWEIGHT_TOL: f64 = 1e-8;

/// Criterion used to build the reference vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReferenceMode {
    /// Column-wise mean. Tends to broaden peaks that are shifted across samples.
    Mean,
    /// Column-wise median. Usually sharper than the mean.
    Median,
    /// Column-wise Tukey bi-weighted mean, a robust estimator between mean and median.
    BiweightMean,
    /// Column-wise maximum. A broad envelope showing which way alignment wants to go.
    Maximum,
    /// The row with the largest product of squared correlations with every other
    /// row. The only mode that selects a real sample.
    #[default]
    MaxCorrelation,
}

impl ReferenceMode {
    /// All modes in their canonical order.
    pub const ALL: [Self; 5] = [
        Self::Mean,
        Self::Median,
        Self::BiweightMean,
        Self::Maximum,
        Self::MaxCorrelation,
    ];
}

/// A selected reference and, for [`ReferenceMode::MaxCorrelation`], the row it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceSelection {
    /// The reference vector, same length as the input rows.
    pub reference: Signal,
    /// Mode used to build the reference.
    pub mode: ReferenceMode,
    /// Source row index when the reference is a copy of an input row.
    pub source_row: Option<usize>,
}

/// Select a reference vector from `signals` with the given criterion.
///
/// Input finiteness is guaranteed by [`SignalMatrix`] construction, so this
/// cannot fail.
#[must_use]
#[instrument(skip(signals), fields(rows = signals.n_rows(), cols = signals.n_cols()))]
pub fn select_reference(signals: &SignalMatrix, mode: ReferenceMode) -> ReferenceSelection {
    let (values, source_row) = match mode {
        ReferenceMode::Mean => (columnwise(signals, |c| mean(c)), None),
        ReferenceMode::Median => (columnwise(signals, |c| median(c)), None),
        ReferenceMode::BiweightMean => (columnwise(signals, |c| biweight_mean(c)), None),
        ReferenceMode::Maximum => (
            columnwise(signals, |c| c.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
            None,
        ),
        ReferenceMode::MaxCorrelation => {
            let row = max_correlation_row(signals);
            (signals.row(row).to_vec(), Some(row))
        }
    };
    debug!(?mode, ?source_row, "reference selected");
    ReferenceSelection {
        reference: Signal::new_unchecked(values),
        mode,
        source_row,
    }
}

/// Compute the reference for every mode at once, in [`ReferenceMode::ALL`] order.
#[must_use]
pub fn select_all(signals: &SignalMatrix) -> Vec<ReferenceSelection> {
    ReferenceMode::ALL
        .iter()
        .map(|&mode| select_reference(signals, mode))
        .collect()
}

fn columnwise(signals: &SignalMatrix, f: impl Fn(&[f64]) -> f64) -> Vec<f64> {
    (0..signals.n_cols()).map(|j| f(&signals.column(j))).collect()
}

/// Tukey bi-weighted mean of one column.
///
/// Starts from the median and re-weights with `(1 - z^2)^2` where
/// `z = (x - loc) / (3 * iqr)`, iterating until the squared relative change
/// drops to `1e-8` or 100 iterations pass. Falls back to the median when the
/// inter-quartile range is numerically zero.
pub(crate) fn biweight_mean(x: &[f64]) -> f64 {
    let n = x.len();
    let mut sorted = x.to_vec();
    sorted.sort_by(f64::total_cmp);
    let med = median_sorted(&sorted);

    let n_quart = (n as f64 * 0.25).round_ties_even() as usize;
    if n_quart == 0 {
        return med;
    }
    let iqr = sorted[n - n_quart - 1] - sorted[n_quart - 1];
    if 2.0 * iqr < f64::EPSILON {
        return med;
    }

    let scale = 3.0 * iqr;
    let weighted = |loc: f64| -> Option<f64> {
        let (mut num, mut den) = (0.0, 0.0);
        for &v in x {
            let z = (v - loc) / scale;
            if z.abs() <= 1.0 {
                let w = (1.0 - z * z).powi(2);
                num += w * v;
                den += w;
            }
        }
        (den > 0.0).then(|| num / den)
    };

    let Some(mut loc) = weighted(med) else {
        return med;
    };
    let mut old = med + f64::EPSILON;
    let mut iter = 0;
    while relative_change(old, loc) > BIWEIGHT_TOL && iter <= BIWEIGHT_MAX_ITER {
        iter += 1;
        old = loc;
        match weighted(loc) {
            Some(next) => loc = next,
            None => break,
        }
    }
    loc
}

fn relative_change(old: f64, new: f64) -> f64 {
    let diff = (old - new).powi(2);
    if old == 0.0 { diff } else { diff / (old * old) }
}

/// Index of the row whose product of squared correlations with all other rows is largest.
///
/// Ties resolve to the lowest row index.
fn max_correlation_row(signals: &SignalMatrix) -> usize {
    let n = signals.n_rows();
    let centered: Vec<Centered> = signals.rows().map(Centered::new).collect();

    let products: Vec<f64> = (0..n)
        .into_par_iter()
        .map(|a| {
            (0..n)
                .filter(|&b| b != a)
                .map(|b| centered[a].correlation(signals.row(b)).powi(2))
                .product()
        })
        .collect();

    products
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(best, best_val), (i, &v)| {
            if v > best_val { (i, v) } else { (best, best_val) }
        })
        .0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: Vec<Vec<f64>>) -> SignalMatrix {
        SignalMatrix::new(rows).unwrap()
    }

    #[test]
    fn mean_median_max_columnwise() {
        let m = matrix(vec![vec![1.0, 10.0], vec![2.0, 20.0], vec![6.0, 0.0]]);
        let mean_ref = select_reference(&m, ReferenceMode::Mean);
        assert_eq!(mean_ref.reference.as_slice(), &[3.0, 10.0]);
        assert_eq!(mean_ref.source_row, None);
        let median_ref = select_reference(&m, ReferenceMode::Median);
        assert_eq!(median_ref.reference.as_slice(), &[2.0, 10.0]);
        let max_ref = select_reference(&m, ReferenceMode::Maximum);
        assert_eq!(max_ref.reference.as_slice(), &[6.0, 20.0]);
    }

    #[test]
    fn biweight_returns_median_for_zero_iqr() {
        assert_eq!(biweight_mean(&[2.0, 2.0, 2.0, 2.0, 9.0]), 2.0);
    }

    #[test]
    fn biweight_single_value() {
        assert_eq!(biweight_mean(&[4.0]), 4.0);
    }

    #[test]
    fn biweight_resists_outlier() {
        let mut x = vec![9.0, 9.5, 10.0, 10.0, 10.5, 11.0, 9.8, 10.2];
        x.push(1000.0);
        let plain = mean(&x);
        let robust = biweight_mean(&x);
        let med = median(&x);
        assert!((robust - med).abs() < 0.5, "robust {robust} far from median {med}");
        assert!((plain - med).abs() > 50.0);
    }

    #[test]
    fn max_correlation_picks_central_row() {
        // Row 1 sits between rows 0 and 2 and correlates best with both.
        let m = matrix(vec![
            vec![0.0, 1.0, 3.0, 1.0, 0.0, 0.0],
            vec![0.0, 0.5, 2.0, 2.0, 0.5, 0.0],
            vec![0.0, 0.0, 1.0, 3.0, 1.0, 0.0],
        ]);
        let sel = select_reference(&m, ReferenceMode::MaxCorrelation);
        assert_eq!(sel.source_row, Some(1));
        assert_eq!(sel.reference.as_slice(), m.row(1));
    }

    #[test]
    fn max_correlation_constant_row_zeroes_every_product() {
        // Correlation with the constant row is 0 rather than NaN, so all
        // products are 0 and the tie resolves to the first row.
        let m = matrix(vec![vec![1.0, 2.0, 3.0], vec![1.0, 1.0, 1.0], vec![1.0, 2.5, 3.0]]);
        let sel = select_reference(&m, ReferenceMode::MaxCorrelation);
        assert_eq!(sel.source_row, Some(0));
    }

    #[test]
    fn select_all_covers_every_mode() {
        let m = matrix(vec![vec![1.0, 2.0, 3.0], vec![2.0, 3.0, 5.0]]);
        let all = select_all(&m);
        assert_eq!(all.len(), 5);
        for (sel, mode) in all.iter().zip(ReferenceMode::ALL) {
            assert_eq!(sel.mode, mode);
            assert_eq!(sel.reference.len(), 3);
        }
    }
}
