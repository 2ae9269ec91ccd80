//! Warping-effect scores: simplicity and peak factor.

use nalgebra::{DMatrix, SVD};
use twarp_cow::SignalMatrix;

/// Sum of the fourth powers of the singular values of `samples` scaled to
/// unit Frobenius norm.
///
/// Ranges over `(0, 1]`; reaches 1 when all rows are proportional (rank one).
/// An all-zero matrix scores 0.
#[must_use]
pub fn simplicity(samples: &SignalMatrix) -> f64 {
    let frobenius = samples.as_flat().iter().map(|v| v * v).sum::<f64>().sqrt();
    if frobenius == 0.0 {
        return 0.0;
    }
    let scaled: Vec<f64> = samples.as_flat().iter().map(|v| v / frobenius).collect();
    let matrix = DMatrix::from_row_slice(samples.n_rows(), samples.n_cols(), &scaled);
    let svd = SVD::new(matrix, false, false);
    svd.singular_values.iter().map(|s| s.powi(4)).sum()
}

/// Euclidean norm of every row.
#[must_use]
pub fn row_norms(samples: &SignalMatrix) -> Vec<f64> {
    samples
        .rows()
        .map(|row| row.iter().map(|v| v * v).sum::<f64>().sqrt())
        .collect()
}

/// Mean over rows of `(1 - |(|warped| - |original|) / |original||)^2`.
///
/// A row whose original norm is zero counts as unchanged when its warped norm
/// is zero too, and as fully changed otherwise.
#[must_use]
pub fn peak_factor(original_norms: &[f64], warped: &SignalMatrix) -> f64 {
    let warped_norms = row_norms(warped);
    let total: f64 = original_norms
        .iter()
        .zip(&warped_norms)
        .map(|(&orig, &new)| {
            let deviation = if orig == 0.0 {
                if new == 0.0 { 0.0 } else { 1.0 }
            } else {
                ((new - orig) / orig).abs()
            };
            (1.0 - deviation).powi(2)
        })
        .sum();
    total / original_norms.len() as f64
}
