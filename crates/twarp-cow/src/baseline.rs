//! Baseline extension: pad signals with noise before alignment, trim after.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::signal::{Signal, SignalMatrix};
use crate::stats::sample_std;

/// Number of points appended by [`BaselineExtension`].
pub const BASELINE_PADDING: usize = 200;

/// Reversible transform that appends synthetic baseline noise to the
/// reference and every sample row.
///
/// The noise for each signal is centred on its last value with the sample
/// standard deviation of its lowest 25% of values, so late peaks near the end
/// of a signal keep room to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaselineExtension {
    padding: usize,
    seed: u64,
}

impl BaselineExtension {
    /// Create an extension of [`BASELINE_PADDING`] points drawn from a seeded RNG.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            padding: BASELINE_PADDING,
            seed,
        }
    }

    /// Return the number of points appended per signal.
    #[must_use]
    pub fn padding(&self) -> usize {
        self.padding
    }

    /// Extend the reference and every sample row.
    ///
    /// Every signal draws the same noise sequence, so a row equal to the
    /// reference gets the same padding.
    #[must_use]
    pub fn extend(&self, reference: &Signal, samples: &SignalMatrix) -> (Signal, SignalMatrix) {
        let reference = Signal::new_unchecked(self.extend_one(reference.as_slice()));

        let n_cols = samples.n_cols() + self.padding;
        let mut data = Vec::with_capacity(samples.n_rows() * n_cols);
        for row in samples.rows() {
            data.extend(self.extend_one(row));
        }
        (reference, SignalMatrix::from_raw(samples.n_rows(), n_cols, data))
    }

    fn extend_one(&self, values: &[f64]) -> Vec<f64> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let std = sample_std(&sorted[..values.len() / 4]);
        let last = values[values.len() - 1];

        let mut out = Vec::with_capacity(values.len() + self.padding);
        out.extend_from_slice(values);
        out.extend((0..self.padding).map(|_| {
            let z: f64 = StandardNormal.sample(&mut rng);
            z * std + last
        }));
        out
    }

    /// Drop the padding from warped rows, leaving `n_cols` points per row.
    #[must_use]
    pub fn trim(&self, warped: &SignalMatrix, n_cols: usize) -> SignalMatrix {
        let mut data = Vec::with_capacity(warped.n_rows() * n_cols);
        for row in warped.rows() {
            data.extend_from_slice(&row[..n_cols]);
        }
        SignalMatrix::from_raw(warped.n_rows(), n_cols, data)
    }
}
