//! Signal types with validation guarantees.

use std::ops::Index;

use crate::error::SignalError;

/// Owned, validated signal. Guaranteed non-empty with all finite values.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal(Vec<f64>);

impl Signal {
    /// Create a new signal, validating that it is non-empty and all values are finite.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SignalError::EmptySignal`] | `values` is empty |
    /// | [`SignalError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn new(values: Vec<f64>) -> Result<Self, SignalError> {
        if values.is_empty() {
            return Err(SignalError::EmptySignal);
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(SignalError::NonFiniteValue { row: 0, index });
        }
        Ok(Self(values))
    }

    /// Wrap values that are already known to be finite and non-empty.
    pub(crate) fn new_unchecked(values: Vec<f64>) -> Self {
        debug_assert!(!values.is_empty());
        Self(values)
    }

    /// Return the number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if the signal has no points.
    ///
    /// A [`Signal`] constructed via [`Signal::new`] is always non-empty, so this
    /// always returns `false` for valid instances.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Return the underlying values.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Consume and return the inner vector.
    #[must_use]
    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl AsRef<[f64]> for Signal {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

impl TryFrom<Vec<f64>> for Signal {
    type Error = SignalError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl Index<usize> for Signal {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

/// Row-major matrix of equal-length signals, one signal per row.
///
/// Guaranteed to hold at least one non-empty row with all values finite.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalMatrix {
    n_rows: usize,
    n_cols: usize,
    data: Vec<f64>,
}

impl SignalMatrix {
    /// Build a matrix from rows, validating shape and finiteness.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SignalError::EmptyMatrix`] | `rows` is empty |
    /// | [`SignalError::EmptySignal`] | The first row is empty |
    /// | [`SignalError::RaggedMatrix`] | A row differs in length from the first |
    /// | [`SignalError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self, SignalError> {
        let first = rows.first().ok_or(SignalError::EmptyMatrix)?;
        let n_cols = first.len();
        if n_cols == 0 {
            return Err(SignalError::EmptySignal);
        }
        let n_rows = rows.len();
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != n_cols {
                return Err(SignalError::RaggedMatrix {
                    row,
                    expected: n_cols,
                    got: values.len(),
                });
            }
            if let Some(index) = values.iter().position(|v| !v.is_finite()) {
                return Err(SignalError::NonFiniteValue { row, index });
            }
            data.extend(values);
        }
        Ok(Self { n_rows, n_cols, data })
    }

    /// Build a matrix from already validated signals of equal length.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SignalError::EmptyMatrix`] | `signals` is empty |
    /// | [`SignalError::RaggedMatrix`] | A signal differs in length from the first |
    pub fn from_signals(signals: &[Signal]) -> Result<Self, SignalError> {
        Self::new(signals.iter().map(|s| s.as_slice().to_vec()).collect())
    }

    /// Build a matrix from a flat buffer whose shape is known to be valid.
    pub(crate) fn from_raw(n_rows: usize, n_cols: usize, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), n_rows * n_cols);
        Self { n_rows, n_cols, data }
    }

    /// Return the number of signals (rows).
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Return the number of points per signal (columns).
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Return row `i` as a slice.
    ///
    /// # Panics
    ///
    /// Panics if `i >= n_rows`.
    #[must_use]
    pub fn row(&self, i: usize) -> &[f64] {
        assert!(i < self.n_rows, "row index {i} out of bounds for {} rows", self.n_rows);
        &self.data[i * self.n_cols..(i + 1) * self.n_cols]
    }

    /// Iterate over rows as slices.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        self.data.chunks_exact(self.n_cols)
    }

    /// Return column `j` gathered across all rows.
    #[must_use]
    pub fn column(&self, j: usize) -> Vec<f64> {
        self.rows().map(|row| row[j]).collect()
    }

    /// Copy row `i` into an owned [`Signal`].
    #[must_use]
    pub fn signal(&self, i: usize) -> Signal {
        Signal::new_unchecked(self.row(i).to_vec())
    }

    /// Return the whole matrix as a row-major flat slice.
    #[must_use]
    pub fn as_flat(&self) -> &[f64] {
        &self.data
    }

    /// Convert into a vector of owned rows.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.rows().map(<[f64]>::to_vec).collect()
    }
}

impl From<Signal> for SignalMatrix {
    fn from(signal: Signal) -> Self {
        let n_cols = signal.len();
        Self::from_raw(1, n_cols, signal.into_inner())
    }
}
