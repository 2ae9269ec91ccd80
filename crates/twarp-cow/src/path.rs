//! Warp path types for correlation optimized warping.

/// Chosen sample-frame boundary positions for one sample row.
///
/// Holds one position per segment boundary, from `0` to the last sample index,
/// strictly increasing. Position `i` is matched to reference boundary `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct WarpPath {
    positions: Vec<usize>,
    score: f64,
}

impl WarpPath {
    pub(crate) fn new(positions: Vec<usize>, score: f64) -> Self {
        debug_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        Self { positions, score }
    }

    /// Return the boundary positions as a slice.
    #[must_use]
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Return the total correlation score accumulated along the path.
    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Return the number of boundaries on the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Return true if the path holds no boundaries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Per-boundary displacement from `nominal`, positive when the sample
    /// boundary moved right.
    #[must_use]
    pub fn shifts(&self, nominal: &[usize]) -> Vec<isize> {
        self.positions
            .iter()
            .zip(nominal)
            .map(|(&x, &b)| x as isize - b as isize)
            .collect()
    }
}

impl<'a> IntoIterator for &'a WarpPath {
    type Item = &'a usize;
    type IntoIter = std::slice::Iter<'a, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.positions.iter()
    }
}
