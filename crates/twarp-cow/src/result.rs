//! Result and diagnostics types for correlation optimized warping.

use crate::bounds::FeasibleBounds;
use crate::path::WarpPath;
use crate::segment::Segmentation;
use crate::signal::SignalMatrix;
use crate::table::CostTable;

/// Result of aligning a sample matrix to a reference.
#[derive(Debug, Clone)]
pub struct CowResult {
    /// Warp path per sample row, in the frame the alignment ran in (including
    /// any baseline padding).
    pub warping: Vec<WarpPath>,
    /// Warped samples; every row has the reference length.
    pub warped: SignalMatrix,
    /// Segmentation, feasibility windows and optional tables.
    pub diagnostics: CowDiagnostics,
}

impl CowResult {
    /// Return the warped row `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is not a sample row.
    #[must_use]
    pub fn warped_row(&self, i: usize) -> &[f64] {
        self.warped.row(i)
    }

    /// Per-row boundary displacement from the nominal sample boundaries.
    #[must_use]
    pub fn shifts(&self) -> Vec<Vec<isize>> {
        let nominal = self.diagnostics.segmentation.sample_boundaries();
        self.warping.iter().map(|p| p.shifts(nominal)).collect()
    }
}

/// Diagnostics of one alignment call.
#[derive(Debug, Clone)]
pub struct CowDiagnostics {
    /// Matched boundaries in the reference and nominal sample frames.
    pub segmentation: Segmentation,
    /// Feasible sample positions per boundary.
    pub bounds: FeasibleBounds,
    /// Correlation power used.
    pub correlation_power: u32,
    /// Points appended by baseline extension, `0` when disabled.
    pub padding: usize,
    /// Cost table per row, when requested.
    pub tables: Option<Vec<CostTable>>,
    /// Log lines, populated when verbose.
    pub log: Vec<String>,
}
