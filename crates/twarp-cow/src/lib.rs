//! Correlation optimized warping and reference selection.
//!
//! Pure math library, zero I/O. Aligns one or more sample signals to a
//! reference by splitting both into matched segments and choosing, per sample,
//! the boundary positions that maximize the summed segment correlation. The
//! sample is then resampled piecewise-linearly onto the reference grid.
//!
//! Also provides the reference selector (mean, median, bi-weighted mean,
//! maximum, max cumulative correlation) and the interpolation coefficients the
//! dynamic program uses.

mod baseline;
mod bounds;
mod config;
mod cow;
mod error;
mod interp;
mod path;
mod reference;
mod result;
mod segment;
mod signal;
mod stats;
mod table;

pub use baseline::{BASELINE_PADDING, BaselineExtension};
pub use bounds::{BandConstraint, FeasibleBounds};
pub use config::CowConfig;
pub use error::{AlignError, SignalError};
pub use interp::{InterpCoefficients, slack_offsets};
pub use path::WarpPath;
pub use reference::{ReferenceMode, ReferenceSelection, select_all, select_reference};
pub use result::{CowDiagnostics, CowResult};
pub use segment::{SegmentSpec, Segmentation, SlackSpec};
pub use signal::{Signal, SignalMatrix};
pub use table::CostTable;

/// Pearson correlation between two equal-length slices, `0` when either is constant.
///
/// # Panics
///
/// Panics in debug builds if the lengths differ.
#[must_use]
pub fn correlation(a: &[f64], b: &[f64]) -> f64 {
    stats::pearson(a, b)
}
