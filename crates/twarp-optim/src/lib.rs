//! Segment length and slack optimization for correlation optimized warping.
//!
//! Searches a rectangle of (segment, slack) pairs for the pair whose alignment
//! maximizes the warping effect: the simplicity of the warped matrix plus its
//! peak factor. A coarse grid is evaluated first and the best grid points seed
//! a triangle-reflection local search. Every trial is kept in an append-only
//! record list and pairs are never aligned twice.

mod config;
mod error;
mod evaluate;
mod grid;
mod record;
mod result;
mod score;
mod search;

pub use config::{OptimizeConfig, SearchSpace};
pub use error::OptimizeError;
pub use grid::{MAX_GRID_POINTS, coarse_grid};
pub use record::{OptimizationRecord, is_admissible};
pub use result::{OptimizeDiagnostics, OptimizeResult, SeedRun};
pub use score::{peak_factor, row_norms, simplicity};
