//! Segment-boundary dynamic programming for correlation optimized warping.

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::baseline::BaselineExtension;
use crate::bounds::FeasibleBounds;
use crate::config::CowConfig;
use crate::error::AlignError;
use crate::interp::{InterpCoefficients, resample};
use crate::path::WarpPath;
use crate::result::{CowDiagnostics, CowResult};
use crate::segment::Segmentation;
use crate::signal::{Signal, SignalMatrix};
use crate::stats::Centered;
use crate::table::CostTable;

/// Per-segment data shared by every row.
struct SegmentPlan {
    reference: Centered,
    coefficients: InterpCoefficients,
    sample_intervals: isize,
}

/// Everything a row needs besides its own values.
struct Plan<'a> {
    segmentation: &'a Segmentation,
    bounds: &'a FeasibleBounds,
    segments: Vec<SegmentPlan>,
    order: Vec<isize>,
    slack: isize,
    power: i32,
}

/// One warped row and its optional table.
struct RowOutcome {
    path: WarpPath,
    warped: Vec<f64>,
    table: Option<CostTable>,
}

#[instrument(skip(config, reference, samples), fields(rows = samples.n_rows(), m = reference.len(), p = samples.n_cols()))]
pub(crate) fn align(
    config: &CowConfig,
    reference: &Signal,
    samples: &SignalMatrix,
) -> Result<CowResult, AlignError> {
    let power = config.correlation_power;
    if !(1..=4).contains(&power) {
        return Err(AlignError::InvalidCorrelationPower { power });
    }

    let mut log = Vec::new();
    let original_m = reference.len();
    let extension = config.extend_baseline.then(|| BaselineExtension::new(config.seed));
    let padding = extension.map_or(0, |e| e.padding());
    let extended;
    let (reference, samples) = match &extension {
        Some(ext) => {
            extended = ext.extend(reference, samples);
            (&extended.0, &extended.1)
        }
        None => (reference, samples),
    };
    if padding > 0 {
        log.push(format!("baseline extended by {padding} points"));
    }

    let m = reference.len();
    let p = samples.n_cols();
    config.band.check_lengths(m, p)?;

    let segmentation = Segmentation::build(
        &config.segment.padded(padding),
        config.slack,
        m,
        p,
        config.equal_segment_lengths,
    )?;
    let bounds = FeasibleBounds::new(&segmentation, config.band, m, p)?;
    debug!(
        segments = segmentation.n_segments(),
        nodes = bounds.n_nodes(),
        "segmentation ready"
    );
    log.extend(segmentation.describe());

    let plan = Plan::new(&segmentation, &bounds, reference.as_slice(), power);
    let outcomes: Vec<RowOutcome> = samples
        .rows()
        .collect::<Vec<_>>()
        .into_par_iter()
        .enumerate()
        .map(|(row, values)| plan.warp_row(row, values, m, config.keep_full_table))
        .collect::<Result<_, AlignError>>()?;

    let mut warping = Vec::with_capacity(outcomes.len());
    let mut data = Vec::with_capacity(outcomes.len() * m);
    let mut tables = config.keep_full_table.then(Vec::new);
    for outcome in outcomes {
        warping.push(outcome.path);
        data.extend(outcome.warped);
        if let (Some(tables), Some(table)) = (tables.as_mut(), outcome.table) {
            tables.push(table);
        }
    }
    let mut warped = SignalMatrix::from_raw(warping.len(), m, data);
    if let Some(ext) = &extension {
        warped = ext.trim(&warped, original_m);
    }

    debug!(rows = warping.len(), "alignment complete");
    log.push(format!("{} rows warped onto {original_m} points", warping.len()));

    Ok(CowResult {
        warping,
        warped,
        diagnostics: CowDiagnostics {
            segmentation,
            bounds,
            correlation_power: power,
            padding,
            tables,
            log: if config.verbose { log } else { Vec::new() },
        },
    })
}

impl<'a> Plan<'a> {
    fn new(
        segmentation: &'a Segmentation,
        bounds: &'a FeasibleBounds,
        reference: &[f64],
        power: u32,
    ) -> Self {
        let slack = segmentation.slack();
        let r = segmentation.reference_boundaries();
        let segments = (0..segmentation.n_segments())
            .map(|i| SegmentPlan {
                reference: Centered::new(&reference[r[i]..=r[i + 1]]),
                coefficients: InterpCoefficients::for_segment(
                    segmentation.reference_intervals(i),
                    segmentation.sample_intervals(i),
                    slack,
                ),
                sample_intervals: segmentation.sample_intervals(i) as isize,
            })
            .collect();
        Self {
            segmentation,
            bounds,
            segments,
            order: tie_order(slack),
            slack: slack as isize,
            power: power as i32,
        }
    }

    fn warp_row(
        &self,
        row: usize,
        values: &[f64],
        m: usize,
        keep_table: bool,
    ) -> Result<RowOutcome, AlignError> {
        let table = self.forward(values);
        let end = values.len() - 1;
        let positions = table
            .trace_back(end)
            .ok_or(AlignError::UnreachableEndpoint { row })?;
        let score = table.score(self.bounds.n_boundaries() - 1, end);
        let warped = self.reconstruct(&positions, values, m);
        Ok(RowOutcome {
            path: WarpPath::new(positions, score),
            warped,
            table: keep_table.then_some(table),
        })
    }

    /// Fill the cost table segment by segment.
    ///
    /// For node `x` of boundary `i + 1` and slack offset `o`, the predecessor
    /// sits at `x - sample_intervals - o` and the candidate span has
    /// `sample_intervals + o` intervals.
    fn forward(&self, values: &[f64]) -> CostTable {
        let mut table = CostTable::new(self.bounds);
        for (i, seg) in self.segments.iter().enumerate() {
            let mut buf = vec![0.0; seg.coefficients.n_points()];
            for x in self.bounds.range(i + 1) {
                let base = x as isize - seg.sample_intervals;
                let mut best = f64::NEG_INFINITY;
                let mut pred = None;
                for &o in &self.order {
                    let prev = base - o;
                    if prev < 0 {
                        continue;
                    }
                    let prev = prev as usize;
                    let prev_score = table.score(i, prev);
                    if prev_score == f64::NEG_INFINITY {
                        continue;
                    }
                    let candidate = (o + self.slack) as usize;
                    seg.coefficients.interpolate_into(candidate, values, base, &mut buf);
                    let total = prev_score + seg.reference.correlation(&buf).powi(self.power);
                    if total > best {
                        best = total;
                        pred = Some(prev);
                    }
                }
                if let Some(prev) = pred {
                    table.set(i + 1, x, best, prev);
                }
            }
        }
        table
    }

    /// Resample each path segment of `values` onto its reference segment.
    fn reconstruct(&self, positions: &[usize], values: &[f64], m: usize) -> Vec<f64> {
        let mut out = Vec::with_capacity(m);
        out.push(values[positions[0]]);
        for (i, w) in positions.windows(2).enumerate() {
            let n_out = self.segmentation.reference_intervals(i) + 1;
            let piece = resample(&values[w[0]..=w[1]], n_out);
            out.extend_from_slice(&piece[1..]);
        }
        debug_assert_eq!(out.len(), m);
        out
    }
}

/// Slack offsets ordered `0, -1, 1, -2, 2, ...` so ties keep the diagonal.
fn tie_order(slack: usize) -> Vec<isize> {
    let mut order = Vec::with_capacity(2 * slack + 1);
    order.push(0);
    for s in 1..=slack as isize {
        order.push(-s);
        order.push(s);
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::BandConstraint;

    fn bumps(len: usize, shift: f64) -> Vec<f64> {
        (0..len)
            .map(|i| {
                let t = i as f64 - shift;
                (-((t - 15.0) / 4.0).powi(2)).exp() + 0.6 * (-((t - 32.0) / 3.0).powi(2)).exp()
            })
            .collect()
    }

    #[test]
    fn tie_order_prefers_diagonal() {
        assert_eq!(tie_order(2), vec![0, -1, 1, -2, 2]);
        assert_eq!(tie_order(0), vec![0]);
    }

    #[test]
    fn identity_alignment_reproduces_signal() {
        let values = bumps(45, 0.0);
        let reference = Signal::new(values.clone()).unwrap();
        let samples = SignalMatrix::new(vec![values.clone()]).unwrap();
        let result = CowConfig::uniform(8, 2).align(&reference, &samples).unwrap();
        let nominal = result.diagnostics.segmentation.sample_boundaries();
        assert_eq!(result.warping[0].positions(), nominal);
        for (a, b) in result.warped_row(0).iter().zip(&values) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn start_node_is_only_reachable_first_boundary() {
        let values = bumps(45, 0.0);
        let reference = Signal::new(values.clone()).unwrap();
        let samples = SignalMatrix::new(vec![values]).unwrap();
        let result = CowConfig::uniform(8, 2)
            .with_keep_full_table(true)
            .align(&reference, &samples)
            .unwrap();
        let table = &result.diagnostics.tables.as_ref().unwrap()[0];
        assert_eq!(table.score(0, 0), 0.0);
        assert_eq!(table.nodes(0).count(), 1);
    }

    #[test]
    fn shifted_sample_moves_boundaries() {
        let reference = Signal::new(bumps(45, 0.0)).unwrap();
        let samples = SignalMatrix::new(vec![bumps(45, 2.0)]).unwrap();
        let result = CowConfig::uniform(8, 2).align(&reference, &samples).unwrap();
        assert!(result.shifts()[0].iter().any(|&s| s != 0));
        assert_eq!(result.warped.n_cols(), 45);
    }

    #[test]
    fn invalid_power_rejected() {
        let values = bumps(30, 0.0);
        let reference = Signal::new(values.clone()).unwrap();
        let samples = SignalMatrix::new(vec![values]).unwrap();
        let result = CowConfig::uniform(8, 1)
            .with_correlation_power(5)
            .align(&reference, &samples);
        assert!(matches!(result, Err(AlignError::InvalidCorrelationPower { power: 5 })));
    }

    #[test]
    fn band_too_narrow_rejected() {
        let reference = Signal::new(bumps(40, 0.0)).unwrap();
        let samples = SignalMatrix::new(vec![bumps(46, 0.0)]).unwrap();
        let result = CowConfig::uniform(8, 1)
            .with_equal_segment_lengths(true)
            .with_band(BandConstraint::Width(3))
            .align(&reference, &samples);
        assert!(matches!(result, Err(AlignError::BandTooNarrow { band: 3, mismatch: 6 })));
    }

    #[test]
    fn verbose_collects_log_lines() {
        let values = bumps(45, 0.0);
        let reference = Signal::new(values.clone()).unwrap();
        let samples = SignalMatrix::new(vec![values]).unwrap();
        let quiet = CowConfig::uniform(8, 1).align(&reference, &samples).unwrap();
        assert!(quiet.diagnostics.log.is_empty());
        let loud = CowConfig::uniform(8, 1)
            .with_verbose(true)
            .align(&reference, &samples)
            .unwrap();
        assert!(loud.diagnostics.log.iter().any(|l| l.contains("(reference)")));
    }

    #[test]
    fn baseline_extension_is_trimmed() {
        let reference = Signal::new(bumps(45, 0.0)).unwrap();
        let samples = SignalMatrix::new(vec![bumps(45, 1.0), bumps(45, -1.0)]).unwrap();
        let result = CowConfig::uniform(10, 2)
            .with_extend_baseline(true)
            .align(&reference, &samples)
            .unwrap();
        assert_eq!(result.diagnostics.padding, 200);
        assert_eq!(result.warped.n_cols(), 45);
        for path in &result.warping {
            assert_eq!(*path.positions().last().unwrap(), 45 + 200 - 1);
        }
    }
}
