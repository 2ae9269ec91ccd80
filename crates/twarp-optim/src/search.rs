//! Coarse grid search followed by triangle-reflection local search.
//!
//! Every trial is appended to a [`RecordBook`]. The grid phase evaluates the
//! Cartesian product of two [`coarse_grid`]s. The best distinct scores seed a
//! local search that keeps a triangle of three trials and repeatedly reflects
//! its worst vertex away from the other two.

use std::time::Instant;

use tracing::{debug, info, instrument, warn};
use twarp_cow::{BandConstraint, ReferenceMode, Signal, SignalMatrix, select_reference};

use crate::config::OptimizeConfig;
use crate::error::OptimizeError;
use crate::evaluate::Evaluator;
use crate::grid::coarse_grid;
use crate::record::RecordBook;
use crate::result::{OptimizeDiagnostics, OptimizeResult, SeedRun};
use crate::score::simplicity;

// ── Reflection moves ──────────────────────────────────────────────────────────

/// Position of the worst vertex relative to the other two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Neighbours {
    less_segment: usize,
    more_segment: usize,
    less_slack: usize,
    more_slack: usize,
}

impl Neighbours {
    fn around(worst: (i64, i64), triangle: &[(i64, i64); 3]) -> Self {
        let mut n = Self {
            less_segment: 0,
            more_segment: 0,
            less_slack: 0,
            more_slack: 0,
        };
        for &(segment, slack) in triangle {
            if segment < worst.0 {
                n.less_segment += 1;
            } else if segment > worst.0 {
                n.more_segment += 1;
            }
            if slack < worst.1 {
                n.less_slack += 1;
            } else if slack > worst.1 {
                n.more_slack += 1;
            }
        }
        n
    }
}

/// Step applied to the worst vertex, as `(d_segment, d_slack)`.
///
/// Axis-aligned jumps of two take priority over the diagonal moves. `None`
/// means the configuration has no reflection and ends the seed.
fn reflection(n: Neighbours) -> Option<(i64, i64)> {
    match (n.less_segment, n.more_segment, n.less_slack, n.more_slack) {
        (_, 2, _, _) => Some((2, 0)),
        (_, _, _, 2) => Some((0, 2)),
        (2, _, _, _) => Some((-2, 0)),
        (_, _, 2, _) => Some((0, -2)),
        (1, 0, 1, 0) => Some((-1, -1)),
        (0, 1, 1, 0) => Some((1, -1)),
        (0, 1, 0, 1) => Some((1, 1)),
        (1, 0, 0, 1) => Some((-1, 1)),
        _ => None,
    }
}

// ── Local search ──────────────────────────────────────────────────────────────

enum Reflection {
    /// No move applies to this vertex.
    Stuck,
    /// The reflected trial did not beat the vertex.
    Rejected,
    /// The reflected trial's record index.
    Accepted(usize),
}

struct Search<'a, 'b> {
    book: RecordBook,
    evaluator: Evaluator<'a>,
    config: &'b OptimizeConfig,
    started: Instant,
    log: Vec<String>,
}

impl Search<'_, '_> {
    fn coordinates(&self, index: usize) -> (i64, i64) {
        let r = self.book.get(index);
        (r.segment, r.slack)
    }

    fn score(&self, index: usize) -> f64 {
        self.book.get(index).warping_effect
    }

    fn out_of_time(&self) -> bool {
        self.config
            .max_duration()
            .is_some_and(|limit| self.started.elapsed() >= limit)
    }

    fn note(&mut self, line: String) {
        if self.config.verbose() {
            self.log.push(line);
        }
    }

    /// Reflect triangle vertex `vertex` and evaluate the new point.
    fn reflect(&mut self, triangle: &[usize; 3], vertex: usize) -> Result<Reflection, OptimizeError> {
        let points = triangle.map(|i| self.coordinates(i));
        let worst = self.coordinates(triangle[vertex]);
        let Some((ds, dl)) = reflection(Neighbours::around(worst, &points)) else {
            return Ok(Reflection::Stuck);
        };
        let index = self
            .evaluator
            .evaluate(&mut self.book, worst.0 + ds, worst.1 + dl)?;
        if self.score(index) > self.score(triangle[vertex]) {
            Ok(Reflection::Accepted(index))
        } else {
            Ok(Reflection::Rejected)
        }
    }

    fn run_seed(&mut self, seed: usize) -> Result<SeedRun, OptimizeError> {
        let start = self.book.len();
        let (segment, slack) = self.coordinates(seed);
        self.note(format!("seed record {seed}: segment {segment}, slack {slack}"));
        let mut triangle = [
            seed,
            self.evaluator.evaluate(&mut self.book, segment + 1, slack)?,
            self.evaluator.evaluate(&mut self.book, segment, slack + 1)?,
        ];
        let mut hit_step_cap = false;

        loop {
            let mut order = [0usize, 1, 2];
            order.sort_by(|&a, &b| self.score(triangle[a]).total_cmp(&self.score(triangle[b])));

            // Worst vertex first, then the second worst.
            match self.reflect(&triangle, order[0])? {
                Reflection::Stuck => break,
                Reflection::Accepted(index) => triangle[order[0]] = index,
                Reflection::Rejected => match self.reflect(&triangle, order[1])? {
                    Reflection::Accepted(index) => triangle[order[1]] = index,
                    Reflection::Stuck | Reflection::Rejected => break,
                },
            }

            if self.book.len() - start >= self.config.max_steps() {
                hit_step_cap = true;
                warn!(seed, steps = self.book.len() - start, "local search hit step cap");
                self.note(format!("seed record {seed}: terminated early at step cap"));
                break;
            }
            if self.out_of_time() {
                break;
            }
        }

        let steps = self.book.len() - start;
        debug!(seed, steps, "local search finished");
        Ok(SeedRun {
            record: seed,
            steps,
            hit_step_cap,
        })
    }
}

// ── optimize ──────────────────────────────────────────────────────────────────

/// Search for the (segment, slack) pair maximizing the warping effect.
#[instrument(skip_all, fields(rows = samples.n_rows(), cols = samples.n_cols()))]
pub(crate) fn optimize(
    config: &OptimizeConfig,
    samples: &SignalMatrix,
    reference: Option<&Signal>,
) -> Result<OptimizeResult, OptimizeError> {
    config.validate()?;
    let started = Instant::now();

    let (reference, reference_row) = match reference {
        Some(r) => (r.clone(), None),
        None => {
            let selection = select_reference(samples, ReferenceMode::MaxCorrelation);
            (selection.reference, selection.source_row)
        }
    };

    let m = reference.len();
    let band = BandConstraint::from_width((m as f64 * config.band_fraction()).round_ties_even() as usize);
    band.check_lengths(m, samples.n_cols())?;

    let base_simplicity = simplicity(samples);
    let evaluator = Evaluator::new(
        &reference,
        samples,
        band,
        config.extend_baseline(),
        config.seed(),
    );
    let mut search = Search {
        book: RecordBook::default(),
        evaluator,
        config,
        started,
        log: Vec::new(),
    };
    if let Some(row) = reference_row {
        search.note(format!("reference: row {row} (max correlation)"));
    }
    search.note(format!("base simplicity {base_simplicity:.6}"));

    let space = config.search_space();
    let segments = coarse_grid(space.segment_min() as i64, space.segment_max() as i64);
    let slacks = coarse_grid(space.slack_min() as i64, space.slack_max() as i64);
    let n_grid = segments.len() * slacks.len();
    for &segment in &segments {
        for &slack in &slacks {
            let index = search.evaluator.evaluate(&mut search.book, segment, slack)?;
            let r = *search.book.get(index);
            search.note(format!(
                "grid {}/{n_grid}: segment {segment}, slack {slack}, effect {:.6} (simplicity {:.6}, peak factor {:.6})",
                index + 1,
                r.warping_effect,
                r.simplicity,
                r.peak_factor,
            ));
        }
    }
    debug!(n_grid, "grid phase complete");

    let seeds = search.book.seed_indices(config.n_seeds());
    let mut seed_runs = Vec::with_capacity(seeds.len());
    for seed in seeds {
        if search.out_of_time() {
            search.note("time limit reached, skipping remaining seeds".to_string());
            break;
        }
        seed_runs.push(search.run_seed(seed)?);
    }

    let Search {
        book,
        evaluator,
        log,
        ..
    } = search;
    // The grid phase always appends at least one record.
    let best_index = book.best().unwrap_or(0);
    let best = *book.get(best_index);
    let alignment_calls = evaluator.alignment_calls();
    let elapsed = started.elapsed();

    info!(
        segment = best.segment,
        slack = best.slack,
        warping_effect = best.warping_effect,
        records = book.len(),
        alignment_calls,
        elapsed_ms = elapsed.as_millis() as u64,
        "optimization complete"
    );
    if !best.feasible {
        warn!("no feasible segment/slack pair in the search space");
    }

    Ok(OptimizeResult {
        best,
        best_index,
        diagnostics: OptimizeDiagnostics {
            base_simplicity,
            reference,
            reference_row,
            seeds: seed_runs,
            alignment_calls,
            elapsed,
            log,
        },
        records: book.into_records(),
    })
}
