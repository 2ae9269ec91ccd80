//! JSON result writer for alignment and optimization outputs.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};
use twarp_cow::{CowResult, Signal};
use twarp_optim::{OptimizationRecord, OptimizeResult};

use crate::IoError;
use crate::domain::{ExperimentName, SignalId};

/// Writes alignment and optimization results to JSON files.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_warp.json` and
/// `{experiment}_optimize.json`.
pub struct ResultWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    fn artifact_path(&self, kind: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_{kind}.json", self.experiment.as_str()))
    }

    fn write_json<T: Serialize>(&self, path: &Path, artifact: &T) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(artifact).map_err(|e| IoError::Serialize {
            path: path.to_path_buf(),
            source: e,
        })?;
        fs::write(path, json).map_err(|e| IoError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Write an alignment result to `{experiment}_warp.json` and return its path.
    ///
    /// `ids[i]` labels row `i` of the aligned matrix.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Serialize`] or [`IoError::WriteFile`] if the file
    /// cannot be produced.
    #[instrument(skip_all)]
    pub fn write_warp(
        &self,
        ids: &[SignalId],
        reference: &Signal,
        result: &CowResult,
    ) -> Result<PathBuf, IoError> {
        let path = self.artifact_path("warp");
        let artifact = WarpArtifact {
            experiment: self.experiment.as_str(),
            reference: reference.as_slice(),
            alignment: AlignmentSection::new(ids, result),
        };
        self.write_json(&path, &artifact)?;
        info!(path = %path.display(), "warp result written");
        Ok(path)
    }

    /// Write an optimization result, and the alignment obtained with its best
    /// pair, to `{experiment}_optimize.json`. Returns the path.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Serialize`] or [`IoError::WriteFile`] if the file
    /// cannot be produced.
    #[instrument(skip_all)]
    pub fn write_optimize(
        &self,
        ids: &[SignalId],
        result: &OptimizeResult,
        best_alignment: &CowResult,
    ) -> Result<PathBuf, IoError> {
        let path = self.artifact_path("optimize");
        let diagnostics = &result.diagnostics;

        let seeds = diagnostics
            .seeds
            .iter()
            .map(|s| SeedEntry {
                record: s.record,
                steps: s.steps,
                hit_step_cap: s.hit_step_cap,
            })
            .collect();

        let artifact = OptimizeArtifact {
            experiment: self.experiment.as_str(),
            n_signals: ids.len(),
            best: RecordEntry::from(&result.best),
            best_index: result.best_index,
            base_simplicity: diagnostics.base_simplicity,
            reference: diagnostics.reference.as_slice(),
            reference_id: diagnostics
                .reference_row
                .and_then(|row| ids.get(row))
                .map(SignalId::as_str),
            alignment_calls: diagnostics.alignment_calls,
            elapsed_ms: diagnostics.elapsed.as_secs_f64() * 1e3,
            seeds,
            records: result.records.iter().map(RecordEntry::from).collect(),
            alignment: AlignmentSection::new(ids, best_alignment),
        };
        self.write_json(&path, &artifact)?;
        info!(path = %path.display(), "optimize result written");
        Ok(path)
    }
}

// ── Serialization shadow structs ──────────────────────────────────────────────

#[derive(Serialize)]
struct WarpArtifact<'a> {
    experiment: &'a str,
    reference: &'a [f64],
    alignment: AlignmentSection<'a>,
}

#[derive(Serialize)]
struct AlignmentSection<'a> {
    n_segments: usize,
    slack: usize,
    correlation_power: u32,
    padding: usize,
    reference_boundaries: &'a [usize],
    sample_boundaries: &'a [usize],
    feasible_lower: Vec<usize>,
    feasible_upper: Vec<usize>,
    signals: Vec<SignalEntry<'a>>,
}

impl<'a> AlignmentSection<'a> {
    fn new(ids: &'a [SignalId], result: &'a CowResult) -> Self {
        let d = &result.diagnostics;
        let n_boundaries = d.bounds.n_boundaries();
        let signals = ids
            .iter()
            .zip(&result.warping)
            .enumerate()
            .map(|(row, (id, path))| SignalEntry {
                id: id.as_str(),
                score: path.score(),
                path: path.positions(),
                warped: result.warped_row(row),
            })
            .collect();
        Self {
            n_segments: d.segmentation.n_segments(),
            slack: d.segmentation.slack(),
            correlation_power: d.correlation_power,
            padding: d.padding,
            reference_boundaries: d.segmentation.reference_boundaries(),
            sample_boundaries: d.segmentation.sample_boundaries(),
            feasible_lower: (0..n_boundaries).map(|i| d.bounds.lower(i)).collect(),
            feasible_upper: (0..n_boundaries).map(|i| d.bounds.upper(i)).collect(),
            signals,
        }
    }
}

#[derive(Serialize)]
struct SignalEntry<'a> {
    id: &'a str,
    score: f64,
    path: &'a [usize],
    warped: &'a [f64],
}

#[derive(Serialize)]
struct OptimizeArtifact<'a> {
    experiment: &'a str,
    n_signals: usize,
    best: RecordEntry,
    best_index: usize,
    base_simplicity: f64,
    reference: &'a [f64],
    reference_id: Option<&'a str>,
    alignment_calls: usize,
    elapsed_ms: f64,
    seeds: Vec<SeedEntry>,
    records: Vec<RecordEntry>,
    alignment: AlignmentSection<'a>,
}

#[derive(Serialize)]
struct SeedEntry {
    record: usize,
    steps: usize,
    hit_step_cap: bool,
}

#[derive(Serialize)]
struct RecordEntry {
    segment: i64,
    slack: i64,
    warping_effect: f64,
    simplicity: f64,
    peak_factor: f64,
    feasible: bool,
    reused_from: Option<usize>,
}

impl From<&OptimizationRecord> for RecordEntry {
    fn from(r: &OptimizationRecord) -> Self {
        Self {
            segment: r.segment,
            slack: r.slack,
            warping_effect: r.warping_effect,
            simplicity: r.simplicity,
            peak_factor: r.peak_factor,
            feasible: r.feasible,
            reused_from: r.reused_from,
        }
    }
}
