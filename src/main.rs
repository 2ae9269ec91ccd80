use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info, warn};

use twarp_cow::{
    BandConstraint, CowConfig, CowResult, ReferenceMode, ReferenceSelection, Signal, SignalMatrix,
    correlation, select_all, select_reference,
};
use twarp_io::{ExperimentName, ResultWriter, SignalDataset, SignalReader};
use twarp_optim::{OptimizeConfig, SearchSpace};

#[derive(Parser)]
#[command(name = "twarp")]
#[command(about = "Correlation optimized warping for aligning spectra and chromatograms")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Seed for baseline-extension noise
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging and collect progress lines
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// How to choose the reference signal.
#[derive(Args, Debug, Clone)]
struct ReferenceArgs {
    /// Reference criterion: "mean", "median", "biweight", "max", or "max-correlation"
    #[arg(long, default_value = "max-correlation")]
    reference_mode: String,

    /// Use the row with this id as the reference instead of a criterion
    #[arg(long, conflicts_with = "reference_mode")]
    reference_id: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Select a reference signal and print it
    Reference {
        /// Path to the input CSV file
        #[arg(long)]
        data: PathBuf,

        /// Reference criterion: "mean", "median", "biweight", "max", or "max-correlation"
        #[arg(long, default_value = "max-correlation")]
        mode: String,

        /// Print the reference for every criterion
        #[arg(long, default_value_t = false)]
        all: bool,
    },

    /// Align every signal to a reference with a fixed segment length and slack
    Warp {
        /// Path to the input CSV file
        #[arg(long)]
        data: PathBuf,

        /// Segment length in points
        #[arg(long)]
        segment: usize,

        /// Maximum boundary displacement per segment
        #[arg(long)]
        slack: usize,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Power each segment correlation is raised to (1-4)
        #[arg(long, default_value_t = 1)]
        correlation_power: u32,

        /// Give reference and sample the same number of segments
        #[arg(long, default_value_t = false)]
        equal_segments: bool,

        /// Band width around the diagonal in points (0 = unconstrained)
        #[arg(long, default_value_t = 0)]
        band: usize,

        /// Pad signals with baseline noise before aligning
        #[arg(long, default_value_t = false)]
        extend_baseline: bool,

        #[command(flatten)]
        reference: ReferenceArgs,
    },

    /// Search for the segment length and slack with the best warping effect
    Optimize {
        /// Path to the input CSV file
        #[arg(long)]
        data: PathBuf,

        /// Smallest segment length to try
        #[arg(long)]
        segment_min: usize,

        /// Largest segment length to try
        #[arg(long)]
        segment_max: usize,

        /// Smallest slack to try
        #[arg(long, default_value_t = 1)]
        slack_min: usize,

        /// Largest slack to try
        #[arg(long)]
        slack_max: usize,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Use the row with this id as the reference (default: max-correlation row)
        #[arg(long)]
        reference_id: Option<String>,

        /// Number of best grid points that seed a local search
        #[arg(long, default_value_t = 3)]
        seeds: usize,

        /// Maximum trials per local search
        #[arg(long, default_value_t = 50)]
        max_steps: usize,

        /// Band width as a fraction of the reference length (0 = unconstrained)
        #[arg(long, default_value_t = 0.15)]
        band_fraction: f64,

        /// Align without baseline extension
        #[arg(long, default_value_t = false)]
        no_extend_baseline: bool,

        /// Stop local search after this many seconds
        #[arg(long)]
        max_seconds: Option<f64>,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct ReferenceOutput {
    mode: String,
    source_id: Option<String>,
    reference: Vec<f64>,
}

#[derive(Serialize)]
struct WarpOutput {
    experiment: String,
    n_signals: usize,
    n_points: usize,
    reference: String,
    segment: usize,
    slack: usize,
    n_segments: usize,
    mean_correlation_before: f64,
    mean_correlation_after: f64,
    output: PathBuf,
}

#[derive(Serialize)]
struct OptimizeOutput {
    experiment: String,
    n_signals: usize,
    reference: Option<String>,
    segment: usize,
    slack: usize,
    warping_effect: f64,
    simplicity: f64,
    peak_factor: f64,
    base_simplicity: f64,
    n_records: usize,
    alignment_calls: usize,
    elapsed_ms: f64,
    output: PathBuf,
}

fn parse_reference_mode(s: &str) -> Result<ReferenceMode> {
    match s {
        "mean" => Ok(ReferenceMode::Mean),
        "median" => Ok(ReferenceMode::Median),
        "biweight" => Ok(ReferenceMode::BiweightMean),
        "max" => Ok(ReferenceMode::Maximum),
        "max-correlation" => Ok(ReferenceMode::MaxCorrelation),
        other => anyhow::bail!(
            "unknown reference mode: {other} (expected mean, median, biweight, max, or max-correlation)"
        ),
    }
}

fn mode_name(mode: ReferenceMode) -> &'static str {
    match mode {
        ReferenceMode::Mean => "mean",
        ReferenceMode::Median => "median",
        ReferenceMode::BiweightMean => "biweight",
        ReferenceMode::Maximum => "max",
        ReferenceMode::MaxCorrelation => "max-correlation",
    }
}

fn reference_output(dataset: &SignalDataset, selection: ReferenceSelection) -> ReferenceOutput {
    ReferenceOutput {
        mode: mode_name(selection.mode).to_string(),
        source_id: selection
            .source_row
            .map(|row| dataset.ids[row].as_str().to_string()),
        reference: selection.reference.into_inner(),
    }
}

/// Resolve the reference signal and a label describing where it came from.
fn resolve_reference(dataset: &SignalDataset, args: &ReferenceArgs) -> Result<(Signal, String)> {
    if let Some(id) = &args.reference_id {
        let row = dataset
            .position(id)
            .with_context(|| format!("reference id {id:?} not found in dataset"))?;
        return Ok((dataset.signals.signal(row), id.clone()));
    }
    let mode = parse_reference_mode(&args.reference_mode)?;
    let selection = select_reference(&dataset.signals, mode);
    let label = match selection.source_row {
        Some(row) => format!("{} ({})", mode_name(mode), dataset.ids[row]),
        None => mode_name(mode).to_string(),
    };
    Ok((selection.reference, label))
}

fn mean_correlation(reference: &Signal, rows: &SignalMatrix) -> f64 {
    let total: f64 = rows
        .rows()
        .map(|row| correlation(reference.as_slice(), row))
        .sum();
    total / rows.n_rows() as f64
}

fn emit_log(lines: &[String]) {
    for line in lines {
        debug!("{line}");
    }
}

fn read_dataset(data: &Path) -> Result<SignalDataset> {
    let dataset = SignalReader::new(data)
        .read()
        .context("failed to read input CSV")?;
    info!(
        n_signals = dataset.ids.len(),
        n_points = dataset.signals.n_cols(),
        "dataset loaded"
    );
    Ok(dataset)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Reference { data, mode, all } => {
            let dataset = read_dataset(&data)?;
            if all {
                let output: Vec<ReferenceOutput> = select_all(&dataset.signals)
                    .into_iter()
                    .map(|selection| reference_output(&dataset, selection))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                let mode = parse_reference_mode(&mode)?;
                let selection = select_reference(&dataset.signals, mode);
                let output = reference_output(&dataset, selection);
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
        }

        Command::Warp {
            data,
            segment,
            slack,
            experiment,
            output_dir,
            correlation_power,
            equal_segments,
            band,
            extend_baseline,
            reference,
        } => {
            let experiment_name = ExperimentName::new(experiment.clone())?;
            let dataset = read_dataset(&data)?;
            let (reference_signal, reference_label) = resolve_reference(&dataset, &reference)?;
            info!(reference = %reference_label, "reference selected");

            let config = CowConfig::uniform(segment, slack)
                .with_correlation_power(correlation_power)
                .with_equal_segment_lengths(equal_segments)
                .with_band(BandConstraint::from_width(band))
                .with_extend_baseline(extend_baseline)
                .with_verbose(cli.verbose)
                .with_seed(cli.seed);
            let result = config
                .align(&reference_signal, &dataset.signals)
                .context("alignment failed")?;
            emit_log(&result.diagnostics.log);

            let writer = ResultWriter::new(&output_dir, experiment_name)?;
            let output_path = writer
                .write_warp(&dataset.ids, &reference_signal, &result)
                .context("failed to write warp result")?;

            let output = WarpOutput {
                experiment,
                n_signals: dataset.ids.len(),
                n_points: reference_signal.len(),
                reference: reference_label,
                segment,
                slack,
                n_segments: result.diagnostics.segmentation.n_segments(),
                mean_correlation_before: mean_correlation(&reference_signal, &dataset.signals),
                mean_correlation_after: mean_correlation(&reference_signal, &result.warped),
                output: output_path,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Optimize {
            data,
            segment_min,
            segment_max,
            slack_min,
            slack_max,
            experiment,
            output_dir,
            reference_id,
            seeds,
            max_steps,
            band_fraction,
            no_extend_baseline,
            max_seconds,
        } => {
            let experiment_name = ExperimentName::new(experiment.clone())?;
            let dataset = read_dataset(&data)?;

            let given_reference = match &reference_id {
                Some(id) => {
                    let row = dataset
                        .position(id)
                        .with_context(|| format!("reference id {id:?} not found in dataset"))?;
                    Some(dataset.signals.signal(row))
                }
                None => None,
            };

            let max_duration = max_seconds
                .map(Duration::try_from_secs_f64)
                .transpose()
                .context("--max-seconds must be a non-negative number")?;
            let space = SearchSpace::new(segment_min, segment_max, slack_min, slack_max)?;
            let config = OptimizeConfig::new(space)
                .with_n_seeds(seeds)
                .with_max_steps(max_steps)
                .with_band_fraction(band_fraction)
                .with_extend_baseline(!no_extend_baseline)
                .with_max_duration(max_duration)
                .with_verbose(cli.verbose)
                .with_seed(cli.seed);

            let result = config
                .optimize(&dataset.signals, given_reference.as_ref())
                .context("optimization failed")?;
            emit_log(&result.diagnostics.log);
            if !result.best.feasible {
                anyhow::bail!(
                    "no feasible segment/slack pair in segment {segment_min}..={segment_max}, slack {slack_min}..={slack_max}"
                );
            }
            for run in result.diagnostics.seeds.iter().filter(|r| r.hit_step_cap) {
                warn!(seed_record = run.record, "local search stopped at --max-steps");
            }

            let reference_signal = &result.diagnostics.reference;
            let band = (reference_signal.len() as f64 * band_fraction).round_ties_even() as usize;
            let best_alignment: CowResult = CowConfig::uniform(result.segment(), result.slack())
                .with_band(BandConstraint::from_width(band))
                .with_extend_baseline(!no_extend_baseline)
                .with_seed(cli.seed)
                .align(reference_signal, &dataset.signals)
                .context("alignment with the optimal pair failed")?;

            let writer = ResultWriter::new(&output_dir, experiment_name)?;
            let output_path = writer
                .write_optimize(&dataset.ids, &result, &best_alignment)
                .context("failed to write optimize result")?;

            let reference = reference_id.or_else(|| {
                result
                    .diagnostics
                    .reference_row
                    .map(|row| dataset.ids[row].as_str().to_string())
            });
            let output = OptimizeOutput {
                experiment,
                n_signals: dataset.ids.len(),
                reference,
                segment: result.segment(),
                slack: result.slack(),
                warping_effect: result.best.warping_effect,
                simplicity: result.best.simplicity,
                peak_factor: result.best.peak_factor,
                base_simplicity: result.diagnostics.base_simplicity,
                n_records: result.records.len(),
                alignment_calls: result.diagnostics.alignment_calls,
                elapsed_ms: result.diagnostics.elapsed.as_secs_f64() * 1e3,
                output: output_path,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
