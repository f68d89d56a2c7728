//! eyegaze CLI — pupil/glint detection and gaze calibration evaluation.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use eyegaze::{
    CalibrationConfig, Dataset, DetectConfig, Detector, FailedDetectionPolicy, FeatureBasis,
    PositionOrder,
};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "eyegaze")]
#[command(about = "Detect pupils and glints in eye images and evaluate gaze calibration")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect pupil and glints in one image.
    Detect(CliDetectArgs),

    /// Calibrate on the first frames of a dataset and score the rest.
    Evaluate(CliEvaluateArgs),

    /// Compare the affine basis with a range of polynomial degrees.
    Compare(CliCompareArgs),
}

#[derive(Debug, Clone, Args)]
struct DetectOverrides {
    /// Detection config JSON; flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pupil threshold (pixels at or below are dark).
    #[arg(long)]
    pupil_threshold: Option<u8>,

    /// Glint threshold (pixels above are bright).
    #[arg(long)]
    glint_threshold: Option<u8>,
}

impl DetectOverrides {
    fn to_config(&self) -> CliResult<DetectConfig> {
        let mut config = match &self.config {
            Some(path) => DetectConfig::from_json_file(path).map_err(|e| -> CliError {
                format!("Failed to load config {}: {}", path.display(), e).into()
            })?,
            None => DetectConfig::default(),
        };
        if let Some(t) = self.pupil_threshold {
            config.pupil.threshold = t;
        }
        if let Some(t) = self.glint_threshold {
            config.glints.threshold = t;
        }
        Ok(config)
    }
}

#[derive(Debug, Clone, Args)]
struct CliDetectArgs {
    /// Path to the input image.
    #[arg(long)]
    image: PathBuf,

    /// Path to write detection results (JSON). Printed to stdout if omitted.
    #[arg(long)]
    out: Option<PathBuf>,

    #[command(flatten)]
    detect: DetectOverrides,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BasisArg {
    Affine,
    Polynomial,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PositionOrderArg {
    RowCol,
    Xy,
}

impl PositionOrderArg {
    fn to_core(self) -> PositionOrder {
        match self {
            Self::RowCol => PositionOrder::RowCol,
            Self::Xy => PositionOrder::XY,
        }
    }
}

#[derive(Debug, Clone, Args)]
struct DatasetArgs {
    /// Dataset directory (frames N.jpg plus positions.json).
    #[arg(long)]
    dataset: PathBuf,

    /// Number of leading frames used for calibration.
    #[arg(long, default_value = "9")]
    train_size: usize,

    /// Element order of positions.json entries.
    #[arg(long, value_enum, default_value = "row-col")]
    position_order: PositionOrderArg,

    /// Fit failed pupil detections at the sentinel center instead of failing.
    #[arg(long)]
    sentinel: bool,

    #[command(flatten)]
    detect: DetectOverrides,
}

impl DatasetArgs {
    fn open(&self) -> CliResult<Dataset> {
        tracing::info!("Loading dataset: {}", self.dataset.display());
        Ok(Dataset::open(&self.dataset, self.position_order.to_core())?)
    }

    fn calibration_config(&self, basis: FeatureBasis) -> CliResult<CalibrationConfig> {
        Ok(CalibrationConfig {
            basis,
            on_failed_detection: if self.sentinel {
                FailedDetectionPolicy::Sentinel
            } else {
                FailedDetectionPolicy::Reject
            },
            detect: self.detect.to_config()?,
            rank_tolerance: None,
        })
    }
}

#[derive(Debug, Clone, Args)]
struct CliEvaluateArgs {
    #[command(flatten)]
    data: DatasetArgs,

    /// Feature basis.
    #[arg(long, value_enum, default_value = "affine")]
    basis: BasisArg,

    /// Polynomial degree (with --basis polynomial).
    #[arg(long, default_value = "2")]
    degree: u32,

    /// Path to write the full report (JSON).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct CliCompareArgs {
    #[command(flatten)]
    data: DatasetArgs,

    /// Lowest polynomial degree.
    #[arg(long, default_value = "2")]
    min_degree: u32,

    /// Highest polynomial degree.
    #[arg(long, default_value = "7")]
    max_degree: u32,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Detect(args) => run_detect(&args),
        Commands::Evaluate(args) => run_evaluate(&args),
        Commands::Compare(args) => run_compare(&args),
    }
}

// ── detect ─────────────────────────────────────────────────────────────

fn run_detect(args: &CliDetectArgs) -> CliResult<()> {
    tracing::info!("Loading image: {}", args.image.display());

    let img = image::open(&args.image).map_err(|e| -> CliError {
        format!("Failed to open image {}: {}", args.image.display(), e).into()
    })?;
    let gray = img.to_luma8();
    let (w, h) = gray.dimensions();
    tracing::info!("Image size: {}x{}", w, h);

    let detector = Detector::with_config(args.detect.to_config()?);
    let result = detector.detect(&gray);

    match &result.pupil {
        Some(p) => tracing::info!(
            "Pupil at ({:.1}, {:.1}), axes {:.1}x{:.1}, {:?} fit; {} glints",
            p.ellipse.center[0],
            p.ellipse.center[1],
            p.ellipse.axes[0],
            p.ellipse.axes[1],
            p.fit,
            result.glints.len(),
        ),
        None => tracing::warn!(
            "No pupil below threshold {}; {} glints",
            detector.config().pupil.threshold,
            result.glints.len(),
        ),
    }

    let json = serde_json::to_string_pretty(&result)?;
    match &args.out {
        Some(out) => {
            std::fs::write(out, &json)?;
            tracing::info!("Results written to {}", out.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

// ── evaluate ───────────────────────────────────────────────────────────

fn run_evaluate(args: &CliEvaluateArgs) -> CliResult<()> {
    let dataset = args.data.open()?;
    let basis = match args.basis {
        BasisArg::Affine => FeatureBasis::Affine,
        BasisArg::Polynomial => FeatureBasis::polynomial(args.degree),
    };
    let config = args.data.calibration_config(basis)?;

    let report = eyegaze::evaluate(&dataset, args.data.train_size, &config)?;

    println!("basis:        {}", report.basis);
    println!("calibration:  {} frames", report.train_size);
    println!("held out:     {} frames", report.samples.len());
    if !report.failed.is_empty() {
        println!("no pupil:     {:?}", report.failed);
    }
    if let Some(g) = &report.gaze {
        println!("gaze error:   mean {:.2}px, median {:.2}px", g.mean, g.median);
    }
    if let Some(p) = &report.pupil {
        println!("pupil error:  mean {:.2}px, median {:.2}px", p.mean, p.median);
    }

    if let Some(out) = &args.out {
        std::fs::write(out, serde_json::to_string_pretty(&report)?)?;
        tracing::info!("Report written to {}", out.display());
    }
    Ok(())
}

// ── compare ────────────────────────────────────────────────────────────

fn run_compare(args: &CliCompareArgs) -> CliResult<()> {
    if args.min_degree == 0 || args.min_degree > args.max_degree {
        return Err(format!(
            "invalid degree range {}..={}",
            args.min_degree, args.max_degree
        )
        .into());
    }

    let dataset = args.data.open()?;
    let config = args.data.calibration_config(FeatureBasis::Affine)?;
    let bases: Vec<FeatureBasis> = std::iter::once(FeatureBasis::Affine)
        .chain((args.min_degree..=args.max_degree).map(FeatureBasis::polynomial))
        .collect();

    let results = eyegaze::compare_bases(&dataset, args.data.train_size, &config, &bases)?;
    for (basis, result) in results {
        let label = basis.to_string();
        match result {
            Ok(report) => match report.gaze {
                Some(g) => println!(
                    "{:<24} total {:>10.2}px  mean {:>8.2}px",
                    label, g.total, g.mean
                ),
                None => println!("{:<24} no held-out estimates", label),
            },
            Err(e) => println!("{:<24} failed: {}", label, e),
        }
    }
    Ok(())
}
