//! hough-grid CLI: detect a rectangular grid in an image and print its homography.

use clap::{Parser, ValueEnum};
use hough_grid::detect::{
    EdgeExtractor, GridCorners, GridDetection, GridDetector, GridDetectorParams, HoughLine,
    LineSegment,
};
use hough_grid::pipeline;
use log::{info, LevelFilter};
use nalgebra::Point2;
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

type CliError = Box<dyn Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser, Debug)]
#[command(name = "hough-grid")]
#[command(about = "Detect a rectangular line grid in an image and fit the homography onto a canonical grid")]
#[command(version)]
struct Cli {
    /// Input image (any format the `image` crate decodes).
    image: PathBuf,

    /// JSON file with detector parameters; omitted fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Edge extraction strategy (overrides the config file).
    #[arg(long, value_enum)]
    extractor: Option<ExtractorArg>,

    /// Accumulator cells need strictly more votes than this to become lines.
    #[arg(long)]
    vote_threshold: Option<u32>,

    /// Side of one canonical grid cell in the homography target space.
    #[arg(long)]
    cell_size: Option<f64>,

    /// Write the edge/binary matrix as an 8-bit image.
    #[arg(long)]
    edges_out: Option<PathBuf>,

    /// Write the JSON report here instead of stdout.
    #[arg(long)]
    json: Option<PathBuf>,

    /// Log verbosity on stderr.
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ExtractorArg {
    Gradient,
    Adaptive,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Serialize)]
struct LineReport {
    #[serde(flatten)]
    line: HoughLine,
    segment: LineSegment,
}

#[derive(Serialize)]
struct GridReport {
    cols: usize,
    rows: usize,
}

#[derive(Serialize)]
struct Report<'a> {
    image: String,
    edges_width: usize,
    edges_height: usize,
    edge_offset: usize,
    diagonal: usize,
    lines: Vec<LineReport>,
    intersections: &'a [Point2<f64>],
    grid: GridReport,
    corners: GridCorners,
    target_corners: GridCorners,
    homography: [[f64; 3]; 3],
}

impl<'a> Report<'a> {
    fn new(cli: &Cli, found: &'a GridDetection) -> Self {
        Self {
            image: cli.image.display().to_string(),
            edges_width: found.edges.width(),
            edges_height: found.edges.height(),
            edge_offset: found.edge_offset,
            diagonal: found.diagonal,
            lines: found
                .lines
                .iter()
                .map(|&line| LineReport {
                    line,
                    segment: line.segment(found.diagonal),
                })
                .collect(),
            intersections: &found.intersections,
            grid: GridReport {
                cols: found.grid.cols(),
                rows: found.grid.row_count(),
            },
            corners: found.corners,
            target_corners: found.target_corners,
            homography: found.homography.to_array(),
        }
    }
}

fn init_logging(level: LevelFilter) {
    #[cfg(feature = "tracing")]
    {
        let _ = tracing_log::LogTracer::init_with_filter(level);
        hough_grid::core::init_tracing(false);
    }
    #[cfg(not(feature = "tracing"))]
    {
        let _ = hough_grid::core::init_with_level(level);
    }
}

fn load_params(cli: &Cli) -> CliResult<GridDetectorParams> {
    let mut params = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| -> CliError { format!("failed to read config {}: {e}", path.display()).into() })?;
            serde_json::from_str::<GridDetectorParams>(&text)
                .map_err(|e| -> CliError { format!("invalid config {}: {e}", path.display()).into() })?
        }
        None => GridDetectorParams::default(),
    };

    match cli.extractor {
        Some(ExtractorArg::Gradient) => params.extractor = EdgeExtractor::sobel(),
        Some(ExtractorArg::Adaptive) => {
            if !matches!(params.extractor, EdgeExtractor::AdaptiveThreshold(_)) {
                params.extractor = EdgeExtractor::default();
            }
        }
        None => {}
    }
    if let Some(v) = cli.vote_threshold {
        params.lines.vote_threshold = v;
    }
    if let Some(s) = cli.cell_size {
        params.grid.cell_size = s;
    }
    Ok(params)
}

fn run(cli: &Cli) -> CliResult<()> {
    let params = load_params(cli)?;
    info!("loading image {}", cli.image.display());
    let lum = pipeline::load_luminance(&cli.image)?;
    info!("luminance {}x{}", lum.width(), lum.height());

    let detector = GridDetector::new(params);
    let lines = detector.detect_lines(&lum)?;
    if let Some(path) = &cli.edges_out {
        pipeline::save_matrix(&lines.edges, path)?;
        info!("edges written to {}", path.display());
    }
    info!(
        "{} lines, {} intersections",
        lines.lines.len(),
        lines.intersections.len()
    );

    let found = detector.fit_grid(lines)?;
    let json = serde_json::to_string_pretty(&Report::new(cli, &found))?;
    match &cli.json {
        Some(path) => {
            std::fs::write(path, &json)?;
            info!("report written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level.into());

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            let mut source = err.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}
