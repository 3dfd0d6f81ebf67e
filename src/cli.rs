use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use frametrace::config::{
    DEFAULT_ARCHIVE_PATH, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR, DEFAULT_THRESHOLD,
};
use frametrace::{PotraceOptions, SvgOptions, TraceOptions, TracerKind};
use visioncortex::PathSimplifyMode;

/// Command line interface definition.
#[derive(Parser, Debug)]
#[command(author, version, about, propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
pub struct GlobalOptions {
    /// Tracing engine used for every frame
    #[arg(long, value_enum, default_value_t = TracerArg::Native)]
    pub tracer: TracerArg,
    /// potrace executable used by `--tracer potrace`
    #[arg(long = "potrace-bin", env = "FRAMETRACE_POTRACE", default_value = "potrace")]
    pub potrace_bin: PathBuf,
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert every PNG frame of a directory to SVG, then zip the results
    Run(RunCommand),
    /// Convert a single PNG frame to SVG
    Convert(ConvertCommand),
    /// Zip every file of a directory
    Archive(ArchiveCommand),
}

/// Tracing engines.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum TracerArg {
    /// In-process tracing with visioncortex
    Native,
    /// The external potrace program
    Potrace,
}

impl From<TracerArg> for TracerKind {
    fn from(value: TracerArg) -> Self {
        match value {
            TracerArg::Native => TracerKind::Native,
            TracerArg::Potrace => TracerKind::Potrace,
        }
    }
}

#[derive(Args, Debug)]
pub struct RunCommand {
    /// Directory holding the PNG frames
    #[arg(short, long, default_value = DEFAULT_INPUT_DIR)]
    pub input: PathBuf,
    /// Directory receiving the SVG files (created if missing)
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output: PathBuf,
    /// Zip archive written after all frames are converted
    #[arg(short, long, default_value = DEFAULT_ARCHIVE_PATH)]
    pub archive: PathBuf,
    /// Skip writing the archive
    #[arg(long = "no-archive", conflicts_with = "archive")]
    pub no_archive: bool,
    /// Grayscale threshold (0-255 or 0.0-1.0); brighter pixels are paper
    #[arg(short, long, default_value_t = DEFAULT_THRESHOLD, value_parser = parse_threshold)]
    pub threshold: u8,
    /// Also convert frames in sub-directories
    #[arg(long)]
    pub recursive: bool,
    /// Save every binarized frame as a PNG mask in this directory
    #[arg(long = "export-masks", value_name = "DIR")]
    pub export_masks: Option<PathBuf>,
    /// Show a progress bar
    #[arg(long)]
    pub progress: bool,
    #[command(flatten)]
    pub trace_options: TraceOptionsArgs,
}

#[derive(Args, Debug)]
pub struct ConvertCommand {
    /// Input PNG path
    pub input: PathBuf,
    /// Output SVG path (defaults to input name with `.svg`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Grayscale threshold (0-255 or 0.0-1.0); brighter pixels are paper
    #[arg(short, long, default_value_t = DEFAULT_THRESHOLD, value_parser = parse_threshold)]
    pub threshold: u8,
    /// Save the binarized frame (defaults to `<name>-mask.png`)
    #[arg(long = "export-mask", value_name = "PATH", num_args = 0..=1)]
    pub export_mask: Option<Option<PathBuf>>,
    #[command(flatten)]
    pub trace_options: TraceOptionsArgs,
}

#[derive(Args, Debug)]
pub struct ArchiveCommand {
    /// Directory to pack
    #[arg(default_value = DEFAULT_OUTPUT_DIR)]
    pub source: PathBuf,
    /// Zip archive path (overwritten if present)
    #[arg(short, long, default_value = DEFAULT_ARCHIVE_PATH)]
    pub output: PathBuf,
}

fn parse_threshold(value: &str) -> Result<u8, String> {
    if let Ok(int_value) = value.parse::<u8>() {
        return Ok(int_value);
    }

    let float_value = value
        .parse::<f32>()
        .map_err(|_| format!("threshold must be numeric (0-255 or 0.0-1.0), got `{value}`"))?;

    if (0.0..=1.0).contains(&float_value) {
        let scaled = (float_value * 255.0).round() as i32;
        return Ok(scaled.clamp(0, 255) as u8);
    }

    if float_value.fract().abs() <= f32::EPSILON && (0.0..=255.0).contains(&float_value) {
        return Ok(float_value as u8);
    }

    Err(format!(
        "threshold {value} is out of range; expected 0-255 or 0.0-1.0"
    ))
}

/// Path simplification modes for the native tracer.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum TracerMode {
    None,
    Polygon,
    Spline,
}

impl From<TracerMode> for PathSimplifyMode {
    /// Convert TracerMode to visioncortex::PathSimplifyMode.
    fn from(value: TracerMode) -> Self {
        match value {
            TracerMode::None => PathSimplifyMode::None,
            TracerMode::Polygon => PathSimplifyMode::Polygon,
            TracerMode::Spline => PathSimplifyMode::Spline,
        }
    }
}

#[derive(Args, Debug)]
pub struct TraceOptionsArgs {
    /// Path simplification mode (native tracer)
    #[arg(long = "mode", value_enum, default_value_t = TracerMode::Spline)]
    pub mode: TracerMode,
    /// Discard ink regions smaller than this squared, in pixels (native tracer)
    #[arg(long = "filter-speckle", default_value_t = 2)]
    pub filter_speckle: usize,
    /// Corner threshold in degrees (native tracer)
    #[arg(long = "corner-threshold", default_value_t = 60)]
    pub corner_threshold: i32,
    /// Segment length threshold (native tracer)
    #[arg(long = "length-threshold", default_value_t = 4.0)]
    pub length_threshold: f64,
    /// Maximum subdivision iterations (native tracer)
    #[arg(long = "max-iterations", default_value_t = 10)]
    pub max_iterations: usize,
    /// Splice threshold in degrees (native tracer)
    #[arg(long = "splice-threshold", default_value_t = 45)]
    pub splice_threshold: i32,
    /// Suppress speckles of up to this many pixels (potrace)
    #[arg(long = "turd-size", default_value_t = 2)]
    pub turd_size: usize,
    /// Corner threshold parameter (potrace)
    #[arg(long = "alpha-max", default_value_t = 1.0)]
    pub alpha_max: f64,
    /// Curve optimization tolerance (potrace)
    #[arg(long = "opt-tolerance", default_value_t = 0.2)]
    pub opt_tolerance: f64,
    /// Decimal places kept for SVG coordinates (shortest exact form when omitted)
    #[arg(long = "path-precision")]
    pub path_precision: Option<u32>,
    /// Outline the light regions instead of the dark ones
    #[arg(long)]
    pub invert: bool,
}

impl From<&TraceOptionsArgs> for TraceOptions {
    fn from(args: &TraceOptionsArgs) -> Self {
        Self {
            mode: args.mode.into(),
            filter_speckle: args.filter_speckle,
            corner_threshold: args.corner_threshold,
            length_threshold: args.length_threshold,
            max_iterations: args.max_iterations,
            splice_threshold: args.splice_threshold,
            invert: args.invert,
        }
    }
}

impl TraceOptionsArgs {
    pub fn potrace_options(&self, program: PathBuf) -> PotraceOptions {
        PotraceOptions {
            program,
            turd_size: self.turd_size,
            alpha_max: self.alpha_max,
            opt_tolerance: self.opt_tolerance,
            invert: self.invert,
        }
    }

    pub fn svg_options(&self) -> SvgOptions {
        SvgOptions::default().with_path_precision(self.path_precision)
    }
}
