use std::path::PathBuf;

use crate::svg::SvgOptions;

/// Directory frames are read from unless configured otherwise.
pub const DEFAULT_INPUT_DIR: &str = "frames";
/// Directory SVGs are written to unless configured otherwise.
pub const DEFAULT_OUTPUT_DIR: &str = "segmented";
/// Archive written after a successful batch unless configured otherwise.
pub const DEFAULT_ARCHIVE_PATH: &str = "guanjia.zip";
/// Grayscale cutoff: pixels brighter than this are foreground.
pub const DEFAULT_THRESHOLD: u8 = 128;

/// Options for one batch conversion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Directory holding the input PNG frames.
    pub input_dir: PathBuf,
    /// Directory receiving `<stem>.svg` files, created when missing.
    pub output_dir: PathBuf,
    /// Zip archive of the output directory. `None` skips archiving.
    pub archive_path: Option<PathBuf>,
    pub threshold: u8,
    /// Also pick up frames in sub-directories, mirroring them in the output.
    pub recursive: bool,
    /// When set, every binarized frame is saved there as a PNG mask.
    pub mask_dir: Option<PathBuf>,
    pub svg: SvgOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            archive_path: Some(PathBuf::from(DEFAULT_ARCHIVE_PATH)),
            threshold: DEFAULT_THRESHOLD,
            recursive: false,
            mask_dir: None,
            svg: SvgOptions::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a config for the given directories with default values elsewhere.
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// Set the archive path, or disable archiving with `None`.
    pub fn with_archive_path(mut self, archive_path: Option<PathBuf>) -> Self {
        self.archive_path = archive_path;
        self
    }

    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_mask_dir(mut self, mask_dir: Option<PathBuf>) -> Self {
        self.mask_dir = mask_dir;
        self
    }

    pub fn with_svg_options(mut self, svg: SvgOptions) -> Self {
        self.svg = svg;
        self
    }
}
