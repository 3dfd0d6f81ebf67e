pub mod archive;
pub mod batch;
pub mod bitmap;
pub mod config;
pub mod curve;
pub mod error;
pub mod frame;
pub mod svg;
pub mod vectorizer;

pub use archive::archive;
pub use batch::{BatchEvent, FrameEntry};
pub use bitmap::{Bitmap, binarize};
pub use config::PipelineConfig;
pub use curve::{BoundingBox, Curve, Point, Segment};
pub use error::{ErrorKind, FrameTraceError, FrameTraceResult};
pub use frame::Frame;
pub use svg::{SvgOptions, emit};
#[cfg(feature = "vectorizer-potrace")]
pub use vectorizer::potrace::{PotraceOptions, PotraceTracer};
pub use vectorizer::visioncortex::{TraceOptions, VisioncortexTracer};
pub use vectorizer::{Tracer, TracerBackend, TracerKind, TracerSettings};

use std::path::{Path, PathBuf};

use tracing::info;

/// Outcome of a full pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSummary {
    /// Number of frames converted.
    pub frames: usize,
    /// Archive written after the batch, with its entry count.
    pub archive: Option<(PathBuf, usize)>,
}

/// Entry point for configuring and running frame conversion.
#[derive(Debug, Clone)]
pub struct FrameTrace<T = TracerBackend> {
    config: PipelineConfig,
    tracer: T,
}

impl FrameTrace {
    /// Pipeline with the default in-process tracer.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            tracer: TracerBackend::default(),
        }
    }
}

impl<T: Tracer> FrameTrace<T> {
    /// Replace the tracer used for every frame.
    pub fn with_tracer<U: Tracer>(self, tracer: U) -> FrameTrace<U> {
        FrameTrace {
            config: self.config,
            tracer,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn tracer(&self) -> &T {
        &self.tracer
    }

    /// Trace a single frame into an SVG document, using the configured
    /// threshold and SVG options.
    pub fn frame_to_svg(&self, frame: &Frame) -> FrameTraceResult<String> {
        let (document, _) =
            batch::frame_to_svg(frame, self.config.threshold, &self.tracer, &self.config.svg)?;
        Ok(document)
    }

    /// Convert one PNG file, writing the SVG to `output`.
    /// Returns the number of curves written.
    pub fn convert_file(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        mask_path: Option<&Path>,
    ) -> FrameTraceResult<usize> {
        let input = input.as_ref();
        batch::convert_file(input, output.as_ref(), &self.config, mask_path, &self.tracer)
            .map_err(|e| e.in_frame(input))
    }

    /// Convert every frame of the input directory. Returns the frame count.
    pub fn convert_all(
        &self,
        on_event: &mut dyn FnMut(&BatchEvent<'_>),
    ) -> FrameTraceResult<usize> {
        batch::run(&self.config, &self.tracer, on_event)
    }

    /// Convert every frame, then archive the output directory.
    ///
    /// Any failure aborts before the archive is written.
    pub fn run(
        &self,
        on_event: &mut dyn FnMut(&BatchEvent<'_>),
    ) -> FrameTraceResult<PipelineSummary> {
        let frames = self.convert_all(on_event)?;
        let archive = match &self.config.archive_path {
            Some(path) => {
                let entries = archive(&self.config.output_dir, path)?;
                Some((path.clone(), entries))
            }
            None => None,
        };
        info!(frames, "pipeline finished");
        Ok(PipelineSummary { frames, archive })
    }
}
