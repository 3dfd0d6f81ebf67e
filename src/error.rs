use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use thiserror::Error;

/// Result type alias for operations that may fail with [`FrameTraceError`].
pub type FrameTraceResult<T> = std::result::Result<T, FrameTraceError>;

/// Error types that can occur while converting frames.
///
/// Every variant falls into one of three broad kinds, see [`ErrorKind`].
/// Nothing is recovered locally: the first error aborts the batch.
#[derive(Debug, Error)]
pub enum FrameTraceError {
    /// The input could not be decoded as a raster image.
    #[error("Failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    /// Image encoding error (mask export).
    #[error("Image processing failed: {0}")]
    Image(#[from] image::ImageError),
    /// File system I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// File system I/O error tied to a specific path.
    #[error("I/O error on {}: {source}", path.display())]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The external tracing program could not be started.
    #[error("Tracer `{}` is unavailable: {source}", program.display())]
    TracerUnavailable {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The external tracing program exited unsuccessfully.
    #[error("Tracer `{}` failed with {status}: {stderr}", program.display())]
    TracerFailed {
        program: PathBuf,
        status: ExitStatus,
        stderr: String,
    },
    /// Vectorization or tracing operation failed.
    #[error("Tracing failed: {0}")]
    Trace(String),
    /// Directory traversal error.
    #[error(transparent)]
    Walk(#[from] walkdir::Error),
    /// Zip archive write error.
    #[error("Archive write failed: {0}")]
    Archive(#[from] zip::result::ZipError),
    /// Two input frames would be written to the same SVG file.
    #[error(
        "{} and {} both convert to {}",
        first.display(),
        second.display(),
        destination.display()
    )]
    OutputCollision {
        first: PathBuf,
        second: PathBuf,
        destination: PathBuf,
    },
    /// An error raised while converting a specific frame.
    #[error("Failed to convert {}: {source}", path.display())]
    Frame {
        path: PathBuf,
        #[source]
        source: Box<FrameTraceError>,
    },
}

/// Coarse classification of [`FrameTraceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input is not a valid or readable raster image.
    Decode,
    /// The tracing capability is unavailable, misconfigured or failed.
    Tracing,
    /// Directory creation, file read/write or archive write failure.
    Io,
}

impl FrameTraceError {
    pub(crate) fn file_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileIo {
            path: path.into(),
            source,
        }
    }

    /// Attach the frame being processed, unless the error already names it.
    pub(crate) fn in_frame(self, path: &Path) -> Self {
        match self {
            err @ (Self::Decode { .. } | Self::Frame { .. }) => err,
            other => Self::Frame {
                path: path.to_path_buf(),
                source: Box::new(other),
            },
        }
    }

    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Decode { .. } => ErrorKind::Decode,
            Self::TracerUnavailable { .. } | Self::TracerFailed { .. } | Self::Trace(_) => {
                ErrorKind::Tracing
            }
            Self::Image(_)
            | Self::Io(_)
            | Self::FileIo { .. }
            | Self::Walk(_)
            | Self::Archive(_)
            | Self::OutputCollision { .. } => ErrorKind::Io,
            Self::Frame { source, .. } => source.kind(),
        }
    }
}
