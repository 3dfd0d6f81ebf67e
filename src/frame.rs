use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};

use crate::{FrameTraceError, FrameTraceResult};

/// A decoded input raster image together with the path it came from.
#[derive(Debug, Clone)]
pub struct Frame {
    path: PathBuf,
    image: DynamicImage,
}

impl Frame {
    /// Read and decode the image at `path`.
    ///
    /// A missing or unreadable file is an I/O error; bytes that do not decode
    /// as a PNG are a decode error, whatever the extension says.
    pub fn open(path: impl AsRef<Path>) -> FrameTraceResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| FrameTraceError::file_io(path, e))?;
        let image = image::load_from_memory_with_format(&bytes, ImageFormat::Png).map_err(
            |source| FrameTraceError::Decode {
                path: path.to_path_buf(),
                source,
            },
        )?;
        Ok(Self {
            path: path.to_path_buf(),
            image,
        })
    }

    /// Wrap an already decoded image.
    pub fn from_image(path: impl Into<PathBuf>, image: DynamicImage) -> Self {
        Self {
            path: path.into(),
            image,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }
}
