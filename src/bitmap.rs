use std::io::{self, Write};

use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::{ThresholdType, threshold as ip_threshold};

use crate::frame::Frame;

/// Two-color pixel grid derived from a frame.
///
/// `true` marks foreground (pixels brighter than the threshold),
/// `false` marks background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Bitmap {
    /// All-background bitmap.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, false)
    }

    pub fn filled(width: u32, height: u32, value: bool) -> Self {
        Self {
            width,
            height,
            bits: vec![value; width as usize * height as usize],
        }
    }

    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let mut bits = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                bits.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            bits,
        }
    }

    /// Any non-zero gray value becomes foreground.
    pub fn from_gray(gray: &GrayImage) -> Self {
        let (width, height) = gray.dimensions();
        Self {
            width,
            height,
            bits: gray.as_raw().iter().map(|&v| v != 0).collect(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of cells, `width * height`.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    fn index(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) out of bounds for {}x{} bitmap",
            self.width,
            self.height
        );
        y as usize * self.width as usize + x as usize
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        self.bits[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        let idx = self.index(x, y);
        self.bits[idx] = value;
    }

    /// Row-major view of every cell.
    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    pub fn foreground_count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Swap foreground and background.
    pub fn inverted(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            bits: self.bits.iter().map(|b| !b).collect(),
        }
    }

    /// Foreground as white (255), background as black (0).
    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            Luma([if self.get(x, y) { 255 } else { 0 }])
        })
    }

    /// Encode as a binary (P4) PBM, where a set bit means a black pixel.
    ///
    /// Background cells are written black unless `foreground_is_ink` is set.
    pub fn write_pbm<W: Write>(&self, mut out: W, foreground_is_ink: bool) -> io::Result<()> {
        write!(out, "P4\n{} {}\n", self.width, self.height)?;
        let row_bytes = (self.width as usize).div_ceil(8);
        let mut row = vec![0u8; row_bytes];
        for y in 0..self.height {
            row.fill(0);
            for x in 0..self.width {
                if self.get(x, y) == foreground_is_ink {
                    row[x as usize / 8] |= 0x80 >> (x % 8);
                }
            }
            out.write_all(&row)?;
        }
        out.flush()
    }
}

/// Binarize a frame: luminance conversion, then foreground where intensity > `threshold`.
pub fn binarize(frame: &Frame, threshold: u8) -> Bitmap {
    binarize_image(frame.image(), threshold)
}

/// Binarize an already decoded image.
pub fn binarize_image(image: &DynamicImage, threshold: u8) -> Bitmap {
    let gray = image.to_luma8();
    Bitmap::from_gray(&threshold_mask(&gray, threshold))
}

/// Threshold the grayscale image to produce a binary mask.
pub fn threshold_mask(gray: &GrayImage, thr: u8) -> GrayImage {
    ip_threshold(gray, thr, ThresholdType::Binary)
}
