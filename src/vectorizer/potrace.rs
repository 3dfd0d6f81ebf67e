//! Tracing through the external `potrace` program.
//!
//! The bitmap is written to a temporary PBM file, potrace renders it with its
//! SVG backend to stdout, and the emitted path data is parsed back into
//! curves in pixel coordinates.

use std::io::BufWriter;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::debug;
use usvg::tiny_skia_path::{Path as SkiaPath, PathSegment, Point as SkiaPoint};

use crate::bitmap::Bitmap;
use crate::curve::{Curve, Point};
use crate::{FrameTraceError, FrameTraceResult};

use super::Tracer;

/// Options passed through to potrace.
#[derive(Debug, Clone)]
pub struct PotraceOptions {
    /// Program to run, looked up on `PATH` when not absolute.
    pub program: PathBuf,
    /// Suppress speckles of up to this many pixels (`--turdsize`).
    pub turd_size: usize,
    /// Corner threshold (`--alphamax`).
    pub alpha_max: f64,
    /// Curve optimization tolerance (`--opttolerance`).
    pub opt_tolerance: f64,
    /// Outline the foreground instead of the background.
    pub invert: bool,
}

impl Default for PotraceOptions {
    fn default() -> Self {
        Self {
            program: PathBuf::from("potrace"),
            turd_size: 2,
            alpha_max: 1.0,
            opt_tolerance: 0.2,
            invert: false,
        }
    }
}

/// Out-of-process tracer running potrace once per bitmap.
#[derive(Debug, Clone, Default)]
pub struct PotraceTracer {
    options: PotraceOptions,
}

impl PotraceTracer {
    pub fn new(options: PotraceOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PotraceOptions {
        &self.options
    }

    fn command(&self, input: &std::path::Path) -> Command {
        let options = &self.options;
        let mut cmd = Command::new(&options.program);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .args(["--backend", "svg"])
            .arg("--turdsize")
            .arg(options.turd_size.to_string())
            .arg("--alphamax")
            .arg(options.alpha_max.to_string())
            .arg("--opttolerance")
            .arg(options.opt_tolerance.to_string())
            .args(["--output", "-"])
            .arg(input);
        cmd
    }
}

impl Tracer for PotraceTracer {
    fn trace(&self, bitmap: &Bitmap) -> FrameTraceResult<Vec<Curve>> {
        let mut pbm = tempfile::Builder::new()
            .prefix("frametrace-")
            .suffix(".pbm")
            .tempfile()?;
        bitmap.write_pbm(BufWriter::new(pbm.as_file_mut()), self.options.invert)?;
        // Close our handle but keep the file until potrace is done with it.
        let pbm_path = pbm.into_temp_path();

        let program = &self.options.program;
        debug!(program = %program.display(), input = %pbm_path.display(), "running potrace");
        let output = self.command(&pbm_path).output().map_err(|source| {
            FrameTraceError::TracerUnavailable {
                program: program.clone(),
                source,
            }
        })?;

        if !output.status.success() {
            return Err(FrameTraceError::TracerFailed {
                program: program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let svg = String::from_utf8(output.stdout)
            .map_err(|_| FrameTraceError::Trace("potrace produced non UTF-8 output".into()))?;
        parse_potrace_svg(&svg, bitmap.width())
    }
}

/// Parse potrace SVG output into curves in pixel coordinates.
///
/// Every sub-path (each moveto) becomes one curve, in document order.
/// `pixel_width` is the width of the traced bitmap, used to undo potrace's
/// output resolution.
pub fn parse_potrace_svg(svg: &str, pixel_width: u32) -> FrameTraceResult<Vec<Curve>> {
    let tree = usvg::Tree::from_str(svg, &usvg::Options::default())
        .map_err(|e| FrameTraceError::Trace(format!("malformed potrace output: {e}")))?;
    let document_width = tree.size().width() as f64;
    let pixel_scale = if document_width > 0.0 {
        pixel_width as f64 / document_width
    } else {
        1.0
    };

    let mut curves = Vec::new();
    collect_curves(tree.root(), pixel_scale, &mut curves);
    Ok(curves)
}

fn collect_curves(group: &usvg::Group, pixel_scale: f64, curves: &mut Vec<Curve>) {
    for node in group.children() {
        match node {
            usvg::Node::Group(g) => collect_curves(g.as_ref(), pixel_scale, curves),
            usvg::Node::Path(path) => {
                let transform = path.abs_transform();
                let to_pixels = |p: SkiaPoint| {
                    let (x, y) = (p.x as f64, p.y as f64);
                    Point::new(
                        (transform.sx as f64 * x + transform.kx as f64 * y + transform.tx as f64)
                            * pixel_scale,
                        (transform.ky as f64 * x + transform.sy as f64 * y + transform.ty as f64)
                            * pixel_scale,
                    )
                };
                curves.extend(path_curves(path.data(), to_pixels));
            }
            _ => {}
        }
    }
}

/// Split path data into one curve per sub-path, mapping every point.
fn path_curves(data: &SkiaPath, map: impl Fn(SkiaPoint) -> Point) -> Vec<Curve> {
    let mut curves = Vec::new();
    let mut current: Option<Curve> = None;
    let mut pen = Point::default();

    for segment in data.segments() {
        match segment {
            PathSegment::MoveTo(p) => {
                pen = map(p);
                curves.extend(current.replace(Curve::new(pen)));
            }
            PathSegment::LineTo(p) => {
                let end = map(p);
                current.get_or_insert_with(|| Curve::new(pen)).line_to(end);
                pen = end;
            }
            PathSegment::QuadTo(c, p) => {
                let (c, end) = (map(c), map(p));
                // Degree elevation to an equivalent cubic.
                let lerp =
                    |a: Point, t: f64| Point::new(a.x + t * (c.x - a.x), a.y + t * (c.y - a.y));
                let (c1, c2) = (lerp(pen, 2.0 / 3.0), lerp(end, 2.0 / 3.0));
                current
                    .get_or_insert_with(|| Curve::new(pen))
                    .curve_to(c1, c2, end);
                pen = end;
            }
            PathSegment::CubicTo(c1, c2, p) => {
                let end = map(p);
                current
                    .get_or_insert_with(|| Curve::new(pen))
                    .curve_to(map(c1), map(c2), end);
                pen = end;
            }
            PathSegment::Close => {
                if let Some(curve) = current.as_mut() {
                    let start = curve.start();
                    if curve.end() != start {
                        curve.line_to(start);
                    }
                    pen = start;
                }
            }
        }
    }
    curves.extend(current);
    curves
}
