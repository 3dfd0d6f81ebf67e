use tracing::debug;
use visioncortex::{BinaryImage, CompoundPathElement, PathSimplifyMode, PointF64};

use crate::FrameTraceResult;
use crate::bitmap::Bitmap;
use crate::curve::{Curve, Point};

use super::Tracer;

/// Options for tracing with visioncortex.
#[derive(Debug, Clone)]
pub struct TraceOptions {
    /// `Polygon` yields straight corners only, `Spline` fits cubic beziers.
    pub mode: PathSimplifyMode,
    /// Ink regions smaller than `filter_speckle²` pixels are discarded.
    pub filter_speckle: usize,
    /// Minimum angle, in degrees, kept as a corner when fitting splines.
    pub corner_threshold: i32,
    /// Segment length used when subdividing splines.
    pub length_threshold: f64,
    pub max_iterations: usize,
    /// Angle, in degrees, at which splines are split.
    pub splice_threshold: i32,
    /// Outline the foreground instead of the background.
    pub invert: bool,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            mode: PathSimplifyMode::Spline,
            filter_speckle: 2,
            corner_threshold: 60,
            length_threshold: 4.0,
            max_iterations: 10,
            splice_threshold: 45,
            invert: false,
        }
    }
}

/// In-process tracer built on visioncortex clustering and path simplification.
#[derive(Debug, Clone, Default)]
pub struct VisioncortexTracer {
    options: TraceOptions,
}

impl VisioncortexTracer {
    pub fn new(options: TraceOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &TraceOptions {
        &self.options
    }
}

impl Tracer for VisioncortexTracer {
    fn trace(&self, bitmap: &Bitmap) -> FrameTraceResult<Vec<Curve>> {
        let options = &self.options;
        let ink = ink_image(bitmap, options.invert);
        let clusters = ink.to_clusters(false);
        let min_area = options.filter_speckle * options.filter_speckle;
        let corner_threshold = (options.corner_threshold as f64).to_radians();
        let splice_threshold = (options.splice_threshold as f64).to_radians();

        let mut curves = Vec::new();
        for i in 0..clusters.len() {
            let cluster = clusters.get_cluster(i);
            if cluster.size() < min_area {
                continue;
            }
            let compound = cluster.to_compound_path(
                options.mode,
                corner_threshold,
                options.length_threshold,
                options.max_iterations,
                splice_threshold,
            );
            curves.extend(compound.iter().filter_map(element_to_curve));
        }

        debug!(
            clusters = clusters.len(),
            curves = curves.len(),
            "visioncortex trace finished"
        );
        Ok(curves)
    }
}

/// Build the visioncortex image whose set pixels are the cells to outline.
fn ink_image(bitmap: &Bitmap, invert: bool) -> BinaryImage {
    let (w, h) = bitmap.dimensions();
    let mut image = BinaryImage::new_w_h(w as usize, h as usize);
    for y in 0..h {
        for x in 0..w {
            if bitmap.get(x, y) == invert {
                image.set_pixel(x as usize, y as usize, true);
            }
        }
    }
    image
}

fn element_to_curve(element: &CompoundPathElement) -> Option<Curve> {
    match element {
        CompoundPathElement::PathI32(path) => closed_polygon(
            path.path
                .iter()
                .map(|p| Point::new(p.x as f64, p.y as f64))
                .collect(),
        ),
        CompoundPathElement::PathF64(path) => {
            closed_polygon(path.path.iter().map(|p| Point::new(p.x, p.y)).collect())
        }
        CompoundPathElement::Spline(spline) => spline_to_curve(&spline.points),
    }
}

/// Corner segments through `points`, ending back on the first point.
fn closed_polygon(mut points: Vec<Point>) -> Option<Curve> {
    let first = *points.first()?;
    if points.len() > 1 && points.last() != Some(&first) {
        points.push(first);
    }
    Curve::polygon(points)
}

/// Spline points are laid out as `start, (c1, c2, end)*`.
fn spline_to_curve(points: &[PointF64]) -> Option<Curve> {
    if points.len() < 4 {
        return None;
    }
    let to_point = |p: &PointF64| Point::new(p.x, p.y);
    let mut curve = Curve::new(to_point(&points[0]));
    for chunk in points[1..].chunks_exact(3) {
        curve.curve_to(to_point(&chunk[0]), to_point(&chunk[1]), to_point(&chunk[2]));
    }
    Some(curve)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polygon_tracer() -> VisioncortexTracer {
        VisioncortexTracer::new(TraceOptions {
            mode: PathSimplifyMode::Polygon,
            filter_speckle: 0,
            ..TraceOptions::default()
        })
    }

    /// 10x10 paper with a centered 4x4 ink square.
    fn square_bitmap() -> Bitmap {
        Bitmap::from_fn(10, 10, |x, y| !((3..7).contains(&x) && (3..7).contains(&y)))
    }

    mod trace {
        use super::*;

        mod unit {
            use super::*;

            #[test]
            fn blank_paper_has_no_curves() {
                let curves = polygon_tracer().trace(&Bitmap::filled(10, 10, true)).unwrap();
                assert!(curves.is_empty());
            }

            #[test]
            fn full_ink_is_one_curve_around_the_image() {
                let curves = polygon_tracer().trace(&Bitmap::filled(10, 10, false)).unwrap();
                assert_eq!(curves.len(), 1);
                let bbox = curves[0].bounding_box();
                assert_eq!(bbox.min, Point::new(0.0, 0.0));
                assert_eq!(bbox.max, Point::new(10.0, 10.0));
            }

            #[test]
            fn square_bounds_match_pixels() {
                let curves = polygon_tracer().trace(&square_bitmap()).unwrap();
                assert_eq!(curves.len(), 1);
                let bbox = curves[0].bounding_box();
                assert_eq!(bbox.min, Point::new(3.0, 3.0));
                assert_eq!(bbox.max, Point::new(7.0, 7.0));
                assert!(curves[0].is_closed());
            }

            #[test]
            fn invert_traces_the_foreground() {
                let tracer = VisioncortexTracer::new(TraceOptions {
                    invert: true,
                    ..polygon_tracer().options().clone()
                });
                let curves = tracer.trace(&square_bitmap().inverted()).unwrap();
                assert_eq!(curves.len(), 1);
                assert_eq!(curves[0].bounding_box().min, Point::new(3.0, 3.0));
            }

            #[test]
            fn speckles_are_filtered() {
                let bitmap =
                    Bitmap::from_fn(10, 10, |x, y| !((1..3).contains(&x) && (1..3).contains(&y)));
                let tracer = VisioncortexTracer::new(TraceOptions {
                    filter_speckle: 3,
                    ..polygon_tracer().options().clone()
                });
                assert!(tracer.trace(&bitmap).unwrap().is_empty());
                assert_eq!(polygon_tracer().trace(&bitmap).unwrap().len(), 1);
            }

            #[test]
            fn separate_regions_give_separate_curves() {
                let bitmap = Bitmap::from_fn(12, 5, |x, y| {
                    let left = (1..4).contains(&x) && (1..4).contains(&y);
                    let right = (7..11).contains(&x) && (1..4).contains(&y);
                    !(left || right)
                });
                let curves = polygon_tracer().trace(&bitmap).unwrap();
                assert_eq!(curves.len(), 2);
            }

            #[test]
            fn hole_is_a_separate_curve() {
                let bitmap = Bitmap::from_fn(10, 10, |x, y| {
                    let ring = (2..8).contains(&x) && (2..8).contains(&y);
                    let hole = (4..6).contains(&x) && (4..6).contains(&y);
                    !(ring && !hole)
                });
                let curves = polygon_tracer().trace(&bitmap).unwrap();
                assert_eq!(curves.len(), 2);
                let outer = curves[0].bounding_box();
                assert_eq!(outer.min, Point::new(2.0, 2.0));
                assert_eq!(outer.max, Point::new(8.0, 8.0));
                let inner = curves[1].bounding_box();
                assert!(inner.min.x >= 4.0 && inner.max.x <= 6.0);
            }

            #[test]
            fn spline_mode_produces_closed_outline() {
                let mut bitmap = Bitmap::filled(24, 24, true);
                for y in 0..24u32 {
                    for x in 0..24u32 {
                        let (dx, dy) = (x as i32 - 12, y as i32 - 12);
                        if dx * dx + dy * dy <= 64 {
                            bitmap.set(x, y, false);
                        }
                    }
                }
                let curves = VisioncortexTracer::default().trace(&bitmap).unwrap();
                assert_eq!(curves.len(), 1);
                let bbox = curves[0].bounding_box();
                assert!(bbox.min.x >= 0.0 && bbox.max.x <= 24.0);
                assert!(bbox.min.y >= 0.0 && bbox.max.y <= 24.0);
            }
        }
    }

    mod spline_to_curve {
        use super::*;

        #[test]
        fn too_short_is_none() {
            let points = [PointF64::new(0.0, 0.0), PointF64::new(1.0, 1.0)];
            assert!(spline_to_curve(&points).is_none());
        }

        #[test]
        fn chunks_become_beziers() {
            let points: Vec<PointF64> = (0..7).map(|i| PointF64::new(i as f64, 0.0)).collect();
            let curve = spline_to_curve(&points).unwrap();
            assert_eq!(curve.start(), Point::new(0.0, 0.0));
            assert_eq!(curve.segments().len(), 2);
            assert_eq!(curve.end(), Point::new(6.0, 0.0));
        }
    }

    mod closed_polygon {
        use super::*;

        #[test]
        fn closes_open_ring() {
            let curve = closed_polygon(vec![
                Point::new(0.0, 0.0),
                Point::new(2.0, 0.0),
                Point::new(2.0, 2.0),
            ])
            .unwrap();
            assert!(curve.is_closed());
            assert_eq!(curve.segments().len(), 3);
        }

        #[test]
        fn keeps_existing_closure() {
            let curve = closed_polygon(vec![
                Point::new(0.0, 0.0),
                Point::new(2.0, 0.0),
                Point::new(0.0, 0.0),
            ])
            .unwrap();
            assert_eq!(curve.segments().len(), 2);
        }
    }
}
