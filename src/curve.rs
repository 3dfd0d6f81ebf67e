//! Outline model produced by tracers and consumed by the SVG emitter.

/// A point in pixel coordinates, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One step of a curve, starting where the previous step ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    /// Straight line to `end`.
    Corner(Point),
    /// Cubic bezier through control points `c1`, `c2` to `end`.
    Bezier { c1: Point, c2: Point, end: Point },
}

impl Segment {
    /// The point this segment ends at.
    pub fn end(&self) -> Point {
        match self {
            Segment::Corner(end) => *end,
            Segment::Bezier { end, .. } => *end,
        }
    }
}

/// A traced outline: a start point followed by segments, in tracer order.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    start: Point,
    segments: Vec<Segment>,
}

impl Curve {
    pub fn new(start: Point) -> Self {
        Self {
            start,
            segments: Vec::new(),
        }
    }

    /// Build a curve of straight corners through `points`.
    /// Returns `None` when `points` is empty.
    pub fn polygon(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let mut curve = Curve::new(iter.next()?);
        for point in iter {
            curve.line_to(point);
        }
        Some(curve)
    }

    pub fn line_to(&mut self, end: Point) -> &mut Self {
        self.segments.push(Segment::Corner(end));
        self
    }

    pub fn curve_to(&mut self, c1: Point, c2: Point, end: Point) -> &mut Self {
        self.segments.push(Segment::Bezier { c1, c2, end });
        self
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The point the last segment ends at (the start point for an empty curve).
    pub fn end(&self) -> Point {
        self.segments.last().map_or(self.start, Segment::end)
    }

    /// Whether the last segment returns to the start point.
    pub fn is_closed(&self) -> bool {
        !self.segments.is_empty() && self.end() == self.start
    }

    /// All points of the curve, control points included.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        std::iter::once(self.start).chain(self.segments.iter().flat_map(|segment| {
            let points: Vec<Point> = match segment {
                Segment::Corner(end) => vec![*end],
                Segment::Bezier { c1, c2, end } => vec![*c1, *c2, *end],
            };
            points
        }))
    }

    /// Apply `f` to every point, control points included.
    pub fn map_points(&self, f: impl Fn(Point) -> Point) -> Curve {
        Curve {
            start: f(self.start),
            segments: self
                .segments
                .iter()
                .map(|segment| match segment {
                    Segment::Corner(end) => Segment::Corner(f(*end)),
                    Segment::Bezier { c1, c2, end } => Segment::Bezier {
                        c1: f(*c1),
                        c2: f(*c2),
                        end: f(*end),
                    },
                })
                .collect(),
        }
    }

    /// Axis-aligned box around every point of the curve.
    ///
    /// Bezier control points are included, so this is a bound of the
    /// rendered shape rather than its tight extent.
    pub fn bounding_box(&self) -> BoundingBox {
        let mut bbox = BoundingBox::at(self.start);
        for point in self.points() {
            bbox.include(point);
        }
        bbox
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    fn at(point: Point) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    fn include(&mut self, point: Point) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}
