use std::fmt::Write as _;

use crate::curve::{Curve, Point, Segment};

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Formatting options for emitted path data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SvgOptions {
    /// Number of decimal places kept for coordinates.
    /// `None` writes the shortest representation that round-trips.
    pub path_precision: Option<u32>,
}

impl SvgOptions {
    pub fn with_path_precision(mut self, precision: Option<u32>) -> Self {
        self.path_precision = precision;
        self
    }
}

/// Serialize curves into an SVG document sized `width` x `height`.
pub fn emit(curves: &[Curve], width: u32, height: u32) -> String {
    emit_with(curves, width, height, &SvgOptions::default())
}

/// Same as [`emit`], with explicit formatting options.
pub fn emit_with(curves: &[Curve], width: u32, height: u32, options: &SvgOptions) -> String {
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="{SVG_NS}" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    for curve in curves {
        let _ = writeln!(
            svg,
            r#"<path d="{}" fill="black" stroke="none"/>"#,
            path_data(curve, options)
        );
    }
    svg.push_str("</svg>\n");
    svg
}

/// The `d` attribute for a single curve: `M`, then one `L` or `C` per segment.
pub fn path_data(curve: &Curve, options: &SvgOptions) -> String {
    let mut tokens = Vec::with_capacity(1 + curve.segments().len());
    tokens.push(format!("M {}", coords(&[curve.start()], options)));
    for segment in curve.segments() {
        tokens.push(match segment {
            Segment::Corner(end) => format!("L {}", coords(&[*end], options)),
            Segment::Bezier { c1, c2, end } => {
                format!("C {}", coords(&[*c1, *c2, *end], options))
            }
        });
    }
    tokens.join(" ")
}

fn coords(points: &[Point], options: &SvgOptions) -> String {
    points
        .iter()
        .map(|p| format!("{} {}", number(p.x, options), number(p.y, options)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn number(value: f64, options: &SvgOptions) -> String {
    let text = match options.path_precision {
        None => value.to_string(),
        Some(precision) => {
            let fixed = format!("{:.*}", precision as usize, value);
            if fixed.contains('.') {
                fixed.trim_end_matches('0').trim_end_matches('.').to_string()
            } else {
                fixed
            }
        }
    };
    // Both -0 and values rounding to -0 print as 0.
    if text == "-0" { "0".to_string() } else { text }
}
