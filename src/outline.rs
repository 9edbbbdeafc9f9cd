use kurbo::BezPath;
use serde::{Deserialize, Serialize};

/// Design units per em square; every glyph coordinate lives in this space.
pub const UNITS_PER_EM: u16 = 1000;
/// Vertical metrics shared by every font this crate produces.
pub const ASCENDER: i16 = 800;
pub const DESCENDER: i16 = -200;
/// Side length of the square every shape is drawn into.
pub const GLYPH_SIZE: f64 = 400.0;
/// Bottom-left corner of the glyph box, centering it in the em square.
pub const ORIGIN: f64 = (UNITS_PER_EM as f64 - GLYPH_SIZE) / 2.0;

// Control-point offset ratio for approximating a quarter circle with one
// cubic Bézier.
const CIRCLE_K: f64 = 0.5522847498;

/// The closed vocabulary of glyph shapes the generation service may use.
///
/// Parsing is lossy on purpose: the upstream model is asked to stick to
/// these eight keywords but is not trusted to, so anything unrecognized
/// (including an empty string) collapses to [`ShapeKeyword::Line`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKeyword {
    Circle,
    Line,
    Loop,
    Angle,
    Curve,
    Dot,
    Cross,
    Wave,
}

impl From<&str> for ShapeKeyword {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "circle" => ShapeKeyword::Circle,
            "loop" => ShapeKeyword::Loop,
            "angle" => ShapeKeyword::Angle,
            "curve" => ShapeKeyword::Curve,
            "dot" => ShapeKeyword::Dot,
            "cross" => ShapeKeyword::Cross,
            "wave" => ShapeKeyword::Wave,
            // "line" and everything else
            _ => ShapeKeyword::Line,
        }
    }
}

impl Default for ShapeKeyword {
    fn default() -> Self {
        ShapeKeyword::Line
    }
}

impl ShapeKeyword {
    /// Build the outline for this shape.
    ///
    /// Pure and deterministic: the same keyword always yields the same
    /// sequence of path elements with identical control points.
    pub fn outline(self) -> BezPath {
        let s = GLYPH_SIZE;
        let o = ORIGIN;
        let c = o + s / 2.0; // center
        let r = s / 3.0; // radius for circle/loop

        let mut path = BezPath::new();
        match self {
            ShapeKeyword::Circle => ring(&mut path, c, r),
            ShapeKeyword::Dot => ring(&mut path, c, s / 8.0),
            ShapeKeyword::Line => {
                path.move_to((o, c));
                path.line_to((o + s, c));
            }
            ShapeKeyword::Loop => {
                // A single lopsided loop, like a hand-drawn 'e'
                path.move_to((c + r, c));
                path.curve_to((c + r, c + r), (c, c + r), (c - r * 0.5, c));
                path.curve_to((c - r, c), (c - r, c - r * 0.5), (c, c - r));
                path.curve_to((c + r * 0.5, c - r), (c + r, c - r * 0.3), (c + r, c));
                path.close_path();
            }
            ShapeKeyword::Angle => {
                path.move_to((o, o));
                path.line_to((o + s, o));
                path.line_to((o + s / 2.0, o + s));
                path.close_path();
            }
            ShapeKeyword::Curve => {
                path.move_to((o, o + s));
                path.curve_to((o + s, o + s), (o + s, o), (o + s, o));
            }
            ShapeKeyword::Cross => {
                path.move_to((o, c - r));
                path.line_to((o, c + r));
                path.move_to((c - r, o));
                path.line_to((c + r, o));
            }
            ShapeKeyword::Wave => {
                path.move_to((o, c));
                path.curve_to(
                    (o + s / 4.0, c - r),
                    (o + s / 2.0, c + r),
                    (o + (s * 3.0) / 4.0, c - r),
                );
                path.curve_to((o + s, c), (o + s, c), (o + s, c));
            }
        }
        path
    }
}

/// Shorthand for resolving free text straight to an outline.
pub fn outline_for(shape: &str) -> BezPath {
    ShapeKeyword::from(shape).outline()
}

// Four cubic arcs approximating a circle of radius `r` around (`c`, `c`).
fn ring(path: &mut BezPath, c: f64, r: f64) {
    let rk = r * CIRCLE_K;
    path.move_to((c + r, c));
    path.curve_to((c + r, c + rk), (c + rk, c + r), (c, c + r));
    path.curve_to((c - rk, c + r), (c - r, c + rk), (c - r, c));
    path.curve_to((c - r, c - rk), (c - rk, c - r), (c, c - r));
    path.curve_to((c + rk, c - r), (c + r, c - rk), (c + r, c));
    path.close_path();
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use kurbo::{PathEl, Point};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn control_points(path: &BezPath) -> Vec<Point> {
        path.elements()
            .iter()
            .flat_map(|el| match *el {
                PathEl::MoveTo(p) | PathEl::LineTo(p) => vec![p],
                PathEl::QuadTo(p1, p2) => vec![p1, p2],
                PathEl::CurveTo(p1, p2, p3) => vec![p1, p2, p3],
                PathEl::ClosePath => vec![],
            })
            .collect()
    }

    #[rstest]
    #[case("circle", ShapeKeyword::Circle)]
    #[case("  Circle ", ShapeKeyword::Circle)]
    #[case("LINE", ShapeKeyword::Line)]
    #[case("loop", ShapeKeyword::Loop)]
    #[case("angle", ShapeKeyword::Angle)]
    #[case("curve", ShapeKeyword::Curve)]
    #[case("dot", ShapeKeyword::Dot)]
    #[case("cross\n", ShapeKeyword::Cross)]
    #[case("Wave", ShapeKeyword::Wave)]
    #[case("", ShapeKeyword::Line)]
    #[case("squiggle", ShapeKeyword::Line)]
    fn keyword_normalization(#[case] input: &str, #[case] expected: ShapeKeyword) {
        assert_eq!(ShapeKeyword::from(input), expected);
    }

    #[test]
    fn unrecognized_shape_matches_line_geometry() {
        assert_eq!(
            outline_for("blorp").elements(),
            outline_for("line").elements()
        );
        assert_eq!(outline_for("").elements(), outline_for("line").elements());
    }

    #[rstest]
    #[case(ShapeKeyword::Circle)]
    #[case(ShapeKeyword::Line)]
    #[case(ShapeKeyword::Loop)]
    #[case(ShapeKeyword::Angle)]
    #[case(ShapeKeyword::Curve)]
    #[case(ShapeKeyword::Dot)]
    #[case(ShapeKeyword::Cross)]
    #[case(ShapeKeyword::Wave)]
    fn outline_stays_inside_the_em_square(#[case] shape: ShapeKeyword) {
        let upm = UNITS_PER_EM as f64;
        for point in control_points(&shape.outline()) {
            assert!(
                (0.0..=upm).contains(&point.x) && (0.0..=upm).contains(&point.y),
                "{shape:?} point {point:?} outside the em square"
            );
        }
    }

    #[test]
    fn circle_is_closed_and_dot_is_smaller() {
        let circle = ShapeKeyword::Circle.outline();
        assert_eq!(circle.elements().last(), Some(&PathEl::ClosePath));

        let width = |path: &BezPath| {
            let xs: Vec<f64> = control_points(path).iter().map(|p| p.x).collect();
            xs.iter().cloned().fold(f64::MIN, f64::max)
                - xs.iter().cloned().fold(f64::MAX, f64::min)
        };
        assert!(width(&ShapeKeyword::Dot.outline()) < width(&circle));
    }

    #[test]
    fn cross_has_two_strokes() {
        let cross = ShapeKeyword::Cross.outline();
        let moves = cross
            .elements()
            .iter()
            .filter(|el| matches!(el, PathEl::MoveTo(_)))
            .count();
        assert_eq!(moves, 2);
    }

    #[test]
    fn identical_input_is_byte_identical() {
        assert_eq!(
            ShapeKeyword::Wave.outline().elements(),
            ShapeKeyword::Wave.outline().elements()
        );
    }
}
