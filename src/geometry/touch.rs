//! Exact pairwise touching predicate (the narrow phase).
//!
//! [`touches`] first gates on layers, then dispatches on the shape pair:
//!
//! | Pair | Test |
//! |------|------|
//! | polygon / any | edge crossings, then containment both ways |
//! | segment / segment | endpoint distance within both half widths, or a proper crossing |
//! | segment / round | centre within radius + half width of the segment |
//! | segment / rect | segment meets the rect grown by half width + margin |
//! | round / round | centre distance strictly below the radius sum |
//! | round / rect | strict overlap of the round's bounding square with the rect |
//! | rect / rect | strict axis-aligned overlap |

use super::segment::{
    distance_to_segment_squared, point_in_polygon, point_in_rect, polygon_edges, rect_edges,
    segment_distance_squared, segments_cross, segments_intersect,
};
use super::{Copper, Point, Shape};

/// Default extra margin added around rectangles when testing strokes.
pub const DEFAULT_LINE_RECT_MARGIN: f64 = 0.1;

/// Tolerances used by the touching predicate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchRules {
    /// Extra margin around rectangles when testing stroked segments.
    pub line_rect_margin: f64,
}

impl Default for TouchRules {
    fn default() -> Self {
        Self {
            line_rect_margin: DEFAULT_LINE_RECT_MARGIN,
        }
    }
}

impl TouchRules {
    /// The largest distance at which two separated bounding boxes can still
    /// produce a positive result. Broad-phase padding must be at least this.
    #[must_use]
    pub const fn max_reach(&self) -> f64 {
        self.line_rect_margin
    }
}

/// Whether two pieces of copper are electrically joined by overlap.
#[must_use]
pub fn touches(a: &Copper, b: &Copper, rules: &TouchRules) -> bool {
    if !a.layers.intersects(&b.layers) {
        return false;
    }
    shapes_touch(&a.shape, &b.shape, rules)
}

/// Shape-only part of [`touches`], without the layer gate.
#[must_use]
pub fn shapes_touch(a: &Shape, b: &Shape, rules: &TouchRules) -> bool {
    match (a, b) {
        (Shape::Polygon { vertices }, other) | (other, Shape::Polygon { vertices }) => {
            polygon_touches(vertices, other)
        }
        (
            Shape::Segment {
                start: a1,
                end: a2,
                width: wa,
            },
            Shape::Segment {
                start: b1,
                end: b2,
                width: wb,
            },
        ) => segments_touch((*a1, *a2, *wa), (*b1, *b2, *wb)),
        (
            Shape::Segment { start, end, width },
            Shape::Round { center, radius },
        )
        | (
            Shape::Round { center, radius },
            Shape::Segment { start, end, width },
        ) => {
            let reach = radius + width / 2.0;
            distance_to_segment_squared(*center, *start, *end) <= reach * reach
        }
        (
            Shape::Segment { start, end, width },
            Shape::Rect {
                center,
                width: rw,
                height: rh,
            },
        )
        | (
            Shape::Rect {
                center,
                width: rw,
                height: rh,
            },
            Shape::Segment { start, end, width },
        ) => {
            let grow = 2.0 * (width / 2.0 + rules.line_rect_margin);
            segment_meets_rect(*start, *end, *center, rw + grow, rh + grow)
        }
        (
            Shape::Round {
                center: ca,
                radius: ra,
            },
            Shape::Round {
                center: cb,
                radius: rb,
            },
        ) => ca.distance_squared(*cb) < (ra + rb) * (ra + rb),
        (
            Shape::Round { center: c, radius },
            Shape::Rect {
                center,
                width,
                height,
            },
        )
        | (
            Shape::Rect {
                center,
                width,
                height,
            },
            Shape::Round { center: c, radius },
        ) => {
            // Axis-aligned box test, the round taken as its bounding square
            (c.x - center.x).abs() < radius + width / 2.0
                && (c.y - center.y).abs() < radius + height / 2.0
        }
        (
            Shape::Rect {
                center: ca,
                width: wa,
                height: ha,
            },
            Shape::Rect {
                center: cb,
                width: wb,
                height: hb,
            },
        ) => (ca.x - cb.x).abs() < (wa + wb) / 2.0 && (ca.y - cb.y).abs() < (ha + hb) / 2.0,
    }
}

fn segments_touch(a: (Point, Point, f64), b: (Point, Point, f64)) -> bool {
    let (a1, a2, wa) = a;
    let (b1, b2, wb) = b;
    let limit = wa / 2.0 + wb / 2.0;
    let limit2 = limit * limit;

    distance_to_segment_squared(a1, b1, b2) <= limit2
        || distance_to_segment_squared(a2, b1, b2) <= limit2
        || distance_to_segment_squared(b1, a1, a2) <= limit2
        || distance_to_segment_squared(b2, a1, a2) <= limit2
        || segments_cross(a1, a2, b1, b2)
}

fn segment_meets_rect(start: Point, end: Point, center: Point, width: f64, height: f64) -> bool {
    if point_in_rect(start, center, width, height) || point_in_rect(end, center, width, height) {
        return true;
    }
    rect_edges(center, width, height)
        .iter()
        .any(|&(e1, e2)| segments_cross(start, end, e1, e2))
}

/// Polygon against any other shape.
fn polygon_touches(poly: &[Point], other: &Shape) -> bool {
    if poly.len() < 3 {
        return false;
    }

    // Edge crossings
    let crossing = match other {
        Shape::Polygon { vertices } => polygon_edges(poly).any(|(p1, p2)| {
            polygon_edges(vertices).any(|(q1, q2)| segments_intersect(p1, p2, q1, q2))
        }),
        Shape::Rect {
            center,
            width,
            height,
        } => {
            let edges = rect_edges(*center, *width, *height);
            polygon_edges(poly)
                .any(|(p1, p2)| edges.iter().any(|&(q1, q2)| segments_intersect(p1, p2, q1, q2)))
        }
        Shape::Segment { start, end, width } => {
            let reach2 = (width / 2.0) * (width / 2.0);
            polygon_edges(poly).any(|(p1, p2)| {
                segments_intersect(p1, p2, *start, *end)
                    || segment_distance_squared(p1, p2, *start, *end) <= reach2
            })
        }
        Shape::Round { center, radius } => polygon_edges(poly)
            .any(|(p1, p2)| distance_to_segment_squared(*center, p1, p2) <= radius * radius),
    };
    if crossing {
        return true;
    }

    // The other shape sits inside the polygon
    let inside_poly = |p: Point| point_in_polygon(p, poly);
    let other_inside = match other {
        Shape::Polygon { vertices } => vertices.iter().copied().any(inside_poly),
        Shape::Rect { center, .. } | Shape::Round { center, .. } => inside_poly(*center),
        Shape::Segment { start, end, .. } => inside_poly(*start) || inside_poly(*end),
    };
    if other_inside {
        return true;
    }

    // The polygon sits inside the other shape
    match other {
        Shape::Polygon { vertices } => poly.iter().any(|&v| point_in_polygon(v, vertices)),
        Shape::Rect {
            center,
            width,
            height,
        } => poly
            .iter()
            .any(|&v| point_in_rect(v, *center, *width, *height)),
        Shape::Round { center, radius } => poly
            .iter()
            .any(|v| v.distance_squared(*center) <= radius * radius),
        Shape::Segment { .. } => false,
    }
}
