//! Segment and point predicates shared by the touching tests.

use super::Point;

/// Squared distance from `p` to the segment `a`-`b`.
#[must_use]
pub fn distance_to_segment_squared(p: Point, a: Point, b: Point) -> f64 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len2 = abx * abx + aby * aby;
    if len2 == 0.0 {
        // Degenerate segment
        return p.distance_squared(a);
    }
    let t = (((p.x - a.x) * abx + (p.y - a.y) * aby) / len2).clamp(0.0, 1.0);
    p.distance_squared(Point::new(a.x + t * abx, a.y + t * aby))
}

/// Squared minimum distance between segments `a1`-`a2` and `b1`-`b2`.
#[must_use]
pub fn segment_distance_squared(a1: Point, a2: Point, b1: Point, b2: Point) -> f64 {
    if segments_intersect(a1, a2, b1, b2) {
        return 0.0;
    }
    distance_to_segment_squared(a1, b1, b2)
        .min(distance_to_segment_squared(a2, b1, b2))
        .min(distance_to_segment_squared(b1, a1, a2))
        .min(distance_to_segment_squared(b2, a1, a2))
}

fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Proper crossing test: each segment strictly straddles the other's line.
///
/// Collinear and endpoint-touching configurations return `false`; callers
/// that need those pair this with a distance test.
#[must_use]
pub fn segments_cross(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    let d1 = cross(b1, b2, a1);
    let d2 = cross(b1, b2, a2);
    let d3 = cross(a1, a2, b1);
    let d4 = cross(a1, a2, b2);
    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

/// Parametric intersection test with inclusive endpoints.
///
/// Parallel segments (including collinear overlap) return `false`.
#[must_use]
pub fn segments_intersect(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    let denom = (b2.y - b1.y) * (a2.x - a1.x) - (b2.x - b1.x) * (a2.y - a1.y);
    if denom == 0.0 {
        return false;
    }
    let ua = ((b2.x - b1.x) * (a1.y - b1.y) - (b2.y - b1.y) * (a1.x - b1.x)) / denom;
    let ub = ((a2.x - a1.x) * (a1.y - b1.y) - (a2.y - a1.y) * (a1.x - b1.x)) / denom;
    (0.0..=1.0).contains(&ua) && (0.0..=1.0).contains(&ub)
}

/// Even-odd point-in-polygon test.
#[must_use]
pub fn point_in_polygon(p: Point, vertices: &[Point]) -> bool {
    let mut inside = false;
    let n = vertices.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let vi = vertices[i];
        let vj = vertices[j];
        if (vi.y > p.y) != (vj.y > p.y) && p.x < (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Whether `p` lies inside (or on) the axis-aligned rectangle.
#[must_use]
pub fn point_in_rect(p: Point, center: Point, width: f64, height: f64) -> bool {
    (p.x - center.x).abs() <= width / 2.0 && (p.y - center.y).abs() <= height / 2.0
}

/// Edges of an axis-aligned rectangle, as point pairs.
#[must_use]
pub fn rect_edges(center: Point, width: f64, height: f64) -> [(Point, Point); 4] {
    let l = center.x - width / 2.0;
    let r = center.x + width / 2.0;
    let t = center.y - height / 2.0;
    let b = center.y + height / 2.0;
    [
        (Point::new(l, t), Point::new(r, t)),
        (Point::new(r, t), Point::new(r, b)),
        (Point::new(r, b), Point::new(l, b)),
        (Point::new(l, b), Point::new(l, t)),
    ]
}

/// Edges of a closed polygon, including the closing edge.
pub fn polygon_edges(vertices: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    let n = vertices.len();
    (0..n).map(move |i| (vertices[i], vertices[(i + 1) % n]))
}
