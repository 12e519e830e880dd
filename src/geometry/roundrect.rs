//! Rounded-rectangle outline generation.
//!
//! This is the single rectangle constructor used for polygon rectangle
//! shorthand (`['R', ...]` payloads) and for rotated pads lowered to
//! polygons.

use std::f64::consts::{FRAC_PI_2, PI};

use super::Point;

/// Default number of segments per tessellated corner.
pub const DEFAULT_ARC_SEGMENTS: u32 = 6;

/// Generates the outline of a rounded, rotated rectangle.
///
/// The radius is clamped to `[0, min(width, height) / 2]`. A zero radius
/// yields exactly four corners; otherwise each corner contributes
/// `segments + 1` points on a quarter arc. Vertices run counter-clockwise
/// (before rotation) starting at the bottom-right corner, and are rotated
/// about `center` by `rotation_deg`.
#[must_use]
pub fn rounded_rect_vertices(
    center: Point,
    width: f64,
    height: f64,
    rotation_deg: f64,
    corner_radius: f64,
    segments: u32,
) -> Vec<Point> {
    let hw = width / 2.0;
    let hh = height / 2.0;
    let r = corner_radius.min(hw.min(hh)).max(0.0);

    let local: Vec<Point> = if r <= 0.0 || segments == 0 {
        vec![
            Point::new(-hw, -hh),
            Point::new(hw, -hh),
            Point::new(hw, hh),
            Point::new(-hw, hh),
        ]
    } else {
        // Arc centres, paired with their start angle
        let corners = [
            (Point::new(hw - r, -hh + r), -FRAC_PI_2),
            (Point::new(hw - r, hh - r), 0.0),
            (Point::new(-hw + r, hh - r), FRAC_PI_2),
            (Point::new(-hw + r, -hh + r), PI),
        ];
        let step = FRAC_PI_2 / f64::from(segments);
        let mut points = Vec::with_capacity(4 * (segments as usize + 1));
        for (arc_center, start) in corners {
            for i in 0..=segments {
                let theta = f64::from(i).mul_add(step, start);
                points.push(Point::new(
                    r.mul_add(theta.cos(), arc_center.x),
                    r.mul_add(theta.sin(), arc_center.y),
                ));
            }
        }
        points
    };

    let (sin, cos) = rotation_deg.to_radians().sin_cos();
    let origin = Point::new(0.0, 0.0);
    local
        .into_iter()
        .map(|p| {
            let rotated = p.rotated_about(origin, cos, sin);
            Point::new(rotated.x + center.x, rotated.y + center.y)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn zero_radius_gives_four_corners() {
        let v = rounded_rect_vertices(Point::new(10.0, 5.0), 4.0, 2.0, 0.0, 0.0, 6);
        assert_eq!(v.len(), 4);
        assert!((v[0].x - 8.0).abs() < EPS && (v[0].y - 4.0).abs() < EPS);
        assert!((v[2].x - 12.0).abs() < EPS && (v[2].y - 6.0).abs() < EPS);
    }

    #[test]
    fn rotation_by_ninety_swaps_extent() {
        let v = rounded_rect_vertices(Point::new(0.0, 0.0), 4.0, 2.0, 90.0, 0.0, 6);
        let max_x = v.iter().map(|p| p.x).fold(f64::MIN, f64::max);
        let max_y = v.iter().map(|p| p.y).fold(f64::MIN, f64::max);
        assert!((max_x - 1.0).abs() < EPS);
        assert!((max_y - 2.0).abs() < EPS);
    }

    #[test]
    fn negative_radius_is_clamped_to_zero() {
        let v = rounded_rect_vertices(Point::new(0.0, 0.0), 4.0, 2.0, 0.0, -3.0, 6);
        assert_eq!(v.len(), 4);
    }

    #[test]
    fn full_radius_makes_a_capsule() {
        let (w, h) = (10.0, 4.0);
        let v = rounded_rect_vertices(Point::new(0.0, 0.0), w, h, 0.0, 100.0, 6);
        assert_eq!(v.len(), 4 * 7);
        // Every vertex lies on the capsule boundary: distance to the spine equals h/2
        for p in &v {
            let sx = p.x.clamp(-(w - h) / 2.0, (w - h) / 2.0);
            let d = (p.x - sx).hypot(p.y);
            assert!((d - h / 2.0).abs() < 1e-9, "vertex {p:?} off the capsule");
        }
    }
}
