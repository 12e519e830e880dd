//! Polygon payload decoding.
//!
//! Fill and region records carry their outline as nested JSON arrays whose
//! depth varies between editor versions:
//!
//! ```text
//! ["R", x, y, w, h, rotation, radius]          // rectangle shorthand
//! [["R", x, y, w, h, rotation, radius]]        // ...wrapped once
//! [x0, y0, "L", x1, y1, x2, y2]                // path, command letters mixed in
//! [[[x0, y0, x1, y1, x2, y2]], [...]]          // rings, wrapped
//! ```
//!
//! Redundant single-element wrappers are peeled off up to a fixed step
//! limit. Running out of steps is a degenerate shape, never a guess.

use serde_json::Value;

use super::error::RecordError;
use super::loose::loose_f64;
use crate::geometry::{rounded_rect_vertices, Point};

/// Default bound on wrapper layers peeled from a payload.
pub const DEFAULT_UNWRAP_LIMIT: usize = 5;

/// Tag marking a rectangle shorthand payload.
const RECT_TAG: &str = "R";

/// Settings for payload decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeOptions {
    /// Maximum wrapper layers to peel.
    pub unwrap_limit: usize,
    /// Segments per rounded corner.
    pub arc_segments: u32,
}

impl Default for ShapeOptions {
    fn default() -> Self {
        Self {
            unwrap_limit: DEFAULT_UNWRAP_LIMIT,
            arc_segments: crate::geometry::roundrect::DEFAULT_ARC_SEGMENTS,
        }
    }
}

/// What a payload turned out to be once unwrapped.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Payload<'a> {
    /// `['R', x, y, w, h, rotation, radius]`
    Rect(&'a [Value]),
    /// Flat coordinate list with optional command letters.
    Path(&'a [Value]),
    /// List of coordinate rings; the first usable one is the outline.
    Rings(&'a [Value]),
}

fn is_rect_tag(value: &Value) -> bool {
    value.as_str() == Some(RECT_TAG)
}

fn unwrap_payload(payload: &Value, limit: usize) -> Result<Payload<'_>, RecordError> {
    let mut node = payload;
    for _ in 0..=limit {
        let items = match node.as_array() {
            Some(items) if !items.is_empty() => items.as_slice(),
            _ => return Err(RecordError::degenerate("empty shape payload")),
        };
        match &items[0] {
            Value::Array(inner) => match inner.first() {
                Some(head) if is_rect_tag(head) => return Ok(Payload::Rect(inner)),
                Some(Value::Number(_)) => return Ok(Payload::Rings(items)),
                _ => node = &items[0],
            },
            head if is_rect_tag(head) => return Ok(Payload::Rect(items)),
            _ => return Ok(Payload::Path(items)),
        }
    }
    Err(RecordError::degenerate(format!(
        "shape payload still wrapped after {limit} steps"
    )))
}

/// Decodes a polygon payload into outline vertices.
///
/// # Errors
///
/// Returns [`RecordError::Degenerate`] when the payload cannot be unwrapped
/// within the step limit, describes a zero-size rectangle, or yields fewer
/// than three vertices.
pub fn decode_outline(payload: &Value, options: &ShapeOptions) -> Result<Vec<Point>, RecordError> {
    match unwrap_payload(payload, options.unwrap_limit)? {
        Payload::Rect(fields) => rect_outline(fields, options.arc_segments),
        Payload::Path(items) => path_vertices(items),
        Payload::Rings(rings) => rings
            .iter()
            .filter_map(Value::as_array)
            .find_map(|ring| path_vertices(ring).ok())
            .ok_or_else(|| RecordError::degenerate("no ring with at least 3 vertices")),
    }
}

/// Expands `['R', x, y, w, h, rotation, radius]`.
///
/// `(x, y)` is the anchor corner: the rectangle extends `+w` along X and
/// `-h` along Y before rotation, and rotates about the anchor.
fn rect_outline(fields: &[Value], segments: u32) -> Result<Vec<Point>, RecordError> {
    let num = |i: usize| fields.get(i).and_then(loose_f64);
    let (Some(x), Some(y), Some(w), Some(h)) = (num(1), num(2), num(3), num(4)) else {
        return Err(RecordError::malformed("rectangle payload without x/y/w/h"));
    };
    if w <= 0.0 || h <= 0.0 {
        return Err(RecordError::degenerate(format!("zero-size rectangle {w}x{h}")));
    }
    let rotation = num(5).unwrap_or(0.0);
    let radius = num(6).unwrap_or(0.0);

    let (sin, cos) = rotation.to_radians().sin_cos();
    let anchor = Point::new(x, y);
    let center = Point::new(x + w / 2.0, y - h / 2.0).rotated_about(anchor, cos, sin);
    Ok(rounded_rect_vertices(center, w, h, rotation, radius, segments))
}

/// Pairs the numbers of a flat path into vertices, skipping command letters.
fn path_vertices(items: &[Value]) -> Result<Vec<Point>, RecordError> {
    let numbers: Vec<f64> = items.iter().filter_map(loose_number).collect();
    if numbers.len() % 2 != 0 {
        return Err(RecordError::degenerate(format!(
            "odd coordinate count {}",
            numbers.len()
        )));
    }
    let vertices: Vec<Point> = numbers
        .chunks_exact(2)
        .map(|pair| Point::new(pair[0], pair[1]))
        .collect();
    if vertices.len() < 3 {
        return Err(RecordError::degenerate(format!(
            "{} vertices",
            vertices.len()
        )));
    }
    Ok(vertices)
}

/// Numbers only: command letters such as `"L"` or `"M"` are dropped, numeric
/// strings are not coordinates.
fn loose_number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|n| n.is_finite())
}
