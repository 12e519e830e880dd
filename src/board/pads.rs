//! Host pad normalization.
//!
//! Pads do not come from the document source: the host lists them
//! separately, already resolved to absolute coordinates. Each entry is
//! reduced to one of the shapes the touching predicate understands.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::loose::{loose_f64, loose_string, option_f64, option_i32, option_string, required_string};
use super::primitives::{Primitive, PrimitiveKind};
use crate::geometry::roundrect::DEFAULT_ARC_SEGMENTS;
use crate::geometry::{rounded_rect_vertices, Copper, LayerSpan, Point, Shape, TOP_LAYER};

/// Pad size used when the host gives no shape.
pub const DEFAULT_PAD_SIZE: f64 = 10.0;

/// Rotations within this many degrees of a quarter turn are snapped.
const ROTATION_SNAP_DEG: f64 = 1.0;

/// Ellipses whose axes differ by less than this are treated as round.
const ELLIPSE_ROUND_TOLERANCE: f64 = 0.1;

/// A pad as listed by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostPad {
    /// Primitive id; matched against pad binding keys.
    #[serde(alias = "id", deserialize_with = "required_string")]
    pub primitive_id: String,

    /// Net name currently on the pad.
    #[serde(default, deserialize_with = "option_string")]
    pub net: Option<String>,

    /// Layer id (12 = all layers).
    #[serde(default, deserialize_with = "option_i32")]
    pub layer: Option<i32>,

    /// Centre X.
    #[serde(default, deserialize_with = "option_f64")]
    pub x: Option<f64>,

    /// Centre Y.
    #[serde(default, deserialize_with = "option_f64")]
    pub y: Option<f64>,

    /// Rotation in degrees.
    #[serde(default, deserialize_with = "option_f64")]
    pub rotation: Option<f64>,

    /// `[shape, width, height]`, e.g. `["RECT", 30, 30]`.
    #[serde(default)]
    pub pad: Option<Vec<Value>>,
}

impl HostPad {
    /// Creates a rectangular pad.
    pub fn rect(id: impl Into<String>, layer: i32, center: Point, width: f64, height: f64) -> Self {
        Self {
            primitive_id: id.into(),
            net: None,
            layer: Some(layer),
            x: Some(center.x),
            y: Some(center.y),
            rotation: None,
            pad: Some(vec![
                Value::from("RECT"),
                Value::from(width),
                Value::from(height),
            ]),
        }
    }

    /// Creates a round pad.
    pub fn round(id: impl Into<String>, layer: i32, center: Point, diameter: f64) -> Self {
        Self {
            pad: Some(vec![
                Value::from("ROUND"),
                Value::from(diameter),
                Value::from(diameter),
            ]),
            ..Self::rect(id, layer, center, diameter, diameter)
        }
    }

    /// Sets the net.
    #[must_use]
    pub fn with_net(mut self, net: impl Into<String>) -> Self {
        self.net = Some(net.into());
        self
    }

    /// Sets the rotation.
    #[must_use]
    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = Some(degrees);
        self
    }

    /// Shape name and size, with defaults applied.
    fn outline(&self) -> (String, f64, f64) {
        let default = ("RECT".to_string(), DEFAULT_PAD_SIZE, DEFAULT_PAD_SIZE);
        let Some(pad) = self.pad.as_deref().filter(|pad| pad.len() > 1) else {
            return default;
        };
        let Some(width) = loose_f64(&pad[1]).filter(|w| *w > 0.0) else {
            return default;
        };
        let height = pad
            .get(2)
            .and_then(loose_f64)
            .filter(|h| *h > 0.0)
            .unwrap_or(width);
        let shape = loose_string(&pad[0]).unwrap_or_else(|| "RECT".to_string());
        (shape.to_ascii_uppercase(), width, height)
    }

    /// Converts the pad into a primitive.
    ///
    /// Returns `None` if the pad has no position.
    #[must_use]
    pub fn to_primitive(&self, options: &PadOptions) -> Option<Primitive> {
        let (Some(x), Some(y)) = (self.x, self.y) else {
            tracing::debug!(id = %self.primitive_id, "Skipping pad without a position");
            return None;
        };
        let center = Point::new(x, y);
        let layers = LayerSpan::from_layer_id(self.layer.unwrap_or(TOP_LAYER));
        let (shape_name, width, height) = self.outline();

        let is_round = shape_name == "ROUND"
            || (shape_name == "ELLIPSE" && (width - height).abs() < ELLIPSE_ROUND_TOLERANCE);
        let shape = if is_round {
            Shape::Round {
                center,
                radius: width / 2.0,
            }
        } else {
            rect_shape(center, width, height, self.rotation.unwrap_or(0.0), options)
        };

        Some(Primitive::new(
            self.primitive_id.clone(),
            PrimitiveKind::Pad,
            self.net.clone(),
            Copper::new(layers, shape),
        ))
    }
}

/// Pad conversion settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadOptions {
    /// Lower pads at arbitrary rotations to exact polygons instead of
    /// shrinking them to a square.
    pub exact_rotated_pads: bool,
    /// Segments per rounded corner, for exact polygons.
    pub arc_segments: u32,
}

impl Default for PadOptions {
    fn default() -> Self {
        Self {
            exact_rotated_pads: false,
            arc_segments: DEFAULT_ARC_SEGMENTS,
        }
    }
}

/// Orientation of a rectangular pad after snapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    Straight,
    QuarterTurn,
    Skewed,
}

fn orientation(rotation: f64) -> Orientation {
    let r = rotation.abs() % 180.0;
    if (r - 90.0).abs() <= ROTATION_SNAP_DEG {
        Orientation::QuarterTurn
    } else if r <= ROTATION_SNAP_DEG || r >= 180.0 - ROTATION_SNAP_DEG {
        Orientation::Straight
    } else {
        Orientation::Skewed
    }
}

fn rect_shape(center: Point, width: f64, height: f64, rotation: f64, options: &PadOptions) -> Shape {
    match orientation(rotation) {
        Orientation::Straight => Shape::Rect {
            center,
            width,
            height,
        },
        Orientation::QuarterTurn => Shape::Rect {
            center,
            width: height,
            height: width,
        },
        Orientation::Skewed if options.exact_rotated_pads => Shape::Polygon {
            vertices: rounded_rect_vertices(center, width, height, rotation, 0.0, options.arc_segments),
        },
        Orientation::Skewed => {
            let side = width.min(height);
            Shape::Rect {
                center,
                width: side,
                height: side,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn convert(pad: &HostPad) -> Shape {
        pad.to_primitive(&PadOptions::default()).unwrap().copper.shape
    }

    #[test]
    fn deserializes_loose_host_json() {
        let pad: HostPad = serde_json::from_value(json!({
            "primitiveId": 77,
            "net": "",
            "layer": "1",
            "x": "10.5",
            "y": 0,
            "pad": ["RECT", 30, 20]
        }))
        .unwrap();
        assert_eq!(pad.primitive_id, "77");
        assert_eq!(pad.net, None);
        assert_eq!(pad.layer, Some(1));
        assert_eq!(pad.x, Some(10.5));
        assert_eq!(pad.rotation, None);
    }

    #[test]
    fn missing_shape_defaults_to_small_rect() {
        let pad: HostPad = serde_json::from_value(json!({"id": "p", "x": 0, "y": 0})).unwrap();
        let primitive = pad.to_primitive(&PadOptions::default()).unwrap();
        assert_eq!(primitive.copper.layers, LayerSpan::Single(TOP_LAYER));
        assert_eq!(
            primitive.copper.shape,
            Shape::Rect {
                center: Point::new(0.0, 0.0),
                width: DEFAULT_PAD_SIZE,
                height: DEFAULT_PAD_SIZE,
            }
        );
    }

    #[test]
    fn missing_position_is_skipped() {
        let pad: HostPad = serde_json::from_value(json!({"id": "p", "x": 1})).unwrap();
        assert!(pad.to_primitive(&PadOptions::default()).is_none());
    }

    #[test]
    fn round_and_near_round_ellipse() {
        let round = HostPad::round("a", 12, Point::new(0.0, 0.0), 8.0);
        assert!(matches!(convert(&round), Shape::Round { radius, .. } if (radius - 4.0).abs() < 1e-12));

        let mut ellipse = HostPad::rect("b", 1, Point::new(0.0, 0.0), 8.0, 8.05);
        ellipse.pad = Some(vec![json!("ELLIPSE"), json!(8.0), json!(8.05)]);
        assert!(matches!(convert(&ellipse), Shape::Round { .. }));

        ellipse.pad = Some(vec![json!("ELLIPSE"), json!(8.0), json!(4.0)]);
        assert!(matches!(convert(&ellipse), Shape::Rect { .. }));
    }

    #[test]
    fn quarter_turn_swaps_sides() {
        let pad = HostPad::rect("a", 1, Point::new(0.0, 0.0), 30.0, 10.0).with_rotation(-270.5);
        assert_eq!(
            convert(&pad),
            Shape::Rect {
                center: Point::new(0.0, 0.0),
                width: 10.0,
                height: 30.0,
            }
        );
    }

    #[test]
    fn half_turn_is_unchanged() {
        let pad = HostPad::rect("a", 1, Point::new(0.0, 0.0), 30.0, 10.0).with_rotation(179.5);
        assert!(matches!(convert(&pad), Shape::Rect { width, .. } if (width - 30.0).abs() < 1e-12));
    }

    #[test]
    fn skewed_pad_degrades_or_goes_exact() {
        let pad = HostPad::rect("a", 1, Point::new(0.0, 0.0), 30.0, 10.0).with_rotation(45.0);
        assert_eq!(
            convert(&pad),
            Shape::Rect {
                center: Point::new(0.0, 0.0),
                width: 10.0,
                height: 10.0,
            }
        );

        let exact = PadOptions {
            exact_rotated_pads: true,
            ..PadOptions::default()
        };
        let shape = pad.to_primitive(&exact).unwrap().copper.shape;
        let Shape::Polygon { vertices } = shape else {
            panic!("expected a polygon, got {shape:?}");
        };
        assert_eq!(vertices.len(), 4);
    }

    #[test]
    fn pad_net_is_kept() {
        let pad = HostPad::rect("a", 1, Point::new(0.0, 0.0), 1.0, 1.0).with_net("GND");
        let primitive = pad.to_primitive(&PadOptions::default()).unwrap();
        assert!(primitive.is_pad());
        assert_eq!(primitive.net.as_deref(), Some("GND"));
    }
}
