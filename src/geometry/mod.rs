//! Planar geometry for copper primitives.
//!
//! Everything here is plain `f64` arithmetic in board units. The module has
//! no knowledge of record formats or net names; it only answers two
//! questions:
//!
//! - What is the outline of a (rounded, rotated) rectangle? See [`roundrect`].
//! - Do two pieces of copper touch? See [`touch`].
//!
//! # Layers
//!
//! Copper lives on one layer, on every layer (the multi-layer sentinel used
//! by through-hole vias and pads), or on an explicit list of layers (blind
//! and buried vias). [`LayerSpan`] models the three cases.

pub mod roundrect;
pub mod segment;
pub mod touch;

pub use roundrect::rounded_rect_vertices;
pub use touch::{touches, TouchRules};

use serde::{Deserialize, Serialize};

/// Layer id used by the host for "all copper layers".
pub const MULTI_LAYER: i32 = 12;

/// Layer id of the top copper layer.
pub const TOP_LAYER: i32 = 1;

/// Layer id of the bottom copper layer.
pub const BOTTOM_LAYER: i32 = 2;

/// A point in board coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared distance to another point.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2)
    }

    /// Rotates the point about `origin` by an angle given as (cos, sin).
    #[must_use]
    pub fn rotated_about(self, origin: Self, cos: f64, sin: f64) -> Self {
        let dx = self.x - origin.x;
        let dy = self.y - origin.y;
        Self {
            x: origin.x + dx * cos - dy * sin,
            y: origin.y + dx * sin + dy * cos,
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    /// Minimum X.
    pub min_x: f64,
    /// Minimum Y.
    pub min_y: f64,
    /// Maximum X.
    pub max_x: f64,
    /// Maximum Y.
    pub max_y: f64,
}

impl BBox {
    /// Bounding box of a set of points. `None` for an empty slice.
    #[must_use]
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut bbox = Self {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for p in &points[1..] {
            bbox.min_x = bbox.min_x.min(p.x);
            bbox.min_y = bbox.min_y.min(p.y);
            bbox.max_x = bbox.max_x.max(p.x);
            bbox.max_y = bbox.max_y.max(p.y);
        }
        Some(bbox)
    }

    /// Returns the box grown by `margin` on every side.
    #[must_use]
    pub fn expanded(self, margin: f64) -> Self {
        Self {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }

    /// Whether two boxes overlap (touching edges count).
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }
}

/// The set of copper layers a primitive occupies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerSpan {
    /// Every copper layer (through vias, multi-layer pads).
    All,
    /// A single copper layer.
    Single(i32),
    /// An explicit list of layers (blind/buried vias).
    Stack(Vec<i32>),
}

impl LayerSpan {
    /// Maps a raw layer id, treating [`MULTI_LAYER`] as all layers.
    #[must_use]
    pub const fn from_layer_id(id: i32) -> Self {
        if id == MULTI_LAYER {
            Self::All
        } else {
            Self::Single(id)
        }
    }

    /// Whether the two spans share at least one layer.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::All, _) | (_, Self::All) => true,
            (Self::Single(a), Self::Single(b)) => a == b,
            (Self::Single(a), Self::Stack(list)) | (Self::Stack(list), Self::Single(a)) => {
                list.contains(a)
            }
            (Self::Stack(a), Self::Stack(b)) => a.iter().any(|id| b.contains(id)),
        }
    }
}

/// Shape descriptor of a copper primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    /// A stroked segment (tracks and arc chords).
    Segment {
        /// Start point.
        start: Point,
        /// End point.
        end: Point,
        /// Stroke width.
        width: f64,
    },
    /// A disc (vias, round pads).
    Round {
        /// Centre.
        center: Point,
        /// Radius.
        radius: f64,
    },
    /// An axis-aligned rectangle (rectangular pads).
    Rect {
        /// Centre.
        center: Point,
        /// Width along X.
        width: f64,
        /// Height along Y.
        height: f64,
    },
    /// A closed polygon (fills, regions, pours).
    Polygon {
        /// Vertices in order; the closing edge is implicit.
        vertices: Vec<Point>,
    },
}

impl Shape {
    /// Axis-aligned bounding box of the copper, stroke width included.
    #[must_use]
    pub fn bbox(&self) -> BBox {
        match self {
            Self::Segment { start, end, width } => BBox {
                min_x: start.x.min(end.x),
                min_y: start.y.min(end.y),
                max_x: start.x.max(end.x),
                max_y: start.y.max(end.y),
            }
            .expanded(width / 2.0),
            Self::Round { center, radius } => BBox {
                min_x: center.x - radius,
                min_y: center.y - radius,
                max_x: center.x + radius,
                max_y: center.y + radius,
            },
            Self::Rect {
                center,
                width,
                height,
            } => BBox {
                min_x: center.x - width / 2.0,
                min_y: center.y - height / 2.0,
                max_x: center.x + width / 2.0,
                max_y: center.y + height / 2.0,
            },
            Self::Polygon { vertices } => BBox::from_points(vertices).unwrap_or(BBox {
                min_x: 0.0,
                min_y: 0.0,
                max_x: 0.0,
                max_y: 0.0,
            }),
        }
    }

    /// Short name of the shape kind, for logs.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Segment { .. } => "segment",
            Self::Round { .. } => "round",
            Self::Rect { .. } => "rect",
            Self::Polygon { .. } => "polygon",
        }
    }
}

/// The geometric part of a primitive: where its copper is, and on which layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Copper {
    /// Layers the copper occupies.
    pub layers: LayerSpan,
    /// Outline.
    pub shape: Shape,
    /// Cached bounding box of `shape`.
    pub bbox: BBox,
}

impl Copper {
    /// Creates copper and caches its bounding box.
    #[must_use]
    pub fn new(layers: LayerSpan, shape: Shape) -> Self {
        let bbox = shape.bbox();
        Self {
            layers,
            shape,
            bbox,
        }
    }
}
