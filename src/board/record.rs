//! Line-level record handling.
//!
//! # Line Encodings
//!
//! ```text
//! ["LINE","e12",0,"GND",1,0,0,100,0,10]                       // positional array
//! {"type":"LINE","ticket":12}||{"startX":0,"startY":0,...}|    // keyed object fragments
//! ```
//!
//! A line is split into a [`RawRecord`] first (array, or the merge of all
//! object fragments), then interpreted into a [`ParsedRecord`] by the
//! front-ends in [`super::reader`].

use serde_json::{Map, Value};

use super::error::RecordError;
use super::loose::loose_string;
use crate::geometry::Point;

/// One source line after JSON decoding, before interpretation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord {
    /// Positional array encoding: `["TYPE", id, ...]`.
    Array(Vec<Value>),
    /// Keyed object encoding, fragments already merged.
    Object(Map<String, Value>),
}

impl RawRecord {
    /// Decodes one source line.
    ///
    /// Returns `Ok(None)` for blank lines and lines that are not records in
    /// either encoding (headers, comments).
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Malformed`] if the line looks like a record
    /// but no part of it decodes.
    pub fn from_line(line: &str) -> Result<Option<Self>, RecordError> {
        let line = line.trim().trim_start_matches('\\').trim_start();
        if line.starts_with('[') {
            return serde_json::from_str::<Vec<Value>>(line)
                .map(|items| Some(Self::Array(items)))
                .map_err(|e| RecordError::malformed(format!("array record: {e}")));
        }
        if line.starts_with('{') {
            return Self::merge_fragments(line).map(Some);
        }
        Ok(None)
    }

    /// Merges `||`-delimited object fragments; later fields win.
    fn merge_fragments(line: &str) -> Result<Self, RecordError> {
        let line = line.strip_suffix('|').unwrap_or(line);
        let mut merged = Map::new();
        let mut decoded = 0usize;

        for part in line.split("||") {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            match serde_json::from_str::<Map<String, Value>>(part) {
                Ok(fields) => {
                    merged.extend(fields);
                    decoded += 1;
                }
                Err(e) => {
                    tracing::trace!(error = %e, "Skipping undecodable object fragment");
                }
            }
        }

        if decoded == 0 {
            return Err(RecordError::malformed("no decodable object fragment"));
        }
        Ok(Self::Object(merged))
    }

    /// The record type tag (`LINE`, `VIA`, ...).
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        match self {
            Self::Array(items) => items.first()?.as_str(),
            Self::Object(fields) => fields.get("type")?.as_str(),
        }
    }

    /// The net name this record declares, if any.
    ///
    /// Used only to build the set of names already taken on the board.
    /// Array `LAYER` and `ATTR` records carry other data at the net position
    /// and are ignored.
    #[must_use]
    pub fn declared_net(&self) -> Option<String> {
        match self {
            Self::Array(items) => match self.kind() {
                Some("LAYER" | "ATTR") => None,
                _ => items.get(3)?.as_str().filter(|s| !s.is_empty()).map(str::to_string),
            },
            Self::Object(fields) => {
                let field = if self.kind() == Some("PAD_NET") && fields.contains_key("padNet") {
                    "padNet"
                } else {
                    "netName"
                };
                fields.get(field).and_then(loose_string)
            }
        }
    }

    /// Positional field, for array records.
    #[must_use]
    pub fn at(&self, index: usize) -> Option<&Value> {
        match self {
            Self::Array(items) => items.get(index),
            Self::Object(_) => None,
        }
    }

    /// Keyed field, for object records.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Array(_) => None,
            Self::Object(fields) => fields.get(name),
        }
    }
}

/// Which polygon-like record a [`ParsedRecord::Poly`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolyKind {
    /// `FILL`
    Fill,
    /// `POLY`
    Poly,
    /// `REGION`
    Region,
    /// `COPPER_AREA`
    CopperArea,
}

impl PolyKind {
    /// Maps a record tag to a polygon kind.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "FILL" => Some(Self::Fill),
            "POLY" => Some(Self::Poly),
            "REGION" => Some(Self::Region),
            "COPPER_AREA" => Some(Self::CopperArea),
            _ => None,
        }
    }
}

/// A record after interpretation; identical for both encodings.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedRecord {
    /// Layer declaration.
    Layer {
        /// Layer id.
        id: i32,
        /// Whether the layer is in use.
        active: bool,
    },
    /// Attribute attached to an owner (only `Designator` is consumed).
    Attr {
        /// Owner (component) id.
        owner: String,
        /// Attribute key.
        key: String,
        /// Attribute value.
        value: String,
    },
    /// Pad-to-pin binding.
    PadNet {
        /// Component id.
        component: String,
        /// Pin number.
        pin: String,
        /// Keys under which pads find this binding.
        keys: Vec<String>,
    },
    /// Straight track.
    Line(StrokeRecord),
    /// Arc track, lowered to its chord.
    Arc(StrokeRecord),
    /// Via.
    Via {
        /// Primitive id.
        id: String,
        /// Net name.
        net: Option<String>,
        /// Centre.
        center: Point,
        /// Outer diameter.
        diameter: f64,
        /// Blind/buried range string (`"start-end"`), unresolved.
        range: Option<String>,
    },
    /// Filled polygon.
    Poly {
        /// Primitive id.
        id: String,
        /// Source record kind.
        kind: PolyKind,
        /// Net name.
        net: Option<String>,
        /// Layer id.
        layer: i32,
        /// Outline vertices (at least 3).
        vertices: Vec<Point>,
    },
    /// Polygon record that is not copper (board outline, mechanical fill).
    NonCopper {
        /// Record tag.
        kind: String,
    },
    /// Any other record type.
    Other {
        /// Record tag.
        kind: String,
    },
}

/// Shared payload of `LINE` and `ARC` records.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeRecord {
    /// Primitive id.
    pub id: String,
    /// Net name.
    pub net: Option<String>,
    /// Layer id.
    pub layer: i32,
    /// Start point.
    pub start: Point,
    /// End point.
    pub end: Point,
    /// Stroke width.
    pub width: f64,
}
