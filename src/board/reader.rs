//! Board document reader.
//!
//! Turns the raw document source into [`BoardData`]. Parsing happens in two
//! passes:
//!
//! 1. Every line is decoded into a [`ParsedRecord`]. Layer declarations,
//!    designators and pad bindings are collected; copper records are held
//!    back.
//! 2. Once the layer stack is known, held-back copper records become
//!    [`Primitive`]s (blind/buried via ranges need the finished stack).
//!
//! Lines that fail to decode are counted and skipped. A parse never fails
//! as a whole.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;
use serde_json::{Map, Value};

use super::error::RecordError;
use super::loose::{loose_f64, loose_i32, loose_string};
use super::primitives::{BindingTable, PadPinBinding, Primitive, PrimitiveKind};
use super::record::{ParsedRecord, PolyKind, RawRecord, StrokeRecord};
use super::shape::{decode_outline, ShapeOptions};
use super::stack::LayerStack;
use super::{BoardData, SourceFormat};
use crate::geometry::{Copper, LayerSpan, Point, Shape, MULTI_LAYER};

/// Options for [`parse_board`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Source format capability of the host.
    pub format: SourceFormat,
    /// Polygon payload decoding settings.
    pub shape: ShapeOptions,
}

/// Counters collected while reading a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    /// Source lines seen.
    pub lines: usize,
    /// Lines that decoded into a record.
    pub records: usize,
    /// Lines or records skipped as malformed.
    pub malformed: usize,
    /// Copper records dropped for an unusable outline.
    pub degenerate: usize,
    /// Polygon records excluded as non-copper.
    pub non_copper: usize,
    /// Primitives dropped because their id was already taken.
    pub duplicates: usize,
}

/// Reads a board document.
pub fn parse_board(source: &str, options: &ParseOptions) -> BoardData {
    let mut stats = ParseStats::default();
    let mut used_net_names = BTreeSet::new();
    let mut inner_layers = Vec::new();
    let mut designators = HashMap::new();
    let mut bindings = BindingTable::new();
    let mut copper_records = Vec::new();

    for (index, line) in source.lines().enumerate() {
        stats.lines += 1;
        let line_no = index + 1;

        let raw = match RawRecord::from_line(line) {
            Ok(Some(raw)) => raw,
            Ok(None) => continue,
            Err(e) => {
                stats.malformed += 1;
                tracing::debug!(line = line_no, error = %e, "Skipping undecodable line");
                continue;
            }
        };
        stats.records += 1;

        if let Some(net) = raw.declared_net() {
            used_net_names.insert(net);
        }

        match interpret(&raw, options) {
            Ok(ParsedRecord::Layer { id, active }) => {
                if active {
                    inner_layers.push(id);
                }
            }
            Ok(ParsedRecord::Attr { owner, key, value }) => {
                if key == "Designator" {
                    designators.insert(owner, value);
                }
            }
            Ok(ParsedRecord::PadNet {
                component,
                pin,
                keys,
            }) => {
                for key in keys {
                    bindings.insert(
                        key,
                        PadPinBinding {
                            component_id: component.clone(),
                            pin: pin.clone(),
                            designator: None,
                        },
                    );
                }
            }
            Ok(ParsedRecord::NonCopper { kind }) => {
                stats.non_copper += 1;
                tracing::trace!(line = line_no, kind = %kind, "Excluding non-copper polygon");
            }
            Ok(ParsedRecord::Other { .. }) => {}
            Ok(record) => copper_records.push(record),
            Err(e @ RecordError::Malformed { .. }) => {
                stats.malformed += 1;
                tracing::debug!(line = line_no, error = %e, "Skipping record");
            }
            Err(e @ RecordError::Degenerate { .. }) => {
                stats.degenerate += 1;
                tracing::debug!(line = line_no, error = %e, "Dropping record");
            }
        }
    }

    let layer_stack = LayerStack::from_inner_layers(inner_layers);
    bindings.resolve_designators(&designators);

    let mut seen = HashSet::new();
    let mut primitives = Vec::with_capacity(copper_records.len());
    for record in copper_records {
        let Some(primitive) = into_primitive(record, &layer_stack) else {
            continue;
        };
        if !seen.insert(primitive.id.clone()) {
            stats.duplicates += 1;
            tracing::warn!(id = %primitive.id, "Duplicate primitive id, keeping the first");
            continue;
        }
        primitives.push(primitive);
    }

    tracing::debug!(
        lines = stats.lines,
        records = stats.records,
        primitives = primitives.len(),
        bindings = bindings.len(),
        layers = layer_stack.len(),
        malformed = stats.malformed,
        degenerate = stats.degenerate,
        "Parsed board document"
    );

    BoardData {
        primitives,
        bindings,
        used_net_names,
        layer_stack,
        stats,
    }
}

/// Interprets one raw record with the matching front-end.
///
/// # Errors
///
/// Returns a [`RecordError`] when required fields are missing or the copper
/// outline is unusable.
pub fn interpret(raw: &RawRecord, options: &ParseOptions) -> Result<ParsedRecord, RecordError> {
    match raw {
        RawRecord::Array(items) => interpret_array(items, options),
        RawRecord::Object(fields) => interpret_object(fields, &options.shape),
    }
}

fn into_primitive(record: ParsedRecord, stack: &LayerStack) -> Option<Primitive> {
    let primitive = match record {
        ParsedRecord::Line(stroke) => stroke_primitive(stroke, PrimitiveKind::Line),
        ParsedRecord::Arc(stroke) => stroke_primitive(stroke, PrimitiveKind::Arc),
        ParsedRecord::Via {
            id,
            net,
            center,
            diameter,
            range,
        } => {
            let layers = range
                .as_deref()
                .and_then(|range| stack.resolve_range(range))
                .map_or(LayerSpan::All, LayerSpan::Stack);
            let shape = Shape::Round {
                center,
                radius: diameter / 2.0,
            };
            Primitive::new(id, PrimitiveKind::Via, net, Copper::new(layers, shape))
        }
        ParsedRecord::Poly {
            id,
            kind,
            net,
            layer,
            vertices,
        } => Primitive::new(
            id,
            PrimitiveKind::Poly(kind),
            net,
            Copper::new(LayerSpan::from_layer_id(layer), Shape::Polygon { vertices }),
        ),
        _ => return None,
    };
    Some(primitive)
}

fn stroke_primitive(stroke: StrokeRecord, kind: PrimitiveKind) -> Primitive {
    let shape = Shape::Segment {
        start: stroke.start,
        end: stroke.end,
        width: stroke.width,
    };
    Primitive::new(
        stroke.id,
        kind,
        stroke.net,
        Copper::new(LayerSpan::from_layer_id(stroke.layer), shape),
    )
}

// ---------------------------------------------------------------------------
// Positional array front-end
// ---------------------------------------------------------------------------

fn interpret_array(items: &[Value], options: &ParseOptions) -> Result<ParsedRecord, RecordError> {
    let kind = items
        .first()
        .and_then(Value::as_str)
        .ok_or_else(|| RecordError::malformed("array record without a type tag"))?;
    let string = |i: usize| items.get(i).and_then(loose_string);
    let number = |i: usize, name: &str| {
        items
            .get(i)
            .and_then(loose_f64)
            .ok_or_else(|| RecordError::missing_field(kind, name))
    };
    let layer = |i: usize| {
        items
            .get(i)
            .and_then(loose_i32)
            .ok_or_else(|| RecordError::missing_field(kind, "layer"))
    };
    let id = || string(1).ok_or_else(|| RecordError::missing_field(kind, "id"));

    match kind {
        "LAYER" => Ok(ParsedRecord::Layer {
            id: layer(1)?,
            active: options
                .format
                .array_layer_active(items.get(4).and_then(loose_i32)),
        }),
        "ATTR" => Ok(match (string(3), string(7), string(8)) {
            (Some(owner), Some(key), Some(value)) => ParsedRecord::Attr { owner, key, value },
            _ => ParsedRecord::Other {
                kind: kind.to_string(),
            },
        }),
        "PAD_NET" => {
            let component = string(1).ok_or_else(|| RecordError::missing_field(kind, "component"))?;
            let pin = string(2).ok_or_else(|| RecordError::missing_field(kind, "pin"))?;
            let suffix = string(4).unwrap_or_default();
            Ok(ParsedRecord::PadNet {
                keys: vec![format!("{component}{suffix}")],
                component,
                pin,
            })
        }
        "LINE" | "ARC" => {
            let stroke = StrokeRecord {
                id: id()?,
                net: string(3),
                layer: layer(4)?,
                start: Point::new(number(5, "x1")?, number(6, "y1")?),
                end: Point::new(number(7, "x2")?, number(8, "y2")?),
                width: items.get(9).and_then(loose_f64).unwrap_or(0.0).max(0.0),
            };
            Ok(if kind == "LINE" {
                ParsedRecord::Line(stroke)
            } else {
                ParsedRecord::Arc(stroke)
            })
        }
        "VIA" => via_record(
            id()?,
            string(3),
            string(4),
            Point::new(number(5, "x")?, number(6, "y")?),
            number(8, "diameter")?,
        ),
        _ => match PolyKind::from_tag(kind) {
            Some(poly) => {
                let layer = layer(4)?;
                if poly == PolyKind::Fill && layer == MULTI_LAYER {
                    return Ok(ParsedRecord::NonCopper {
                        kind: kind.to_string(),
                    });
                }
                let slot = if poly == PolyKind::CopperArea { 8 } else { 7 };
                let payload = items
                    .get(slot)
                    .ok_or_else(|| RecordError::missing_field(kind, "shape"))?;
                Ok(ParsedRecord::Poly {
                    id: id()?,
                    kind: poly,
                    net: string(3),
                    layer,
                    vertices: decode_outline(payload, &options.shape)?,
                })
            }
            None => Ok(ParsedRecord::Other {
                kind: kind.to_string(),
            }),
        },
    }
}

// ---------------------------------------------------------------------------
// Keyed object front-end
// ---------------------------------------------------------------------------

fn interpret_object(
    fields: &Map<String, Value>,
    shape: &ShapeOptions,
) -> Result<ParsedRecord, RecordError> {
    let kind = fields
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| RecordError::malformed("object record without a type"))?;
    let string = |name: &str| fields.get(name).and_then(loose_string);
    let number = |name: &str| {
        fields
            .get(name)
            .and_then(loose_f64)
            .ok_or_else(|| RecordError::missing_field(kind, name))
    };
    let layer = || {
        fields
            .get("layerId")
            .and_then(loose_i32)
            .ok_or_else(|| RecordError::missing_field(kind, "layerId"))
    };
    let id = || {
        string("ticket")
            .or_else(|| string("id"))
            .ok_or_else(|| RecordError::missing_field(kind, "id"))
    };

    match kind {
        "LAYER" => {
            let id = fields
                .get("layerId")
                .and_then(loose_i32)
                .or_else(|| {
                    let parts = compound_id(fields.get("id")?)?;
                    parts.get(1).and_then(loose_i32)
                })
                .ok_or_else(|| RecordError::missing_field(kind, "layerId"))?;
            Ok(ParsedRecord::Layer {
                id,
                active: fields.get("use").and_then(Value::as_bool) == Some(true),
            })
        }
        "ATTR" => Ok(match (string("parentId"), string("key"), string("value")) {
            (Some(owner), Some(key), Some(value)) => ParsedRecord::Attr { owner, key, value },
            _ => ParsedRecord::Other {
                kind: kind.to_string(),
            },
        }),
        "PAD_NET" => {
            let parts = fields
                .get("id")
                .and_then(compound_id)
                .filter(|parts| parts.len() >= 4)
                .ok_or_else(|| RecordError::missing_field(kind, "id"))?;
            let part = |i: usize| parts.get(i).and_then(loose_string);
            let component = part(1).ok_or_else(|| RecordError::missing_field(kind, "component"))?;
            let pin = part(2).ok_or_else(|| RecordError::missing_field(kind, "pin"))?;
            let suffix = part(3).unwrap_or_default();
            Ok(ParsedRecord::PadNet {
                keys: vec![format!("{component}{suffix}"), suffix],
                component,
                pin,
            })
        }
        "LINE" | "ARC" => {
            let stroke = StrokeRecord {
                id: id()?,
                net: string("netName"),
                layer: layer()?,
                start: Point::new(number("startX")?, number("startY")?),
                end: Point::new(number("endX")?, number("endY")?),
                width: fields
                    .get("width")
                    .and_then(loose_f64)
                    .unwrap_or(0.0)
                    .max(0.0),
            };
            Ok(if kind == "LINE" {
                ParsedRecord::Line(stroke)
            } else {
                ParsedRecord::Arc(stroke)
            })
        }
        "VIA" => via_record(
            id()?,
            string("netName"),
            string("ruleName"),
            Point::new(number("centerX")?, number("centerY")?),
            number("viaDiameter")?,
        ),
        _ => match PolyKind::from_tag(kind) {
            Some(poly) => {
                if poly == PolyKind::Poly
                    && fields.get("polyType").and_then(Value::as_str) == Some("BOARD_OUTLINE")
                {
                    return Ok(ParsedRecord::NonCopper {
                        kind: kind.to_string(),
                    });
                }
                let layer = layer()?;
                if poly == PolyKind::Fill && layer == MULTI_LAYER {
                    return Ok(ParsedRecord::NonCopper {
                        kind: kind.to_string(),
                    });
                }
                let payload = object_payload(fields)
                    .ok_or_else(|| RecordError::missing_field(kind, "path"))?;
                Ok(ParsedRecord::Poly {
                    id: id()?,
                    kind: poly,
                    net: string("netName"),
                    layer,
                    vertices: decode_outline(&payload, shape)?,
                })
            }
            None => Ok(ParsedRecord::Other {
                kind: kind.to_string(),
            }),
        },
    }
}

/// Picks the outline of an object polygon: `path`, then `points`, then a
/// rectangle shorthand built from `x`/`y`/`width`/`height`.
fn object_payload(fields: &Map<String, Value>) -> Option<Value> {
    for key in ["path", "points"] {
        match fields.get(key) {
            None | Some(Value::Null) => {}
            Some(payload) => return Some(payload.clone()),
        }
    }
    let number = |name: &str| fields.get(name).and_then(loose_f64);
    let (x, y) = (number("x")?, number("y")?);
    let (width, height) = (number("width")?, number("height")?);
    Some(Value::Array(vec![
        Value::from("R"),
        Value::from(x),
        Value::from(y),
        Value::from(width),
        Value::from(height),
        Value::from(number("rotation").unwrap_or(0.0)),
        Value::from(number("cornerRadius").unwrap_or(0.0)),
    ]))
}

/// Reads an id that is either a JSON array or a string holding one.
fn compound_id(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(parts) => Some(parts.clone()),
        Value::String(s) if s.trim_start().starts_with('[') => serde_json::from_str(s).ok(),
        _ => None,
    }
}

fn via_record(
    id: String,
    net: Option<String>,
    range: Option<String>,
    center: Point,
    diameter: f64,
) -> Result<ParsedRecord, RecordError> {
    if diameter <= 0.0 {
        return Err(RecordError::degenerate(format!(
            "via {id} with diameter {diameter}"
        )));
    }
    Ok(ParsedRecord::Via {
        id,
        net,
        center,
        diameter,
        range: range.filter(|r| !r.trim().is_empty()),
    })
}
