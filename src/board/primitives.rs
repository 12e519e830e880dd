//! Board primitives and pad-to-pin bindings.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::record::PolyKind;
use crate::geometry::Copper;

/// What kind of record a primitive came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// Component pad (from the host pad list).
    Pad,
    /// Straight track.
    Line,
    /// Arc track (stored as its chord).
    Arc,
    /// Via.
    Via,
    /// Fill, polygon, region or copper area.
    Poly(PolyKind),
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pad => "PAD",
            Self::Line => "LINE",
            Self::Arc => "ARC",
            Self::Via => "VIA",
            Self::Poly(PolyKind::Fill) => "FILL",
            Self::Poly(PolyKind::Poly) => "POLY",
            Self::Poly(PolyKind::Region) => "REGION",
            Self::Poly(PolyKind::CopperArea) => "COPPER_AREA",
        };
        f.write_str(name)
    }
}

/// One piece of copper on the board.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    /// Stable id, unique within a run.
    pub id: String,
    /// Source kind.
    pub kind: PrimitiveKind,
    /// Net name declared on the board, if any (placeholders included).
    pub net: Option<String>,
    /// Shape and layers.
    pub copper: Copper,
}

impl Primitive {
    /// Creates a primitive.
    pub fn new(
        id: impl Into<String>,
        kind: PrimitiveKind,
        net: Option<String>,
        copper: Copper,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            net,
            copper,
        }
    }

    /// Whether this is a component pad.
    #[must_use]
    pub fn is_pad(&self) -> bool {
        self.kind == PrimitiveKind::Pad
    }
}

/// The component pin a pad belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PadPinBinding {
    /// Owning component id.
    pub component_id: String,
    /// Pin number.
    pub pin: String,
    /// Component designator (`R1`, `U3`), when an `ATTR` record names it.
    pub designator: Option<String>,
}

/// Pad key to pin binding table.
///
/// Pads are looked up by their primitive id. The board only records keys
/// that are a suffix of the pad id (`component + pad suffix`, or the bare
/// suffix), so lookups fall back to the longest matching suffix key.
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    entries: IndexMap<String, PadPinBinding>,
}

impl BindingTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a binding under `key`. Later registrations win.
    ///
    /// Empty keys are ignored: every pad id would match them as a suffix.
    pub fn insert(&mut self, key: impl Into<String>, binding: PadPinBinding) {
        let key = key.into();
        if key.is_empty() {
            tracing::trace!(pin = %binding.pin, "Ignoring binding with empty key");
            return;
        }
        self.entries.insert(key, binding);
    }

    /// Fills in designators from a component id to designator map.
    pub fn resolve_designators(&mut self, designators: &HashMap<String, String>) {
        for binding in self.entries.values_mut() {
            binding.designator = designators.get(&binding.component_id).cloned();
        }
    }

    /// Finds the binding for a pad id.
    ///
    /// Exact key first; otherwise the longest key the pad id ends with.
    /// Two distinct suffixes of one id never have the same length, so the
    /// result does not depend on registration order.
    #[must_use]
    pub fn lookup(&self, pad_id: &str) -> Option<&PadPinBinding> {
        if let Some(binding) = self.entries.get(pad_id) {
            return Some(binding);
        }
        self.entries
            .iter()
            .filter(|(key, _)| pad_id.ends_with(key.as_str()))
            .max_by_key(|(key, _)| key.len())
            .map(|(_, binding)| binding)
    }

    /// Number of registered keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no keys are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(key, binding)` in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PadPinBinding)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
