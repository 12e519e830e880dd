//! Netlist document access.
//!
//! The netlist is owned by the host and handed over as JSON. Two layouts
//! occur:
//!
//! ```text
//! { "<id>": { "props": { "Designator": "R1" }, "pins": { "1": "GND" } } }
//! { "components": { "<id>": { "props": {...}, "pinInfoMap": { "1": { "net": "GND", "number": "1" } } } } }
//! ```
//!
//! Everything not touched by an update is preserved as-is, including key
//! order and unknown fields.

pub mod writer;

pub use writer::{apply_assignments, PatchOutcome};

use serde_json::{Map, Value};

/// Key of the nested component table.
pub const COMPONENTS_KEY: &str = "components";

/// How components are stored in a netlist document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentLayout {
    /// Components directly under the root.
    Flat,
    /// Components under a `components` object.
    Nested,
}

impl DocumentLayout {
    /// Detects the layout of a document.
    ///
    /// Returns `None` if the document is not a JSON object.
    #[must_use]
    pub fn detect(document: &Value) -> Option<Self> {
        let root = document.as_object()?;
        Some(match root.get(COMPONENTS_KEY) {
            Some(Value::Object(_)) => Self::Nested,
            _ => Self::Flat,
        })
    }
}

/// The component table of a document, whichever layout it uses.
pub fn components_mut(document: &mut Value) -> Option<&mut Map<String, Value>> {
    match DocumentLayout::detect(document)? {
        DocumentLayout::Nested => document.get_mut(COMPONENTS_KEY)?.as_object_mut(),
        DocumentLayout::Flat => document.as_object_mut(),
    }
}

/// The component table of a document, read-only.
#[must_use]
pub fn components(document: &Value) -> Option<&Map<String, Value>> {
    match DocumentLayout::detect(document)? {
        DocumentLayout::Nested => document.get(COMPONENTS_KEY)?.as_object(),
        DocumentLayout::Flat => document.as_object(),
    }
}

/// A component's designator (`props.Designator`), if non-empty.
#[must_use]
pub fn designator(component: &Value) -> Option<&str> {
    component
        .get("props")?
        .get("Designator")?
        .as_str()
        .filter(|d| !d.is_empty())
}

/// The net currently on a component pin, in either pin layout.
#[must_use]
pub fn pin_net<'a>(component: &'a Value, pin: &str) -> Option<&'a str> {
    if let Some(info) = component.get("pinInfoMap").and_then(Value::as_object) {
        return info.get(pin)?.get("net")?.as_str();
    }
    component.get("pins")?.get(pin)?.as_str()
}

/// Finds the net on `designator`/`pin` anywhere in the document.
#[must_use]
pub fn find_pin_net<'a>(document: &'a Value, designator_name: &str, pin: &str) -> Option<&'a str> {
    components(document)?
        .values()
        .filter(|component| designator(component) == Some(designator_name))
        .find_map(|component| pin_net(component, pin))
}
