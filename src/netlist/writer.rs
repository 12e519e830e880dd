//! Applies net assignments to a netlist document.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Map, Value};

use super::{components_mut, designator};
use crate::engine::NetAssignment;

/// What [`apply_assignments`] changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PatchOutcome {
    /// Pin writes that changed a value (created entries included).
    pub change_count: usize,
    /// Components with at least one changed pin.
    pub components_touched: usize,
    /// Pin entries that did not exist before.
    pub pins_created: usize,
}

/// Writes assignments into `document` in place.
///
/// Components are matched by `props.Designator`. Components with a
/// `pinInfoMap` get `{net, number}` entries; all others get plain `pins`
/// strings, the map being created if absent. When several assignments name
/// the same pin, the last one wins. Writes that leave a value unchanged are
/// not counted. A component whose `pins` is not an object is skipped.
///
/// Returns an empty outcome when the document has no component table.
pub fn apply_assignments(document: &mut Value, assignments: &[NetAssignment]) -> PatchOutcome {
    let mut by_designator: BTreeMap<&str, BTreeMap<&str, &str>> = BTreeMap::new();
    for assignment in assignments {
        by_designator
            .entry(assignment.designator.as_str())
            .or_default()
            .insert(assignment.pin.as_str(), assignment.net.as_str());
    }

    let mut outcome = PatchOutcome::default();
    let Some(components) = components_mut(document) else {
        tracing::warn!("Netlist document has no component table");
        return outcome;
    };

    for (id, component) in components.iter_mut() {
        let Some(pins) = designator(component).and_then(|d| by_designator.get(d)) else {
            continue;
        };
        let Some(component) = component.as_object_mut() else {
            continue;
        };

        let before = outcome;
        if component.get("pinInfoMap").is_some_and(Value::is_object) {
            if let Some(Value::Object(info)) = component.get_mut("pinInfoMap") {
                for (&pin, &net) in pins {
                    patch_pin_info(info, pin, net, &mut outcome);
                }
            }
        } else {
            let table = component
                .entry("pins")
                .or_insert_with(|| Value::Object(Map::new()));
            let Value::Object(table) = table else {
                tracing::warn!(component = %id, "Pin table is not an object, leaving component unchanged");
                continue;
            };
            for (&pin, &net) in pins {
                patch_pin(table, pin, net, &mut outcome);
            }
        }

        if outcome.change_count > before.change_count {
            outcome.components_touched += 1;
            tracing::trace!(
                component = %id,
                changes = outcome.change_count - before.change_count,
                "Patched component"
            );
        }
    }

    tracing::debug!(
        changes = outcome.change_count,
        components = outcome.components_touched,
        created = outcome.pins_created,
        "Applied net assignments"
    );
    outcome
}

fn patch_pin_info(info: &mut Map<String, Value>, pin: &str, net: &str, outcome: &mut PatchOutcome) {
    match info.get_mut(pin) {
        Some(Value::Object(entry)) => {
            if entry.get("net").and_then(Value::as_str) != Some(net) {
                entry.insert("net".to_string(), Value::from(net));
                outcome.change_count += 1;
            }
        }
        Some(other) => {
            *other = json!({ "net": net, "number": pin });
            outcome.change_count += 1;
        }
        None => {
            info.insert(pin.to_string(), json!({ "net": net, "number": pin }));
            outcome.change_count += 1;
            outcome.pins_created += 1;
        }
    }
}

fn patch_pin(table: &mut Map<String, Value>, pin: &str, net: &str, outcome: &mut PatchOutcome) {
    if table.get(pin).and_then(Value::as_str) == Some(net) {
        return;
    }
    if table.insert(pin.to_string(), Value::from(net)).is_none() {
        outcome.pins_created += 1;
    }
    outcome.change_count += 1;
}
