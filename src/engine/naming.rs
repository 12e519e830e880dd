//! Net naming for connected clusters.
//!
//! A cluster keeps the best name already present on its members. Names of
//! the form `NET<k>` count as generated and lose to any hand-given name.
//! A cluster without a name gets the smallest free `NET<k>`, unique against
//! every name seen on the board and every name minted earlier in the run.

use std::collections::{BTreeSet, HashSet};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::connectivity::Cluster;
use crate::board::{BindingTable, Primitive};

/// Prefix of generated net names.
pub const GENERATED_PREFIX: &str = "NET";

/// Net name strings that mean "no net".
const PLACEHOLDER_NAMES: [&str; 3] = ["", "null", "undefined"];

/// One pin's new net.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct NetAssignment {
    /// Component designator (`R1`).
    pub designator: String,
    /// Pin number.
    pub pin: String,
    /// Net name.
    pub net: String,
}

/// Whether `name` looks like a generated net name (`NET12`, `net3`).
#[must_use]
pub fn is_generated_name(name: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)^NET\d+$").expect("generated-name pattern"))
        .is_match(name)
}

/// Whether `name` stands for "no net".
#[must_use]
pub fn is_placeholder(name: &str) -> bool {
    PLACEHOLDER_NAMES.contains(&name)
}

/// Picks the cluster name from the names present on its members.
///
/// Hand-given names beat generated ones, then shorter beats longer, then
/// lexicographic order decides.
#[must_use]
pub fn canonical_name<'a>(names: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    names
        .into_iter()
        .filter(|name| !is_placeholder(name))
        .min_by(|a, b| {
            is_generated_name(a)
                .cmp(&is_generated_name(b))
                .then_with(|| a.len().cmp(&b.len()))
                .then_with(|| a.cmp(b))
        })
}

/// Mints `NET<k>` names that collide with nothing already taken.
///
/// Comparison is case-insensitive, so `net4` on the board blocks `NET4`.
#[derive(Debug, Clone, Default)]
pub struct NameAllocator {
    taken: HashSet<String>,
    next: u64,
}

impl NameAllocator {
    /// Creates an allocator that avoids `used`.
    pub fn new<'a>(used: impl IntoIterator<Item = &'a String>) -> Self {
        Self {
            taken: used.into_iter().map(|name| name.to_ascii_uppercase()).collect(),
            next: 1,
        }
    }

    /// Returns the smallest free `NET<k>` and reserves it.
    pub fn allocate(&mut self) -> String {
        loop {
            let candidate = format!("{GENERATED_PREFIX}{}", self.next);
            self.next += 1;
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

/// Outcome of [`assign_names`].
#[derive(Debug, Clone, Default)]
pub struct Naming {
    /// Assignments in cluster order, pins sorted within a cluster.
    pub assignments: Vec<NetAssignment>,
    /// Names minted during the run, in allocation order.
    pub minted: Vec<String>,
    /// Clusters skipped as noise (fewer than two bound pads, no name).
    pub noise_clusters: usize,
    /// Clusters whose members carried more than one distinct name.
    pub merged_clusters: usize,
}

/// Names every cluster and emits one assignment per bound pin.
///
/// Only pads with a binding whose designator is known produce assignments;
/// other members still join clusters but are inert here. A cluster with
/// fewer than two such pads and no existing name is noise: it emits nothing
/// and consumes no generated name. Pads sharing a pin yield one assignment.
#[must_use]
pub fn assign_names(
    clusters: &[Cluster],
    primitives: &[Primitive],
    bindings: &BindingTable,
    used_names: &BTreeSet<String>,
) -> Naming {
    let mut allocator = NameAllocator::new(used_names);
    let mut naming = Naming::default();

    for cluster in clusters {
        let names: BTreeSet<&str> = cluster
            .primitives(primitives)
            .filter_map(|p| p.net.as_deref())
            .filter(|name| !is_placeholder(name))
            .collect();

        let resolved: Vec<(&str, &str)> = cluster
            .primitives(primitives)
            .filter(|p| p.is_pad())
            .filter_map(|p| bindings.lookup(&p.id))
            .filter_map(|b| Some((b.designator.as_deref()?, b.pin.as_str())))
            .collect();

        // Pads are counted, not pins: several pads may share one pin number
        let existing = canonical_name(names.iter().copied());
        if existing.is_none() && resolved.len() < 2 {
            naming.noise_clusters += 1;
            continue;
        }
        if resolved.is_empty() {
            continue;
        }
        let pins: BTreeSet<(&str, &str)> = resolved.into_iter().collect();
        if names.len() > 1 {
            naming.merged_clusters += 1;
            tracing::debug!(
                names = ?names,
                chosen = existing.unwrap_or_default(),
                "Cluster joins several nets"
            );
        }

        let net = match existing {
            Some(name) => name.to_string(),
            None => {
                let name = allocator.allocate();
                naming.minted.push(name.clone());
                name
            }
        };

        naming
            .assignments
            .extend(pins.into_iter().map(|(designator, pin)| NetAssignment {
                designator: designator.to_string(),
                pin: pin.to_string(),
                net: net.clone(),
            }));
    }

    tracing::debug!(
        assignments = naming.assignments.len(),
        minted = naming.minted.len(),
        noise = naming.noise_clusters,
        "Named clusters"
    );
    naming
}
