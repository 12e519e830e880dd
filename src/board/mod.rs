//! Board document model and reader.
//!
//! The host describes a board in two places:
//!
//! - the **document source**, one record per line, in either of two
//!   encodings (positional arrays, or keyed objects split into `||`
//!   fragments), holding tracks, vias, polygons, layers, designators and
//!   pad-to-pin bindings;
//! - the **pad list**, absolute pad geometry fetched separately.
//!
//! [`parse_board`] reads the first into [`BoardData`];
//! [`BoardData::add_host_pads`] merges in the second.
//!
//! # Record Types
//!
//! | Tag | Becomes |
//! |---|---|
//! | `LAYER` | inner layer of the [`LayerStack`] |
//! | `ATTR` | component designator |
//! | `PAD_NET` | entry of the [`BindingTable`] |
//! | `LINE`, `ARC` | segment primitive |
//! | `VIA` | round primitive |
//! | `FILL`, `POLY`, `REGION`, `COPPER_AREA` | polygon primitive |

pub mod error;
pub mod loose;
pub mod pads;
pub mod primitives;
pub mod reader;
pub mod record;
pub mod shape;
pub mod stack;

pub use error::RecordError;
pub use pads::{HostPad, PadOptions};
pub use primitives::{BindingTable, PadPinBinding, Primitive, PrimitiveKind};
pub use reader::{parse_board, ParseOptions, ParseStats};
pub use shape::ShapeOptions;
pub use stack::LayerStack;

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

/// First editor major version that writes keyed documents.
pub const KEYED_FORMAT_MAJOR_VERSION: u32 = 3;

/// Which document generation the host writes.
///
/// Both line encodings are always accepted; the capability only changes how
/// array-encoded `LAYER` records signal that a layer is in use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Older editors: array layers are active at status 3.
    Legacy,
    /// Current editors: array layers are active at any positive status.
    #[default]
    Keyed,
}

impl SourceFormat {
    /// Picks the format from an editor version string such as `"3.2.1"`.
    ///
    /// Returns `None` if no major version can be read.
    #[must_use]
    pub fn from_editor_version(version: &str) -> Option<Self> {
        let version = version.trim().trim_start_matches(['v', 'V']);
        let major = version.split('.').next()?.trim().parse::<u32>().ok()?;
        Some(if major >= KEYED_FORMAT_MAJOR_VERSION {
            Self::Keyed
        } else {
            Self::Legacy
        })
    }

    /// Whether an array `LAYER` record with this status marks a used layer.
    #[must_use]
    pub fn array_layer_active(self, status: Option<i32>) -> bool {
        match (self, status) {
            (_, None) => false,
            (Self::Legacy, Some(status)) => status == 3,
            (Self::Keyed, Some(status)) => status > 0,
        }
    }
}

/// Everything the engine needs from the board.
#[derive(Debug, Clone, Default)]
pub struct BoardData {
    /// Copper primitives with unique ids.
    pub primitives: Vec<Primitive>,
    /// Pad key to pin bindings, designators resolved.
    pub bindings: BindingTable,
    /// Every net name seen on the board or the pads.
    pub used_net_names: BTreeSet<String>,
    /// Copper layer order.
    pub layer_stack: LayerStack,
    /// Reader counters.
    pub stats: ParseStats,
}

impl BoardData {
    /// Adds host pads as primitives and records their net names.
    ///
    /// Pads without a position, or whose id is already taken, are skipped.
    /// Returns the number of pads added.
    pub fn add_host_pads(&mut self, pads: &[HostPad], options: &PadOptions) -> usize {
        let mut taken: HashSet<String> = self.primitives.iter().map(|p| p.id.clone()).collect();
        let mut added = 0;

        for pad in pads {
            if let Some(net) = pad.net.as_ref().filter(|n| !n.is_empty()) {
                self.used_net_names.insert(net.clone());
            }
            let Some(primitive) = pad.to_primitive(options) else {
                continue;
            };
            if !taken.insert(primitive.id.clone()) {
                tracing::warn!(id = %primitive.id, "Pad id already used by another primitive");
                continue;
            }
            self.primitives.push(primitive);
            added += 1;
        }

        tracing::debug!(added, total = pads.len(), "Merged host pads");
        added
    }

    /// Number of pad primitives.
    #[must_use]
    pub fn pad_count(&self) -> usize {
        self.primitives.iter().filter(|p| p.is_pad()).count()
    }
}
