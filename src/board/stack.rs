//! Copper layer stack reconstruction.
//!
//! The document only lists which inner layers are in use. The physical
//! order is top, inner layers ascending, bottom:
//!
//! ```text
//! index:  1    2    3    4
//! layer:  1   15   16    2      (top, inner 15, inner 16, bottom)
//! ```
//!
//! Blind and buried vias name their span as a 1-based index range into
//! this stack (`"1-2"` = top to inner 15).

use std::ops::RangeInclusive;

use crate::geometry::{BOTTOM_LAYER, TOP_LAYER};

/// Layer ids that can be inner copper layers.
pub const INNER_LAYER_IDS: RangeInclusive<i32> = 15..=46;

/// Ordered copper layer ids, top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerStack {
    ids: Vec<i32>,
}

impl Default for LayerStack {
    fn default() -> Self {
        Self::from_inner_layers(std::iter::empty())
    }
}

impl LayerStack {
    /// Builds the stack from the active inner layer ids.
    ///
    /// Ids outside [`INNER_LAYER_IDS`] are ignored; duplicates collapse.
    pub fn from_inner_layers(inner: impl IntoIterator<Item = i32>) -> Self {
        let mut inner: Vec<i32> = inner
            .into_iter()
            .filter(|id| INNER_LAYER_IDS.contains(id))
            .collect();
        inner.sort_unstable();
        inner.dedup();

        let mut ids = Vec::with_capacity(inner.len() + 2);
        ids.push(TOP_LAYER);
        ids.extend(inner);
        ids.push(BOTTOM_LAYER);
        Self { ids }
    }

    /// Layer ids, top to bottom.
    #[must_use]
    pub fn ids(&self) -> &[i32] {
        &self.ids
    }

    /// Number of copper layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Always false: top and bottom are always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Resolves a `"start-end"` via range to concrete layer ids.
    ///
    /// Indices are 1-based and clamped to the stack. Returns `None` when the
    /// range is empty, unparsable, or selects nothing, meaning the via is
    /// not restricted.
    #[must_use]
    pub fn resolve_range(&self, range: &str) -> Option<Vec<i32>> {
        let (start, end) = range.trim().split_once('-')?;
        if end.contains('-') {
            return None;
        }
        let start = leading_int(start)?.max(1);
        let end = leading_int(end)?.min(i64::try_from(self.ids.len()).ok()?);

        let resolved: Vec<i32> = (start..=end)
            .filter_map(|index| usize::try_from(index - 1).ok())
            .filter_map(|index| self.ids.get(index).copied())
            .collect();
        (!resolved.is_empty()).then_some(resolved)
    }
}

/// Parses the leading integer of a string (`"3abc"` is 3, `"x"` is `None`).
fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim();
    let digits_end = s
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && c == '+')))
        .map_or(s.len(), |(i, _)| i);
    s[..digits_end].trim_start_matches('+').parse().ok()
}
