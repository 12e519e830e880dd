//! Uniform grid broad phase.
//!
//! Each primitive is bucketed under every cell its padded bounding box
//! covers. Two primitives become a candidate pair when they share at least
//! one cell, so any pair whose padded boxes overlap is always produced.
//!
//! Primitives that would cover an unreasonable number of cells (board-wide
//! pours, or boxes with non-finite coordinates) are not bucketed; they are
//! paired with everything instead.

use std::collections::{BTreeMap, BTreeSet};

use crate::geometry::BBox;

/// A primitive covering more cells than this is paired with everything.
pub const MAX_CELLS_PER_PRIMITIVE: u64 = 65_536;

type Cell = (i64, i64);

/// Cell-bucketed index over bounding boxes.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    cells: BTreeMap<Cell, Vec<usize>>,
    oversized: Vec<usize>,
    len: usize,
}

impl Grid {
    /// Buckets `boxes` (by index) into cells of `cell_size`, each box grown
    /// by `padding` first.
    #[must_use]
    pub fn build(boxes: &[BBox], cell_size: f64, padding: f64) -> Self {
        let mut grid = Self {
            len: boxes.len(),
            ..Self::default()
        };
        let inverse = 1.0 / cell_size;

        for (index, bbox) in boxes.iter().enumerate() {
            let padded = bbox.expanded(padding);
            let Some((min, max)) = cell_range(&padded, inverse) else {
                grid.oversized.push(index);
                continue;
            };
            for cx in min.0..=max.0 {
                for cy in min.1..=max.1 {
                    grid.cells.entry((cx, cy)).or_default().push(index);
                }
            }
        }

        tracing::trace!(
            cells = grid.cells.len(),
            oversized = grid.oversized.len(),
            "Built spatial grid"
        );
        grid
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Indices that were too large to bucket.
    #[must_use]
    pub fn oversized(&self) -> &[usize] {
        &self.oversized
    }

    /// Unordered index pairs `(i, j)` with `i < j` that share a cell, in
    /// ascending order, each pair once.
    #[must_use]
    pub fn candidate_pairs(&self) -> BTreeSet<(usize, usize)> {
        let mut pairs = BTreeSet::new();

        for members in self.cells.values() {
            for (n, &a) in members.iter().enumerate() {
                for &b in &members[n + 1..] {
                    pairs.insert(ordered(a, b));
                }
            }
        }

        for &big in &self.oversized {
            for other in (0..self.len).filter(|&other| other != big) {
                pairs.insert(ordered(big, other));
            }
        }

        pairs
    }
}

const fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Inclusive cell range of a box, or `None` if it is too large to bucket.
#[allow(clippy::cast_possible_truncation)] // bounded by the finite checks below
fn cell_range(bbox: &BBox, inverse: f64) -> Option<(Cell, Cell)> {
    let coords = [
        bbox.min_x * inverse,
        bbox.min_y * inverse,
        bbox.max_x * inverse,
        bbox.max_y * inverse,
    ];
    // Keep well inside i64 so the cell arithmetic below cannot overflow.
    let limit = 2f64.powi(52);
    if coords.iter().any(|c| !c.is_finite() || c.abs() > limit) {
        return None;
    }
    let min = (coords[0].floor() as i64, coords[1].floor() as i64);
    let max = (coords[2].floor() as i64, coords[3].floor() as i64);

    let span_x = u64::try_from(max.0 - min.0 + 1).ok()?;
    let span_y = u64::try_from(max.1 - min.1 + 1).ok()?;
    if span_x.saturating_mul(span_y) > MAX_CELLS_PER_PRIMITIVE {
        return None;
    }
    Some((min, max))
}
