//! Physical connectivity clustering.

use super::grid::Grid;
use super::union_find::DisjointSet;
use crate::board::Primitive;
use crate::config::EngineConfig;
use crate::geometry::{touches, BBox};

/// A group of primitives joined by copper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    members: Vec<usize>,
}

impl Cluster {
    /// Indices into the primitive list, ordered by primitive id.
    #[must_use]
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// Number of primitives.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false for clusters produced by [`cluster_primitives`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The member primitives, ordered by id.
    pub fn primitives<'a>(&'a self, all: &'a [Primitive]) -> impl Iterator<Item = &'a Primitive> {
        self.members.iter().map(move |&index| &all[index])
    }
}

/// Result of [`cluster_primitives`].
#[derive(Debug, Clone, Default)]
pub struct Clustering {
    /// Clusters ordered by the id of their first member.
    pub clusters: Vec<Cluster>,
    /// Pairs produced by the broad phase.
    pub candidate_pairs: usize,
    /// Pairs that actually touch.
    pub touching_pairs: usize,
}

/// Groups primitives into electrically connected clusters.
///
/// The output does not depend on the order of `primitives`: members are
/// sorted by id and clusters by their first member.
#[must_use]
pub fn cluster_primitives(primitives: &[Primitive], config: &EngineConfig) -> Clustering {
    let rules = config.touch_rules();
    let boxes: Vec<BBox> = primitives.iter().map(|p| p.copper.bbox).collect();
    let grid = Grid::build(&boxes, config.grid_size, config.grid_padding);

    let mut sets = DisjointSet::new(primitives.len());
    let mut candidate_pairs = 0;
    let mut touching_pairs = 0;

    for (a, b) in grid.candidate_pairs() {
        candidate_pairs += 1;
        if touches(&primitives[a].copper, &primitives[b].copper, &rules) {
            touching_pairs += 1;
            if sets.union(a, b) {
                tracing::trace!(a = %primitives[a].id, b = %primitives[b].id, "Joined");
            }
        }
    }

    let mut clusters: Vec<Cluster> = sets
        .groups()
        .into_iter()
        .map(|mut members| {
            members.sort_by(|&x, &y| primitives[x].id.cmp(&primitives[y].id));
            Cluster { members }
        })
        .collect();
    clusters.sort_by(|x, y| primitives[x.members[0]].id.cmp(&primitives[y.members[0]].id));

    tracing::debug!(
        primitives = primitives.len(),
        candidate_pairs,
        touching_pairs,
        clusters = clusters.len(),
        "Clustered primitives"
    );

    Clustering {
        clusters,
        candidate_pairs,
        touching_pairs,
    }
}
