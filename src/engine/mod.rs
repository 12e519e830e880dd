//! Net reconstruction engine.
//!
//! ```text
//! BoardData ──► Grid (broad phase) ──► touches (narrow phase) ──► DisjointSet
//!                                                                    │
//!            NetAssignment ◄── assign_names ◄── clusters ◄───────────┘
//! ```
//!
//! The engine is pure: it reads a [`BoardData`] and returns assignments.
//! Reading the board and writing the netlist live elsewhere.

pub mod connectivity;
pub mod grid;
pub mod naming;
pub mod union_find;

pub use connectivity::{cluster_primitives, Cluster, Clustering};
pub use grid::Grid;
pub use naming::{assign_names, canonical_name, is_generated_name, NameAllocator, NetAssignment};
pub use union_find::DisjointSet;

use serde::Serialize;

use crate::board::BoardData;
use crate::config::EngineConfig;

/// Everything one reconstruction produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NetReport {
    /// Pin assignments, deterministic for a given board.
    pub assignments: Vec<NetAssignment>,
    /// Newly generated net names.
    pub minted: Vec<String>,
    /// Number of connected clusters.
    pub clusters: usize,
    /// Clusters skipped as noise.
    pub noise_clusters: usize,
    /// Clusters that joined copper carrying different net names.
    pub merged_clusters: usize,
    /// Broad-phase candidate pairs.
    pub candidate_pairs: usize,
    /// Pairs found touching.
    pub touching_pairs: usize,
}

/// Reconstructs physical nets for a board.
#[must_use]
pub fn reconstruct(board: &BoardData, config: &EngineConfig) -> NetReport {
    let clustering = cluster_primitives(&board.primitives, config);
    let naming = assign_names(
        &clustering.clusters,
        &board.primitives,
        &board.bindings,
        &board.used_net_names,
    );

    NetReport {
        assignments: naming.assignments,
        minted: naming.minted,
        clusters: clustering.clusters.len(),
        noise_clusters: naming.noise_clusters,
        merged_clusters: naming.merged_clusters,
        candidate_pairs: clustering.candidate_pairs,
        touching_pairs: clustering.touching_pairs,
    }
}
