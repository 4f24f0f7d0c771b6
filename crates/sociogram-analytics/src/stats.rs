//! Summary statistics for an interaction graph.
//!
//! # Statistics Provided
//!
//! - **vertex_count** / **edge_count**: identities and distinct directed
//!   interactions.
//! - **total_weight**: sum of all edge weights.
//! - **density**: `edge_count / (vertex_count · (vertex_count − 1))`;
//!   0.0 for fewer than two vertices.
//! - **connectivity**: density as a percentage.
//! - **scc_count**: strongly connected components ("natural groups").
//! - **reciprocal_group_count**: SCCs with more than one member, i.e. sets
//!   of contributors who reach each other both ways.
//! - **weak_component_count**: components of the undirected view. More
//!   than one means the project has disjoint circles of contributors.
//! - **isolated_vertex_count**: identities with no interactions at all.
//! - **max_in_degree** / **max_out_degree**: largest distinct-neighbor
//!   counts in each direction.
//! - **max_weighted_degree**: largest weighted degree.

use petgraph::{Direction, algo::connected_components, visit::EdgeRef};
use serde::Serialize;

use sociogram_core::graph::InteractionGraph;

use crate::components::strongly_connected_components;
use crate::metrics::degree::compute_density;

// ---------------------------------------------------------------------------
// GraphStats
// ---------------------------------------------------------------------------

/// Summary statistics for an [`InteractionGraph`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStats {
    pub vertex_count: usize,
    pub edge_count: usize,
    pub total_weight: u64,
    pub density: f64,
    /// `density · 100`.
    pub connectivity: f64,
    pub scc_count: usize,
    pub reciprocal_group_count: usize,
    pub weak_component_count: usize,
    pub isolated_vertex_count: usize,
    pub max_in_degree: usize,
    pub max_out_degree: usize,
    pub max_weighted_degree: u64,
}

impl GraphStats {
    #[must_use]
    pub fn from_graph(graph: &InteractionGraph) -> Self {
        let g = graph.graph();
        let vertex_count = graph.vertex_count();
        let edge_count = graph.edge_count();
        let density = compute_density(vertex_count, edge_count);

        let total_weight = g.edge_references().map(|e| e.weight().weight).sum::<u64>();

        let partition = strongly_connected_components(graph);
        let scc_count = partition.len();
        let reciprocal_group_count = partition.iter().filter(|group| group.len() > 1).count();

        let isolated_vertex_count = g
            .node_indices()
            .filter(|&idx| graph.undirected_neighbors(idx).is_empty())
            .count();

        let degree = |direction: Direction| {
            g.node_indices()
                .map(|idx| g.neighbors_directed(idx, direction).count())
                .max()
                .unwrap_or(0)
        };

        let max_weighted_degree = g
            .node_indices()
            .map(|idx| {
                g.edges_directed(idx, Direction::Outgoing)
                    .chain(g.edges_directed(idx, Direction::Incoming))
                    .map(|e| e.weight().weight)
                    .sum::<u64>()
            })
            .max()
            .unwrap_or(0);

        Self {
            vertex_count,
            edge_count,
            total_weight,
            density,
            connectivity: density * 100.0,
            scc_count,
            reciprocal_group_count,
            weak_component_count: connected_components(g),
            isolated_vertex_count,
            max_in_degree: degree(Direction::Incoming),
            max_out_degree: degree(Direction::Outgoing),
            max_weighted_degree,
        }
    }

    /// `true` when no interactions were recorded.
    #[must_use]
    pub const fn is_flat(&self) -> bool {
        self.edge_count == 0
    }

    /// `true` when at least one group of contributors reaches each other
    /// both ways.
    #[must_use]
    pub const fn has_reciprocal_groups(&self) -> bool {
        self.reciprocal_group_count > 0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
