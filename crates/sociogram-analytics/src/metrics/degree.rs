//! Degree-based influence metrics.
//!
//! # Overview
//!
//! Every score here is a closed-form function of a vertex's incident
//! edges, so each query costs O(degree):
//!
//! - **weighted degree**: sum of incoming and outgoing edge weights.
//! - **influence**: `0.3·(out_count + in_count) + 0.4·out_weight +
//!   0.2·in_weight + 0.1·activity`. Outgoing weight dominates because an
//!   outgoing edge means the contributor's threads drew responses.
//! - **density**: `E / (V·(V−1))` for the directed graph.
//!
//! Rankings break score ties by vertex insertion order.

use petgraph::{Direction, graph::NodeIndex, visit::EdgeRef};
use serde::Serialize;
use tracing::instrument;

use sociogram_core::graph::InteractionGraph;

const W_COUNT: f64 = 0.3;
const W_OUT: f64 = 0.4;
const W_IN: f64 = 0.2;
const W_ACTIVITY: f64 = 0.1;

// ---------------------------------------------------------------------------
// Per-vertex summary
// ---------------------------------------------------------------------------

/// Incident-edge totals for one identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DegreeSummary {
    pub out_count: usize,
    pub in_count: usize,
    pub out_weight: u64,
    pub in_weight: u64,
    pub activity: u64,
}

impl DegreeSummary {
    #[must_use]
    pub const fn weighted_degree(&self) -> u64 {
        self.out_weight + self.in_weight
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn influence(&self) -> f64 {
        let count = (self.out_count + self.in_count) as f64;
        W_ACTIVITY.mul_add(
            self.activity as f64,
            W_IN.mul_add(
                self.in_weight as f64,
                W_OUT.mul_add(self.out_weight as f64, W_COUNT * count),
            ),
        )
    }
}

fn summary_at(graph: &InteractionGraph, idx: NodeIndex) -> DegreeSummary {
    let g = graph.graph();
    let mut summary = DegreeSummary {
        activity: g.node_weight(idx).map_or(0, |v| v.activity),
        ..DegreeSummary::default()
    };
    for edge in g.edges_directed(idx, Direction::Outgoing) {
        summary.out_count += 1;
        summary.out_weight += edge.weight().weight;
    }
    for edge in g.edges_directed(idx, Direction::Incoming) {
        summary.in_count += 1;
        summary.in_weight += edge.weight().weight;
    }
    summary
}

/// Degree totals for `id`, or `None` for an unknown identity.
#[must_use]
pub fn degree_summary(graph: &InteractionGraph, id: &str) -> Option<DegreeSummary> {
    graph.node_index(id).map(|idx| summary_at(graph, idx))
}

/// Sum of the weights of every edge touching `id`. Zero for unknown ids.
#[must_use]
pub fn weighted_degree(graph: &InteractionGraph, id: &str) -> u64 {
    degree_summary(graph, id).map_or(0, |s| s.weighted_degree())
}

/// Composite influence score of `id`. Zero for unknown ids.
#[must_use]
pub fn influence_score(graph: &InteractionGraph, id: &str) -> f64 {
    degree_summary(graph, id).map_or(0.0, |s| s.influence())
}

// ---------------------------------------------------------------------------
// Rankings
// ---------------------------------------------------------------------------

/// One row of a ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedIdentity {
    pub identity: String,
    pub score: f64,
}

/// The `n` most influential identities, highest first.
#[must_use]
#[instrument(skip(graph))]
pub fn top_k(graph: &InteractionGraph, n: usize) -> Vec<RankedIdentity> {
    rank_by(graph, n, |s| s.influence())
}

/// The `n` identities with the highest weighted degree, highest first.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn top_weighted(graph: &InteractionGraph, n: usize) -> Vec<RankedIdentity> {
    rank_by(graph, n, |s| s.weighted_degree() as f64)
}

fn rank_by(
    graph: &InteractionGraph,
    n: usize,
    score: impl Fn(&DegreeSummary) -> f64,
) -> Vec<RankedIdentity> {
    let mut scored: Vec<(NodeIndex, f64)> = graph
        .graph()
        .node_indices()
        .map(|idx| (idx, score(&summary_at(graph, idx))))
        .collect();
    // Stable sort: equal scores keep insertion order.
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored
        .into_iter()
        .take(n)
        .filter_map(|(idx, score)| {
            graph.identity(idx).map(|id| RankedIdentity {
                identity: id.to_string(),
                score,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Density
// ---------------------------------------------------------------------------

/// Directed density `E / (V·(V−1))`; 0.0 for fewer than two vertices.
#[must_use]
pub fn density(graph: &InteractionGraph) -> f64 {
    compute_density(graph.vertex_count(), graph.edge_count())
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn compute_density(vertex_count: usize, edge_count: usize) -> f64 {
    if vertex_count < 2 {
        return 0.0_f64;
    }
    let max_edges = (vertex_count * (vertex_count - 1)) as f64;
    edge_count as f64 / max_edges
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
