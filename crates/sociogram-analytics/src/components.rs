//! Strongly connected components ("natural groups") and connectivity.
//!
//! # Algorithm
//!
//! Kosaraju's two-pass algorithm, both passes driven by explicit stacks so
//! deep chains cannot overflow the call stack:
//!
//! 1. DFS over forward edges, recording vertices in order of completion.
//! 2. DFS over reverse edges in reverse completion order; each tree is one
//!    component.
//!
//! The partition is memoized in the snapshot's derived cache under the
//! `"scc"` key.
//!
//! # Ordering
//!
//! Groups are sorted by descending size; equal sizes put the group with
//! the earliest-inserted member first. Members are reported in
//! lexicographic order.

use std::sync::Arc;

use fixedbitset::FixedBitSet;
use petgraph::{Direction, graph::NodeIndex};
use serde::Serialize;
use tracing::{debug, instrument};

use sociogram_core::graph::InteractionGraph;

use crate::metrics::degree::density;

const SCC_CACHE_KEY: &str = "scc";

/// A strongly connected component with its internal connectivity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NaturalGroup {
    /// Member identities, sorted lexicographically.
    pub members: Vec<String>,
    /// Percentage of ordered member pairs joined by a direct edge.
    pub connectivity: f64,
}

impl NaturalGroup {
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// The SCC partition as node indices: groups in report order, members in
/// insertion order. Every vertex appears in exactly one group.
#[must_use]
pub fn strongly_connected_components(graph: &InteractionGraph) -> Arc<Vec<Vec<NodeIndex>>> {
    graph
        .cache()
        .get_or_compute(SCC_CACHE_KEY, || kosaraju(graph))
}

/// SCCs resolved to identities, each with its connectivity percentage.
#[must_use]
#[instrument(skip(graph))]
pub fn natural_groups(graph: &InteractionGraph) -> Vec<NaturalGroup> {
    let partition = strongly_connected_components(graph);
    partition
        .iter()
        .map(|members| {
            let mut names: Vec<String> = members
                .iter()
                .filter_map(|&idx| graph.identity(idx).map(str::to_string))
                .collect();
            names.sort_unstable();
            NaturalGroup {
                members: names,
                connectivity: group_connectivity(graph, members),
            }
        })
        .collect()
}

/// Internal connectivity of a vertex set as a percentage.
///
/// Counts ordered pairs `(u, v)`, `u ≠ v`, both in `members`, with an edge
/// `u → v`, divided by `n·(n−1)`. A set of zero or one vertices is 100%.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn group_connectivity(graph: &InteractionGraph, members: &[NodeIndex]) -> f64 {
    let n = members.len();
    if n <= 1 {
        return 100.0;
    }
    let mut inside = FixedBitSet::with_capacity(graph.vertex_count());
    for idx in members {
        inside.insert(idx.index());
    }
    let g = graph.graph();
    let linked = members
        .iter()
        .map(|&u| {
            g.neighbors_directed(u, Direction::Outgoing)
                .filter(|v| *v != u && inside.contains(v.index()))
                .count()
        })
        .sum::<usize>();
    linked as f64 / (n * (n - 1)) as f64 * 100.0
}

/// Whole-graph connectivity: density as a percentage.
#[must_use]
pub fn overall_connectivity(graph: &InteractionGraph) -> f64 {
    density(graph) * 100.0
}

// ---------------------------------------------------------------------------
// Kosaraju
// ---------------------------------------------------------------------------

fn kosaraju(graph: &InteractionGraph) -> Vec<Vec<NodeIndex>> {
    let g = graph.graph();
    let n = g.node_count();
    let forward = adjacency(graph, Direction::Outgoing);
    let reverse = adjacency(graph, Direction::Incoming);

    // Pass 1: completion order over forward edges.
    let mut visited = FixedBitSet::with_capacity(n);
    let mut finished: Vec<usize> = Vec::with_capacity(n);
    let mut stack: Vec<(usize, usize)> = Vec::new();
    for start in 0..n {
        if visited.contains(start) {
            continue;
        }
        visited.insert(start);
        stack.push((start, 0));
        while let Some((node, cursor)) = stack.last_mut() {
            if let Some(&next) = forward[*node].get(*cursor) {
                *cursor += 1;
                if !visited.contains(next) {
                    visited.insert(next);
                    stack.push((next, 0));
                }
            } else {
                finished.push(*node);
                stack.pop();
            }
        }
    }

    // Pass 2: collect trees over reverse edges.
    let mut assigned = FixedBitSet::with_capacity(n);
    let mut groups: Vec<Vec<NodeIndex>> = Vec::new();
    let mut pending: Vec<usize> = Vec::new();
    for &root in finished.iter().rev() {
        if assigned.contains(root) {
            continue;
        }
        assigned.insert(root);
        pending.push(root);
        let mut members = Vec::new();
        while let Some(node) = pending.pop() {
            members.push(NodeIndex::new(node));
            for &prev in &reverse[node] {
                if !assigned.contains(prev) {
                    assigned.insert(prev);
                    pending.push(prev);
                }
            }
        }
        members.sort_unstable();
        groups.push(members);
    }

    groups.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a[0].cmp(&b[0])));
    debug!(vertices = n, groups = groups.len(), "strongly connected components");
    groups
}

fn adjacency(graph: &InteractionGraph, direction: Direction) -> Vec<Vec<usize>> {
    let g = graph.graph();
    g.node_indices()
        .map(|idx| {
            let mut next: Vec<usize> = g
                .neighbors_directed(idx, direction)
                .map(NodeIndex::index)
                .collect();
            next.sort_unstable();
            next
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
