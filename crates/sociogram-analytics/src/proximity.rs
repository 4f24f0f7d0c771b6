//! Shortest-path proximity over the undirected interaction graph.
//!
//! Distances are hop counts along forward ∪ reverse edges. Neighbors are
//! expanded in vertex insertion order, so BFS discovery order, and with it
//! every "closest" list, is deterministic.
//!
//! Unknown identities yield `0` or an empty list.

use std::collections::VecDeque;

use fixedbitset::FixedBitSet;
use petgraph::graph::NodeIndex;
use serde::Serialize;
use tracing::instrument;

use sociogram_core::graph::InteractionGraph;

/// Depth bound used by [`indirect_neighbor_count`].
pub const DEFAULT_INDIRECT_DEPTH: usize = 3;

/// An identity at a given hop distance from the query vertex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Proximate {
    pub identity: String,
    pub distance: usize,
}

/// BFS from `source` over undirected adjacency.
///
/// Returns `(vertex, distance)` in discovery order, excluding `source`.
/// `max_depth` bounds the distance; `None` explores the whole component.
#[must_use]
pub fn bfs_distances(
    graph: &InteractionGraph,
    source: NodeIndex,
    max_depth: Option<usize>,
) -> Vec<(NodeIndex, usize)> {
    let mut seen = FixedBitSet::with_capacity(graph.vertex_count());
    if source.index() >= graph.vertex_count() {
        return Vec::new();
    }
    seen.insert(source.index());

    let mut order = Vec::new();
    let mut queue: VecDeque<(NodeIndex, usize)> = VecDeque::new();
    queue.push_back((source, 0));
    while let Some((node, dist)) = queue.pop_front() {
        if max_depth.is_some_and(|limit| dist >= limit) {
            continue;
        }
        for &next in graph.undirected_neighbors(node) {
            if seen.contains(next.index()) {
                continue;
            }
            seen.insert(next.index());
            order.push((next, dist + 1));
            queue.push_back((next, dist + 1));
        }
    }
    order
}

/// Number of distinct identities `id` interacted with in either direction.
#[must_use]
pub fn direct_neighbor_count(graph: &InteractionGraph, id: &str) -> usize {
    graph
        .node_index(id)
        .map_or(0, |idx| graph.undirected_neighbors(idx).len())
}

/// Identities at distance 2 or 3 from `id`.
#[must_use]
pub fn indirect_neighbor_count(graph: &InteractionGraph, id: &str) -> usize {
    indirect_neighbor_count_within(graph, id, DEFAULT_INDIRECT_DEPTH)
}

/// Identities at distance `2..=max_depth` from `id`.
#[must_use]
pub fn indirect_neighbor_count_within(graph: &InteractionGraph, id: &str, max_depth: usize) -> usize {
    graph.node_index(id).map_or(0, |idx| {
        bfs_distances(graph, idx, Some(max_depth))
            .into_iter()
            .filter(|(_, d)| *d >= 2)
            .count()
    })
}

/// The `n` identities nearest to `id`, in BFS discovery order.
/// Unreachable identities are never listed.
#[must_use]
#[instrument(skip(graph))]
pub fn closest_users(graph: &InteractionGraph, id: &str, n: usize) -> Vec<Proximate> {
    nearest(graph, id, n, 1)
}

/// Like [`closest_users`] but skipping direct neighbors: the nearest
/// people `id` has never interacted with.
#[must_use]
#[instrument(skip(graph))]
pub fn non_interacting_closest(graph: &InteractionGraph, id: &str, n: usize) -> Vec<Proximate> {
    nearest(graph, id, n, 2)
}

fn nearest(graph: &InteractionGraph, id: &str, n: usize, min_distance: usize) -> Vec<Proximate> {
    let Some(source) = graph.node_index(id) else {
        return Vec::new();
    };
    bfs_distances(graph, source, None)
        .into_iter()
        .filter(|(_, d)| *d >= min_distance)
        .take(n)
        .filter_map(|(idx, distance)| {
            graph.identity(idx).map(|identity| Proximate {
                identity: identity.to_string(),
                distance,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
