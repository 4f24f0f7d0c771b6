//! The immutable interaction graph consumed by analytics.
//!
//! [`InteractionGraph`] is produced by [`GraphStore::freeze`] and offers
//! only shared (`&self`) access. Alongside the directed graph it keeps:
//!
//! - an undirected adjacency list (forward ∪ reverse edges, deduplicated,
//!   in first-seen vertex order) used by every proximity and
//!   component query;
//! - a BLAKE3 content hash of the weighted edge set, so callers can tell
//!   whether two snapshots describe the same interactions;
//! - a [`DerivedCache`] for memoized analytics. It is created empty with
//!   the snapshot and dropped with it.
//!
//! [`GraphStore::freeze`]: crate::graph::GraphStore::freeze

#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;

use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
};

use crate::graph::cache::DerivedCache;
use crate::graph::store::{Interaction, Vertex, edge_between, weighted_neighbors};

/// Read-only snapshot of the interaction graph.
#[derive(Debug)]
pub struct InteractionGraph {
    graph: DiGraph<Vertex, Interaction>,
    node_map: HashMap<String, NodeIndex>,
    undirected: Vec<Vec<NodeIndex>>,
    content_hash: String,
    cache: DerivedCache,
}

impl InteractionGraph {
    pub(crate) fn from_parts(
        graph: DiGraph<Vertex, Interaction>,
        node_map: HashMap<String, NodeIndex>,
    ) -> Self {
        let undirected = build_undirected(&graph);
        let content_hash = compute_edge_hash(&graph);
        Self {
            graph,
            node_map,
            undirected,
            content_hash,
            cache: DerivedCache::new(),
        }
    }

    /// The underlying petgraph graph. Node indices are dense and in
    /// first-seen order.
    #[must_use]
    pub fn graph(&self) -> &DiGraph<Vertex, Interaction> {
        &self.graph
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Look up the `NodeIndex` for an identity.
    #[must_use]
    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    /// Return the identity key for a node.
    #[must_use]
    pub fn identity(&self, idx: NodeIndex) -> Option<&str> {
        self.graph.node_weight(idx).map(|v| v.id.as_str())
    }

    #[must_use]
    pub fn vertex(&self, id: &str) -> Option<&Vertex> {
        self.node_index(id)
            .and_then(|idx| self.graph.node_weight(idx))
    }

    /// Vertices in first-seen order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.graph.node_weights()
    }

    /// Identity keys in first-seen order.
    pub fn identities(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(|v| v.id.as_str())
    }

    #[must_use]
    pub fn vertex_weight(&self, id: &str) -> Option<u64> {
        self.vertex(id).map(|v| v.activity)
    }

    #[must_use]
    pub fn edge(&self, source: &str, target: &str) -> Option<&Interaction> {
        edge_between(&self.graph, &self.node_map, source, target)
    }

    #[must_use]
    pub fn edge_weight(&self, source: &str, target: &str) -> Option<u64> {
        self.edge(source, target).map(|i| i.weight)
    }

    /// Every interaction as `(source, target, interaction)`, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &Interaction)> {
        self.graph.edge_references().filter_map(|edge| {
            let source = self.identity(edge.source())?;
            let target = self.identity(edge.target())?;
            Some((source, target, edge.weight()))
        })
    }

    #[must_use]
    pub fn neighbors_out(&self, id: &str) -> Vec<(&str, u64)> {
        weighted_neighbors(&self.graph, &self.node_map, id, Direction::Outgoing)
    }

    #[must_use]
    pub fn neighbors_in(&self, id: &str) -> Vec<(&str, u64)> {
        weighted_neighbors(&self.graph, &self.node_map, id, Direction::Incoming)
    }

    /// Distinct neighbors of `idx` ignoring edge direction, in ascending
    /// index order. Never contains `idx` itself.
    #[must_use]
    pub fn undirected_neighbors(&self, idx: NodeIndex) -> &[NodeIndex] {
        self.undirected
            .get(idx.index())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// BLAKE3 hash of the sorted weighted edge list.
    #[must_use]
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    /// Memo table for results derived from this snapshot.
    #[must_use]
    pub fn cache(&self) -> &DerivedCache {
        &self.cache
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn build_undirected(graph: &DiGraph<Vertex, Interaction>) -> Vec<Vec<NodeIndex>> {
    let mut adjacency: Vec<Vec<NodeIndex>> = vec![Vec::new(); graph.node_count()];
    for edge in graph.edge_references() {
        let (a, b) = (edge.source(), edge.target());
        if a == b {
            continue;
        }
        adjacency[a.index()].push(b);
        adjacency[b.index()].push(a);
    }
    for neighbors in &mut adjacency {
        neighbors.sort_unstable();
        neighbors.dedup();
    }
    adjacency
}

fn compute_edge_hash(graph: &DiGraph<Vertex, Interaction>) -> String {
    let mut edges: Vec<(&str, &str, u64)> = graph
        .edge_references()
        .filter_map(|edge| {
            let source = graph.node_weight(edge.source())?;
            let target = graph.node_weight(edge.target())?;
            Some((source.id.as_str(), target.id.as_str(), edge.weight().weight))
        })
        .collect();
    edges.sort_unstable();

    let mut hasher = blake3::Hasher::new();
    for (source, target, weight) in edges {
        hasher.update(source.as_bytes());
        hasher.update(b"\x00");
        hasher.update(target.as_bytes());
        hasher.update(b"\x00");
        hasher.update(&weight.to_le_bytes());
    }
    format!("blake3:{}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
