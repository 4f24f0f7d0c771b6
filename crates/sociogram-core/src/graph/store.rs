//! Mutable interaction graph used during ingestion.
//!
//! # Overview
//!
//! [`GraphStore`] owns a [`petgraph`] directed graph whose nodes are
//! contributor identities ([`Vertex`]) and whose edges are accumulated
//! interactions ([`Interaction`]). An edge `A → B` means "an event authored
//! by A drew a response from B" (B closed, merged, reviewed, or commented on
//! A's thread).
//!
//! ## Edge Keying
//!
//! There is at most one edge per ordered `(source, target)` pair. A repeated
//! pair adds its weight to the existing edge and appends its label to the
//! edge's label list, so the label history is kept without splitting the
//! relationship strength across parallel edges.
//!
//! ## Storage
//!
//! petgraph's adjacency-list `Graph` gives per-vertex outgoing and incoming
//! enumeration in time proportional to the vertex's degree. Vertices are
//! never removed, so `NodeIndex` order is first-seen order; analytics rely
//! on that for deterministic tie-breaking.
//!
//! Call [`GraphStore::freeze`] once ingestion is done to obtain the
//! read-only [`InteractionGraph`] snapshot.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, HashMap};

use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
};
use serde::Serialize;
use tracing::trace;

use crate::graph::snapshot::InteractionGraph;
use crate::model::InteractionKind;

// ---------------------------------------------------------------------------
// Vertex / Interaction
// ---------------------------------------------------------------------------

/// A contributor identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vertex {
    /// Unique key (the contributor handle).
    pub id: String,
    /// Display label; defaults to the key.
    pub label: String,
    /// Sum of the weights of every interaction touching this vertex.
    pub activity: u64,
    /// Per-kind interaction counts, for diagnostics only.
    pub breakdown: BTreeMap<InteractionKind, u64>,
}

impl Vertex {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            label: id.to_string(),
            activity: 0,
            breakdown: BTreeMap::new(),
        }
    }
}

/// An accumulated directed interaction between two identities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interaction {
    /// Total weight; always ≥ 1.
    pub weight: u64,
    /// Labels of the events that contributed, in ingestion order.
    pub labels: Vec<String>,
}

impl Interaction {
    /// Label of the first event that created this edge.
    #[must_use]
    pub fn label(&self) -> &str {
        self.labels.first().map(String::as_str).unwrap_or_default()
    }
}

/// Result of an [`GraphStore::add_edge`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOutcome {
    Created,
    Accumulated,
    Rejected(RejectReason),
}

impl EdgeOutcome {
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Created | Self::Accumulated)
    }
}

/// Why an edge was not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    SelfLoop,
    EmptyEndpoint,
    ZeroWeight,
}

// ---------------------------------------------------------------------------
// GraphStore
// ---------------------------------------------------------------------------

/// Builder-side interaction graph.
#[derive(Debug, Default)]
pub struct GraphStore {
    graph: DiGraph<Vertex, Interaction>,
    node_map: HashMap<String, NodeIndex>,
}

impl GraphStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the vertex for `id`, creating it on first reference.
    ///
    /// Returns `None` for empty or whitespace-only ids, which never become
    /// vertices.
    pub fn add_vertex(&mut self, id: &str) -> Option<&Vertex> {
        let idx = self.ensure_vertex(id)?;
        self.graph.node_weight(idx)
    }

    /// Set the display label of an existing vertex.
    ///
    /// Returns `false` when the vertex does not exist.
    pub fn set_label(&mut self, id: &str, label: impl Into<String>) -> bool {
        let Some(&idx) = self.node_map.get(id) else {
            return false;
        };
        if let Some(vertex) = self.graph.node_weight_mut(idx) {
            vertex.label = label.into();
            return true;
        }
        false
    }

    /// Add `weight` to the `source → target` interaction.
    ///
    /// Self-interactions, blank endpoints, and zero weights are rejected
    /// without touching the graph. Otherwise both endpoints are created if
    /// needed, the edge is created or accumulated, and each endpoint's
    /// activity grows by `weight` exactly once.
    pub fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        weight: u64,
        label: impl Into<String>,
    ) -> EdgeOutcome {
        self.insert_edge(source, target, weight, label.into(), None)
    }

    /// Typed variant of [`add_edge`](Self::add_edge): the weight comes from
    /// the rule table and both endpoints' per-kind breakdown is updated.
    pub fn add_interaction(
        &mut self,
        source: &str,
        target: &str,
        kind: InteractionKind,
        label: impl Into<String>,
    ) -> EdgeOutcome {
        self.insert_edge(source, target, kind.weight(), label.into(), Some(kind))
    }

    fn insert_edge(
        &mut self,
        source: &str,
        target: &str,
        weight: u64,
        label: String,
        kind: Option<InteractionKind>,
    ) -> EdgeOutcome {
        if source.trim().is_empty() || target.trim().is_empty() {
            return EdgeOutcome::Rejected(RejectReason::EmptyEndpoint);
        }
        if source == target {
            return EdgeOutcome::Rejected(RejectReason::SelfLoop);
        }
        if weight == 0 {
            return EdgeOutcome::Rejected(RejectReason::ZeroWeight);
        }

        let (Some(src), Some(dst)) = (self.ensure_vertex(source), self.ensure_vertex(target))
        else {
            return EdgeOutcome::Rejected(RejectReason::EmptyEndpoint);
        };

        for idx in [src, dst] {
            if let Some(vertex) = self.graph.node_weight_mut(idx) {
                vertex.activity += weight;
                if let Some(kind) = kind {
                    *vertex.breakdown.entry(kind).or_insert(0) += 1;
                }
            }
        }

        let outcome = match self.graph.find_edge(src, dst) {
            Some(edge) => {
                if let Some(interaction) = self.graph.edge_weight_mut(edge) {
                    interaction.weight += weight;
                    interaction.labels.push(label);
                }
                EdgeOutcome::Accumulated
            }
            None => {
                self.graph.add_edge(
                    src,
                    dst,
                    Interaction {
                        weight,
                        labels: vec![label],
                    },
                );
                EdgeOutcome::Created
            }
        };
        trace!(source, target, weight, ?outcome, "edge applied");
        outcome
    }

    fn ensure_vertex(&mut self, id: &str) -> Option<NodeIndex> {
        if id.trim().is_empty() {
            return None;
        }
        if let Some(&idx) = self.node_map.get(id) {
            return Some(idx);
        }
        let idx = self.graph.add_node(Vertex::new(id));
        self.node_map.insert(id.to_string(), idx);
        Some(idx)
    }

    /// Return the number of identities.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of distinct `(source, target)` interactions.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[must_use]
    pub fn vertex(&self, id: &str) -> Option<&Vertex> {
        self.node_map
            .get(id)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    /// Accumulated activity weight of `id`.
    #[must_use]
    pub fn vertex_weight(&self, id: &str) -> Option<u64> {
        self.vertex(id).map(|v| v.activity)
    }

    /// Accumulated weight of the `source → target` interaction.
    #[must_use]
    pub fn edge_weight(&self, source: &str, target: &str) -> Option<u64> {
        edge_between(&self.graph, &self.node_map, source, target).map(|i| i.weight)
    }

    /// Outgoing neighbors of `id` with edge weights.
    #[must_use]
    pub fn neighbors_out(&self, id: &str) -> Vec<(&str, u64)> {
        weighted_neighbors(&self.graph, &self.node_map, id, Direction::Outgoing)
    }

    /// Incoming neighbors of `id` with edge weights.
    #[must_use]
    pub fn neighbors_in(&self, id: &str) -> Vec<(&str, u64)> {
        weighted_neighbors(&self.graph, &self.node_map, id, Direction::Incoming)
    }

    /// End ingestion and produce the immutable snapshot.
    #[must_use]
    pub fn freeze(self) -> InteractionGraph {
        InteractionGraph::from_parts(self.graph, self.node_map)
    }
}

// ---------------------------------------------------------------------------
// Shared read helpers
// ---------------------------------------------------------------------------

pub(crate) fn edge_between<'g>(
    graph: &'g DiGraph<Vertex, Interaction>,
    node_map: &HashMap<String, NodeIndex>,
    source: &str,
    target: &str,
) -> Option<&'g Interaction> {
    let src = *node_map.get(source)?;
    let dst = *node_map.get(target)?;
    graph
        .find_edge(src, dst)
        .and_then(|edge| graph.edge_weight(edge))
}

/// Neighbors in the given direction, ordered by first-seen vertex order.
pub(crate) fn weighted_neighbors<'g>(
    graph: &'g DiGraph<Vertex, Interaction>,
    node_map: &HashMap<String, NodeIndex>,
    id: &str,
    direction: Direction,
) -> Vec<(&'g str, u64)> {
    let Some(&idx) = node_map.get(id) else {
        return Vec::new();
    };
    let mut neighbors: Vec<(NodeIndex, u64)> = graph
        .edges_directed(idx, direction)
        .map(|edge| {
            let other = match direction {
                Direction::Outgoing => edge.target(),
                Direction::Incoming => edge.source(),
            };
            (other, edge.weight().weight)
        })
        .collect();
    neighbors.sort_unstable_by_key(|(other, _)| *other);
    neighbors
        .into_iter()
        .filter_map(|(other, weight)| graph.node_weight(other).map(|v| (v.id.as_str(), weight)))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
