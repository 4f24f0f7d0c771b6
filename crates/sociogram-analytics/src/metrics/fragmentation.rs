//! Approximate fragmentation analysis.
//!
//! # Overview
//!
//! Exact betweenness is out of reach for large interaction graphs, so this
//! module answers a cheaper question: *which single contributor, if they
//! left, would split the community into the most pieces?*
//!
//! ```text
//! activity weights ──percentile──▶ candidates (insertion order, capped)
//!        │
//!        ▼  for each candidate c
//! components(V \ {c}) − components(V)   (undirected)
//!        │
//!        ▼
//! largest strictly positive delta (first found on ties) or none
//! ```
//!
//! Two supplementary signals come along:
//!
//! - [`weak_component_count`]: number of undirected components.
//! - [`bridging_scores`]: `degree · (1 − local clustering)`. A contributor
//!   whose neighbors do not talk to each other scores high.

use fixedbitset::FixedBitSet;
use petgraph::graph::NodeIndex;
use serde::Serialize;
use tracing::{debug, instrument};

use sociogram_core::config::FragmentationConfig;
use sociogram_core::graph::InteractionGraph;

use crate::metrics::degree::RankedIdentity;

/// The vertex whose removal increases the component count the most.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FragmentationPoint {
    pub identity: String,
    /// Components after removal minus components before.
    pub delta: usize,
}

/// Find the most fragmenting vertex, if removing any candidate splits the
/// graph at all.
///
/// Returns `None` for graphs with fewer than three vertices.
#[must_use]
#[instrument(skip(graph, options), fields(vertices = graph.vertex_count()))]
pub fn fragmentation_point(
    graph: &InteractionGraph,
    options: &FragmentationConfig,
) -> Option<FragmentationPoint> {
    if graph.vertex_count() < 3 {
        return None;
    }

    let candidates = candidates(graph, options);
    let baseline = count_components(graph, None);
    debug!(
        candidates = candidates.len(),
        baseline, "fragmentation scan"
    );

    let mut best: Option<(NodeIndex, usize)> = None;
    for idx in candidates {
        let after = count_components(graph, Some(idx));
        let Some(delta) = after.checked_sub(baseline).filter(|d| *d > 0) else {
            continue;
        };
        if best.is_none_or(|(_, top)| delta > top) {
            best = Some((idx, delta));
        }
    }

    best.and_then(|(idx, delta)| {
        graph.identity(idx).map(|id| FragmentationPoint {
            identity: id.to_string(),
            delta,
        })
    })
}

/// Vertices whose activity reaches the configured percentile, in insertion
/// order, capped at `max_candidates` unless the scan is exhaustive.
#[must_use]
pub fn candidates(graph: &InteractionGraph, options: &FragmentationConfig) -> Vec<NodeIndex> {
    let mut weights: Vec<u64> = graph.vertices().map(|v| v.activity).collect();
    if weights.is_empty() {
        return Vec::new();
    }
    weights.sort_unstable();
    let cutoff = percentile(&weights, options.percentile);

    let qualifying = graph.graph().node_indices().filter(|&idx| {
        graph
            .graph()
            .node_weight(idx)
            .is_some_and(|v| activity_at_least(v.activity, cutoff))
    });
    if options.exhaustive {
        qualifying.collect()
    } else {
        qualifying.take(options.max_candidates).collect()
    }
}

#[allow(clippy::cast_precision_loss)]
fn activity_at_least(activity: u64, cutoff: f64) -> bool {
    activity as f64 >= cutoff
}

/// Linear-interpolation percentile of an ascending slice. `p` is clamped to
/// `[0, 100]`; an empty slice yields 0.0.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn percentile(sorted: &[u64], p: f64) -> f64 {
    let Some(&last) = sorted.last() else {
        return 0.0;
    };
    if sorted.len() == 1 {
        return last as f64;
    }
    let rank = p.clamp(0.0, 100.0) / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let low = sorted[lo] as f64;
    let high = sorted[hi] as f64;
    (high - low).mul_add(rank - lo as f64, low)
}

/// Number of undirected connected components.
#[must_use]
pub fn weak_component_count(graph: &InteractionGraph) -> usize {
    count_components(graph, None)
}

/// Undirected component count, optionally pretending `removed` is absent.
fn count_components(graph: &InteractionGraph, removed: Option<NodeIndex>) -> usize {
    let n = graph.vertex_count();
    let mut visited = FixedBitSet::with_capacity(n);
    if let Some(idx) = removed {
        visited.insert(idx.index());
    }

    let mut count = 0;
    let mut stack: Vec<NodeIndex> = Vec::new();
    for start in graph.graph().node_indices() {
        if visited.contains(start.index()) {
            continue;
        }
        count += 1;
        visited.insert(start.index());
        stack.push(start);
        while let Some(node) = stack.pop() {
            for &next in graph.undirected_neighbors(node) {
                if !visited.contains(next.index()) {
                    visited.insert(next.index());
                    stack.push(next);
                }
            }
        }
    }
    count
}

/// Local clustering coefficient over the undirected view: the fraction of
/// neighbor pairs that are themselves adjacent. Zero below two neighbors.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn local_clustering(graph: &InteractionGraph, idx: NodeIndex) -> f64 {
    let neighbors = graph.undirected_neighbors(idx);
    let k = neighbors.len();
    if k < 2 {
        return 0.0;
    }
    let mut links = 0_usize;
    for (i, &a) in neighbors.iter().enumerate() {
        let adjacent = graph.undirected_neighbors(a);
        links += neighbors[i + 1..]
            .iter()
            .filter(|&&b| adjacent.binary_search(&b).is_ok())
            .count();
    }
    links as f64 / (k * (k - 1) / 2) as f64
}

/// `degree · (1 − clustering)` for every vertex, highest first, ties in
/// insertion order.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn bridging_scores(graph: &InteractionGraph) -> Vec<RankedIdentity> {
    let mut scored: Vec<RankedIdentity> = graph
        .graph()
        .node_indices()
        .filter_map(|idx| {
            let degree = graph.undirected_neighbors(idx).len() as f64;
            let score = degree * (1.0 - local_clustering(graph, idx));
            graph.identity(idx).map(|id| RankedIdentity {
                identity: id.to_string(),
                score,
            })
        })
        .collect();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
