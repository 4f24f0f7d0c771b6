//! Label-propagation communities.
//!
//! # Overview
//!
//! A fast, approximate grouping over the undirected view of the graph. It
//! makes no optimality claim; it finds clusters of contributors who mostly
//! talk to each other.
//!
//! # Algorithm
//!
//! 1. Every vertex starts with its own label (its insertion index).
//! 2. Each pass visits vertices by descending undirected degree, ties by
//!    insertion order. For every label `c` carried by a neighbor:
//!
//!    ```text
//!    gain(c) = same(c) − 0.5 · (degree − same(c))
//!    ```
//!
//!    where `same(c)` counts neighbors labelled `c`. The vertex adopts the
//!    label with the strictly highest positive gain; ties go to the lowest
//!    label. Its current label is the incumbent: another label must beat
//!    the incumbent's gain strictly, otherwise the vertex stays. Updates
//!    apply immediately within the pass.
//! 3. Stop after `max_passes` passes or after a pass with no change.
//!
//! Everything is keyed on insertion order, so the result is identical
//! across runs. The assignment is memoized per `max_passes` value.

use std::collections::BTreeMap;
use std::sync::Arc;

use petgraph::graph::NodeIndex;
use serde::Serialize;
use tracing::{debug, instrument};

use sociogram_core::graph::InteractionGraph;

/// Final label of every vertex, indexed by `NodeIndex::index()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelAssignment {
    pub labels: Vec<usize>,
    /// Passes actually run.
    pub passes: usize,
    /// `true` when the last pass changed nothing.
    pub converged: bool,
}

/// A reported community.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Community {
    /// Label shared by the members.
    pub label: usize,
    /// Member identities, sorted lexicographically.
    pub members: Vec<String>,
}

/// Run (or fetch the memoized) label propagation.
#[must_use]
pub fn label_assignment(graph: &InteractionGraph, max_passes: usize) -> Arc<LabelAssignment> {
    let key = format!("communities:passes={max_passes}");
    graph
        .cache()
        .get_or_compute(&key, || propagate(graph, max_passes))
}

/// Communities of at least `min_size` members, largest first (ties by
/// lowest label). Smaller groups still exist in [`label_assignment`]; they
/// are only left out of this report.
#[must_use]
#[instrument(skip(graph))]
pub fn communities(graph: &InteractionGraph, max_passes: usize, min_size: usize) -> Vec<Community> {
    let assignment = label_assignment(graph, max_passes);

    let mut by_label: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    for (index, &label) in assignment.labels.iter().enumerate() {
        if let Some(id) = graph.identity(NodeIndex::new(index)) {
            by_label.entry(label).or_default().push(id.to_string());
        }
    }

    let mut found: Vec<Community> = by_label
        .into_iter()
        .filter(|(_, members)| members.len() >= min_size)
        .map(|(label, mut members)| {
            members.sort_unstable();
            Community { label, members }
        })
        .collect();
    // BTreeMap order already has labels ascending; stable sort keeps it.
    found.sort_by(|a, b| b.members.len().cmp(&a.members.len()));
    found
}

fn propagate(graph: &InteractionGraph, max_passes: usize) -> LabelAssignment {
    let n = graph.vertex_count();
    let mut labels: Vec<usize> = (0..n).collect();

    let mut order: Vec<NodeIndex> = graph.graph().node_indices().collect();
    order.sort_by(|a, b| {
        graph
            .undirected_neighbors(*b)
            .len()
            .cmp(&graph.undirected_neighbors(*a).len())
            .then_with(|| a.cmp(b))
    });

    let mut passes = 0;
    let mut converged = false;
    while passes < max_passes {
        passes += 1;
        let mut changed = 0_usize;
        for &v in &order {
            if let Some(label) = best_label(graph, &labels, v) {
                labels[v.index()] = label;
                changed += 1;
            }
        }
        debug!(pass = passes, changed, "label propagation pass");
        if changed == 0 {
            converged = true;
            break;
        }
    }

    LabelAssignment {
        labels,
        passes,
        converged,
    }
}

/// The label `v` should switch to, if any.
fn best_label(graph: &InteractionGraph, labels: &[usize], v: NodeIndex) -> Option<usize> {
    let neighbors = graph.undirected_neighbors(v);
    if neighbors.is_empty() {
        return None;
    }
    let mut tally: BTreeMap<usize, usize> = BTreeMap::new();
    for w in neighbors {
        *tally.entry(labels[w.index()]).or_insert(0) += 1;
    }
    choose_label(labels[v.index()], &tally, neighbors.len())
}

/// Pick from neighbor label counts. `own` wins every tie it takes part in;
/// among other labels the lowest id wins.
fn choose_label(own: usize, tally: &BTreeMap<usize, usize>, degree: usize) -> Option<usize> {
    let incumbent = tally.get(&own).map_or(0.0, |&same| gain(same, degree - same));
    let mut threshold = incumbent.max(0.0);
    let mut best = None;
    for (&label, &same) in tally {
        if label == own {
            continue;
        }
        let gain = gain(same, degree - same);
        if gain > threshold {
            threshold = gain;
            best = Some(label);
        }
    }
    best
}

#[allow(clippy::cast_precision_loss)]
fn gain(same: usize, different: usize) -> f64 {
    0.5_f64.mul_add(-(different as f64), same as f64)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
