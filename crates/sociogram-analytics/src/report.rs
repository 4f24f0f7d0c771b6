//! One-call analysis of a snapshot.
//!
//! [`analyze`] runs every analytic the crate offers with the settings from
//! an [`AnalysisConfig`] and collects the results in a serializable
//! [`AnalysisReport`]. Each analytic is still usable on its own; this is
//! only the composition the CLI prints.

use serde::Serialize;
use tracing::{info, instrument};

use sociogram_core::config::AnalysisConfig;
use sociogram_core::error::Degradation;
use sociogram_core::graph::InteractionGraph;

use crate::community::{Community, communities};
use crate::components::{NaturalGroup, natural_groups, overall_connectivity};
use crate::metrics::degree::{DegreeSummary, RankedIdentity, degree_summary, top_k, top_weighted};
use crate::metrics::fragmentation::{FragmentationPoint, bridging_scores, fragmentation_point};
use crate::proximity::{
    Proximate, closest_users, direct_neighbor_count, indirect_neighbor_count_within,
    non_interacting_closest,
};
use crate::stats::GraphStats;

/// Everything known about a single identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FocusReport {
    pub identity: String,
    pub degree: DegreeSummary,
    pub weighted_degree: u64,
    pub influence: f64,
    pub direct_neighbors: usize,
    pub indirect_neighbors: usize,
    pub closest: Vec<Proximate>,
    pub non_interacting_closest: Vec<Proximate>,
}

/// Aggregated results for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub content_hash: String,
    pub stats: GraphStats,
    pub overall_connectivity: f64,
    pub top_influencers: Vec<RankedIdentity>,
    pub top_weighted: Vec<RankedIdentity>,
    pub natural_groups: Vec<NaturalGroup>,
    pub communities: Vec<Community>,
    pub fragmentation: Option<FragmentationPoint>,
    pub bridging: Vec<RankedIdentity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus: Option<FocusReport>,
    pub degradations: Vec<Degradation>,
}

/// Analyze `graph` with `config`. `focus` adds a per-identity section when
/// the identity exists.
#[must_use]
#[instrument(skip(graph, config), fields(vertices = graph.vertex_count()))]
pub fn analyze(graph: &InteractionGraph, config: &AnalysisConfig, focus: Option<&str>) -> AnalysisReport {
    let mut degradations = Vec::new();
    if graph.is_empty() {
        degradations.push(Degradation::EmptyGraph);
    }

    let top_k_count = config.influence.top_k;
    let mut bridging = bridging_scores(graph);
    bridging.truncate(top_k_count);

    let report = AnalysisReport {
        content_hash: graph.content_hash().to_string(),
        stats: GraphStats::from_graph(graph),
        overall_connectivity: overall_connectivity(graph),
        top_influencers: top_k(graph, top_k_count),
        top_weighted: top_weighted(graph, top_k_count),
        natural_groups: natural_groups(graph),
        communities: communities(
            graph,
            config.community.max_passes,
            config.community.min_size,
        ),
        fragmentation: fragmentation_point(graph, &config.fragmentation),
        bridging,
        focus: focus.and_then(|id| focus_report(graph, config, id)),
        degradations,
    };

    info!(
        groups = report.natural_groups.len(),
        communities = report.communities.len(),
        fragmentation = report.fragmentation.is_some(),
        "analysis complete"
    );
    report
}

/// Per-identity details, or `None` for an unknown identity.
#[must_use]
pub fn focus_report(graph: &InteractionGraph, config: &AnalysisConfig, id: &str) -> Option<FocusReport> {
    let degree = degree_summary(graph, id)?;
    let limit = config.proximity.limit;
    Some(FocusReport {
        identity: id.to_string(),
        degree,
        weighted_degree: degree.weighted_degree(),
        influence: degree.influence(),
        direct_neighbors: direct_neighbor_count(graph, id),
        indirect_neighbors: indirect_neighbor_count_within(graph, id, config.proximity.indirect_depth),
        closest: closest_users(graph, id, limit),
        non_interacting_closest: non_interacting_closest(graph, id, limit),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
