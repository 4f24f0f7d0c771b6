//! `sg analyze`: the full report for one or more event bundles.

use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use sociogram_analytics::{AnalysisReport, analyze};
use sociogram_analytics::report::FocusReport;
use sociogram_core::IngestReport;

use super::{InputArgs, load, require_identity, require_positive};
use crate::output::{OutputMode, percent, pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Length of every ranking (overrides `influence.top_k`).
    #[arg(long, value_name = "N")]
    pub top: Option<usize>,

    /// Add a per-identity section for this contributor.
    #[arg(long, value_name = "ID")]
    pub focus: Option<String>,

    /// Smallest community to report (overrides `community.min_size`).
    #[arg(long, value_name = "N")]
    pub min_group_size: Option<usize>,
}

/// JSON payload for `sg analyze`.
#[derive(Debug, Serialize)]
pub struct AnalyzeOutput {
    pub ingest: IngestReport,
    pub analysis: AnalysisReport,
}

pub fn run_analyze(args: &AnalyzeArgs, config_path: Option<&Path>, output: OutputMode) -> Result<()> {
    require_positive("--top", args.top, output)?;
    let mut loaded = load(&args.input, config_path, output)?;
    if let Some(top) = args.top {
        loaded.config.influence.top_k = top;
    }
    if let Some(min_size) = args.min_group_size {
        loaded.config.community.min_size = min_size;
    }
    if let Some(focus) = &args.focus {
        require_identity(&loaded.graph, focus, output)?;
    }

    let analysis = analyze(&loaded.graph, &loaded.config, args.focus.as_deref());
    let payload = AnalyzeOutput {
        ingest: loaded.ingest,
        analysis,
    };
    render_mode(output, &payload, render_text, render_pretty)
}

fn render_text(payload: &AnalyzeOutput, w: &mut dyn Write) -> io::Result<()> {
    let report = &payload.analysis;
    let stats = &report.stats;
    writeln!(w, "vertices\t{}", stats.vertex_count)?;
    writeln!(w, "edges\t{}", stats.edge_count)?;
    writeln!(w, "connectivity\t{:.2}", report.overall_connectivity)?;
    for row in &report.top_influencers {
        writeln!(w, "influencer\t{}\t{:.4}", row.identity, row.score)?;
    }
    for row in &report.top_weighted {
        writeln!(w, "weighted\t{}\t{}", row.identity, row.score)?;
    }
    for group in &report.natural_groups {
        writeln!(w, "group\t{:.2}\t{}", group.connectivity, group.members.join(","))?;
    }
    for community in &report.communities {
        writeln!(w, "community\t{}\t{}", community.label, community.members.join(","))?;
    }
    if let Some(point) = &report.fragmentation {
        writeln!(w, "fragmentation\t{}\t{}", point.identity, point.delta)?;
    }
    if let Some(focus) = &report.focus {
        write_focus_text(focus, w)?;
    }
    for degradation in payload.ingest.degradations.iter().chain(&report.degradations) {
        writeln!(w, "degraded\t{}\t{degradation}", degradation.kind())?;
    }
    Ok(())
}

fn write_focus_text(focus: &FocusReport, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "focus\t{}", focus.identity)?;
    writeln!(w, "focus.weighted_degree\t{}", focus.weighted_degree)?;
    writeln!(w, "focus.influence\t{:.4}", focus.influence)?;
    writeln!(w, "focus.direct\t{}", focus.direct_neighbors)?;
    writeln!(w, "focus.indirect\t{}", focus.indirect_neighbors)?;
    for p in &focus.closest {
        writeln!(w, "focus.closest\t{}\t{}", p.identity, p.distance)?;
    }
    Ok(())
}

fn render_pretty(payload: &AnalyzeOutput, w: &mut dyn Write) -> io::Result<()> {
    let report = &payload.analysis;
    let stats = &report.stats;

    pretty_section(w, "Graph")?;
    pretty_kv(w, "Contributors", stats.vertex_count.to_string())?;
    pretty_kv(w, "Interactions", stats.edge_count.to_string())?;
    pretty_kv(w, "Total weight", stats.total_weight.to_string())?;
    pretty_kv(w, "Connectivity", percent(report.overall_connectivity))?;
    pretty_kv(w, "Records ingested", payload.ingest.records_seen().to_string())?;
    pretty_kv(w, "Edges applied", payload.ingest.edges_applied().to_string())?;
    pretty_kv(w, "Snapshot", &report.content_hash)?;
    writeln!(w)?;

    pretty_section(w, "Top influencers")?;
    for (rank, row) in report.top_influencers.iter().enumerate() {
        writeln!(w, "{:>3}. {:<24} {:.4}", rank + 1, row.identity, row.score)?;
    }
    writeln!(w)?;

    pretty_section(w, "Most active")?;
    for (rank, row) in report.top_weighted.iter().enumerate() {
        writeln!(w, "{:>3}. {:<24} {}", rank + 1, row.identity, row.score)?;
    }
    writeln!(w)?;

    pretty_section(w, "Natural groups")?;
    for group in report.natural_groups.iter().filter(|g| g.len() > 1) {
        writeln!(w, "  {} ({})", group.members.join(", "), percent(group.connectivity))?;
    }
    let singletons = report.natural_groups.iter().filter(|g| g.len() == 1).count();
    writeln!(w, "  + {singletons} single-member groups")?;
    writeln!(w)?;

    pretty_section(w, "Communities")?;
    if report.communities.is_empty() {
        writeln!(w, "  (none)")?;
    }
    for community in &report.communities {
        writeln!(w, "  [{}] {}", community.label, community.members.join(", "))?;
    }
    writeln!(w)?;

    pretty_section(w, "Fragmentation")?;
    match &report.fragmentation {
        Some(point) => writeln!(
            w,
            "  Removing {} adds {} component(s)",
            point.identity, point.delta
        )?,
        None => writeln!(w, "  No single contributor splits the graph")?,
    }
    for row in &report.bridging {
        writeln!(w, "  bridge {:<24} {:.4}", row.identity, row.score)?;
    }

    if let Some(focus) = &report.focus {
        writeln!(w)?;
        pretty_section(w, &format!("Focus: {}", focus.identity))?;
        pretty_kv(w, "Weighted degree", focus.weighted_degree.to_string())?;
        pretty_kv(w, "Influence", format!("{:.4}", focus.influence))?;
        pretty_kv(w, "Direct neighbors", focus.direct_neighbors.to_string())?;
        pretty_kv(w, "Indirect neighbors", focus.indirect_neighbors.to_string())?;
        for p in &focus.closest {
            writeln!(w, "  {:<24} {} hop(s)", p.identity, p.distance)?;
        }
    }

    let degradations: Vec<_> = payload
        .ingest
        .degradations
        .iter()
        .chain(&report.degradations)
        .collect();
    if !degradations.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Warnings")?;
        for degradation in degradations {
            writeln!(w, "  {degradation}")?;
        }
    }
    Ok(())
}
