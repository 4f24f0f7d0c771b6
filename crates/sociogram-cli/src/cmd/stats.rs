//! `sg stats`: graph size, density and ingestion diagnostics.

use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use sociogram_analytics::stats::GraphStats;
use sociogram_core::IngestReport;
use sociogram_core::error::Stream;

use super::{InputArgs, load};
use crate::output::{OutputMode, percent, pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct StatsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Also list every identity with its activity.
    #[arg(long)]
    pub identities: bool,
}

#[derive(Debug, Serialize)]
pub struct IdentityRow {
    pub identity: String,
    pub activity: u64,
}

/// JSON payload for `sg stats`.
#[derive(Debug, Serialize)]
pub struct StatsOutput {
    pub content_hash: String,
    pub stats: GraphStats,
    pub ingest: IngestReport,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub identities: Vec<IdentityRow>,
}

const STREAMS: [Stream; 4] = [
    Stream::Issues,
    Stream::PullRequests,
    Stream::Comments,
    Stream::Reviews,
];

pub fn run_stats(args: &StatsArgs, config_path: Option<&Path>, output: OutputMode) -> Result<()> {
    let loaded = load(&args.input, config_path, output)?;
    let identities = if args.identities {
        let mut rows: Vec<IdentityRow> = loaded
            .graph
            .vertices()
            .map(|v| IdentityRow {
                identity: v.id.clone(),
                activity: v.activity,
            })
            .collect();
        rows.sort_by(|a, b| b.activity.cmp(&a.activity).then_with(|| a.identity.cmp(&b.identity)));
        rows
    } else {
        Vec::new()
    };

    let payload = StatsOutput {
        content_hash: loaded.graph.content_hash().to_string(),
        stats: GraphStats::from_graph(&loaded.graph),
        ingest: loaded.ingest,
        identities,
    };
    render_mode(output, &payload, render_text, render_pretty)
}

fn render_text(payload: &StatsOutput, w: &mut dyn Write) -> io::Result<()> {
    let s = &payload.stats;
    writeln!(w, "vertices\t{}", s.vertex_count)?;
    writeln!(w, "edges\t{}", s.edge_count)?;
    writeln!(w, "total_weight\t{}", s.total_weight)?;
    writeln!(w, "density\t{:.6}", s.density)?;
    writeln!(w, "natural_groups\t{}", s.scc_count)?;
    writeln!(w, "weak_components\t{}", s.weak_component_count)?;
    writeln!(w, "isolated\t{}", s.isolated_vertex_count)?;
    for stream in STREAMS {
        let c = payload.ingest.counts(stream);
        writeln!(w, "{stream}\t{}\t{}\t{}", c.seen, c.applied, c.degraded)?;
    }
    for row in &payload.identities {
        writeln!(w, "identity\t{}\t{}", row.identity, row.activity)?;
    }
    Ok(())
}

fn render_pretty(payload: &StatsOutput, w: &mut dyn Write) -> io::Result<()> {
    let s = &payload.stats;
    pretty_section(w, "Graph")?;
    pretty_kv(w, "Contributors", s.vertex_count.to_string())?;
    pretty_kv(w, "Interactions", s.edge_count.to_string())?;
    pretty_kv(w, "Total weight", s.total_weight.to_string())?;
    pretty_kv(w, "Density", format!("{:.6}", s.density))?;
    pretty_kv(w, "Connectivity", percent(s.connectivity))?;
    pretty_kv(w, "Natural groups", s.scc_count.to_string())?;
    pretty_kv(w, "Reciprocal groups", s.reciprocal_group_count.to_string())?;
    pretty_kv(w, "Weak components", s.weak_component_count.to_string())?;
    pretty_kv(w, "Isolated", s.isolated_vertex_count.to_string())?;
    pretty_kv(w, "Max in-degree", s.max_in_degree.to_string())?;
    pretty_kv(w, "Max out-degree", s.max_out_degree.to_string())?;
    pretty_kv(w, "Max weighted degree", s.max_weighted_degree.to_string())?;
    writeln!(w)?;

    pretty_section(w, "Ingestion")?;
    writeln!(w, "{:<16}{:>8}{:>10}{:>8}{:>10}", "stream", "seen", "applied", "self", "skipped")?;
    for stream in STREAMS {
        let c = payload.ingest.counts(stream);
        writeln!(
            w,
            "{:<16}{:>8}{:>10}{:>8}{:>10}",
            stream.to_string(),
            c.seen,
            c.applied,
            c.self_interactions,
            c.degraded
        )?;
    }

    if !payload.identities.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Identities")?;
        for row in &payload.identities {
            writeln!(w, "  {:<24} {}", row.identity, row.activity)?;
        }
    }
    Ok(())
}
