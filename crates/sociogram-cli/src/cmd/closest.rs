//! `sg closest`: nearest contributors to one identity.

use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use sociogram_analytics::proximity::{
    Proximate, closest_users, direct_neighbor_count, indirect_neighbor_count_within,
    non_interacting_closest,
};

use super::{InputArgs, load, require_identity, require_positive};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct ClosestArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Contributor to measure from.
    pub id: String,

    /// Maximum rows (overrides `proximity.limit`).
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Skip people the contributor already interacts with directly.
    #[arg(long)]
    pub non_interacting: bool,
}

/// JSON payload for `sg closest`.
#[derive(Debug, Serialize)]
pub struct ClosestOutput {
    pub identity: String,
    pub direct_neighbors: usize,
    pub indirect_neighbors: usize,
    pub closest: Vec<Proximate>,
}

pub fn run_closest(args: &ClosestArgs, config_path: Option<&Path>, output: OutputMode) -> Result<()> {
    require_positive("--limit", args.limit, output)?;
    let loaded = load(&args.input, config_path, output)?;
    let graph = &loaded.graph;
    require_identity(graph, &args.id, output)?;

    let settings = &loaded.config.proximity;
    let limit = args.limit.unwrap_or(settings.limit);
    let closest = if args.non_interacting {
        non_interacting_closest(graph, &args.id, limit)
    } else {
        closest_users(graph, &args.id, limit)
    };

    let payload = ClosestOutput {
        identity: args.id.clone(),
        direct_neighbors: direct_neighbor_count(graph, &args.id),
        indirect_neighbors: indirect_neighbor_count_within(graph, &args.id, settings.indirect_depth),
        closest,
    };
    render_mode(output, &payload, render_text, render_pretty)
}

fn render_text(payload: &ClosestOutput, w: &mut dyn Write) -> io::Result<()> {
    for p in &payload.closest {
        writeln!(w, "{}\t{}", p.identity, p.distance)?;
    }
    Ok(())
}

fn render_pretty(payload: &ClosestOutput, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &format!("Closest to {}", payload.identity))?;
    pretty_kv(w, "Direct neighbors", payload.direct_neighbors.to_string())?;
    pretty_kv(w, "Indirect neighbors", payload.indirect_neighbors.to_string())?;
    writeln!(w)?;
    if payload.closest.is_empty() {
        writeln!(w, "  (nobody reachable)")?;
    }
    for p in &payload.closest {
        writeln!(w, "  {:<24} {} hop(s)", p.identity, p.distance)?;
    }
    Ok(())
}
