//! `sg groups`: natural groups (strongly connected components) or
//! label-propagation communities.

use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use clap::{Args, ValueEnum};
use serde::Serialize;

use sociogram_analytics::community::{communities, label_assignment};
use sociogram_analytics::components::{natural_groups, overall_connectivity};

use super::{InputArgs, load};
use crate::output::{OutputMode, percent, pretty_section, render_mode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GroupKind {
    /// Strongly connected components.
    Scc,
    /// Label-propagation communities.
    Communities,
}

#[derive(Args, Debug)]
pub struct GroupsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[arg(long, value_enum, default_value = "scc")]
    pub kind: GroupKind,

    /// Hide groups smaller than this. Defaults to `community.min_size` for
    /// communities and 1 for components.
    #[arg(long, value_name = "N")]
    pub min_size: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct GroupRow {
    pub members: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connectivity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<usize>,
}

/// JSON payload for `sg groups`.
#[derive(Debug, Serialize)]
pub struct GroupsOutput {
    pub kind: &'static str,
    pub groups: Vec<GroupRow>,
    /// Set for `scc` only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_connectivity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converged: Option<bool>,
}

pub fn run_groups(args: &GroupsArgs, config_path: Option<&Path>, output: OutputMode) -> Result<()> {
    let loaded = load(&args.input, config_path, output)?;
    let graph = &loaded.graph;

    let payload = match args.kind {
        GroupKind::Scc => {
            let min_size = args.min_size.unwrap_or(1);
            GroupsOutput {
                kind: "scc",
                groups: natural_groups(graph)
                    .into_iter()
                    .filter(|g| g.len() >= min_size)
                    .map(|g| GroupRow {
                        members: g.members,
                        connectivity: Some(g.connectivity),
                        label: None,
                    })
                    .collect(),
                overall_connectivity: Some(overall_connectivity(graph)),
                passes: None,
                converged: None,
            }
        }
        GroupKind::Communities => {
            let settings = &loaded.config.community;
            let min_size = args.min_size.unwrap_or(settings.min_size);
            let assignment = label_assignment(graph, settings.max_passes);
            GroupsOutput {
                kind: "communities",
                groups: communities(graph, settings.max_passes, min_size)
                    .into_iter()
                    .map(|c| GroupRow {
                        members: c.members,
                        connectivity: None,
                        label: Some(c.label),
                    })
                    .collect(),
                overall_connectivity: None,
                passes: Some(assignment.passes),
                converged: Some(assignment.converged),
            }
        }
    };

    render_mode(output, &payload, render_text, render_pretty)
}

fn render_text(payload: &GroupsOutput, w: &mut dyn Write) -> io::Result<()> {
    for group in &payload.groups {
        let lead = match (group.label, group.connectivity) {
            (Some(label), _) => label.to_string(),
            (None, Some(connectivity)) => format!("{connectivity:.2}"),
            (None, None) => String::new(),
        };
        writeln!(w, "{lead}\t{}\t{}", group.members.len(), group.members.join(","))?;
    }
    Ok(())
}

fn render_pretty(payload: &GroupsOutput, w: &mut dyn Write) -> io::Result<()> {
    let heading = match payload.kind {
        "scc" => "Natural groups",
        _ => "Communities",
    };
    pretty_section(w, heading)?;
    if payload.groups.is_empty() {
        writeln!(w, "  (none)")?;
    }
    for group in &payload.groups {
        match (group.label, group.connectivity) {
            (Some(label), _) => writeln!(w, "  [{label}] {}", group.members.join(", "))?,
            (None, Some(c)) => writeln!(w, "  {} ({})", group.members.join(", "), percent(c))?,
            (None, None) => writeln!(w, "  {}", group.members.join(", "))?,
        }
    }
    if let Some(c) = payload.overall_connectivity {
        writeln!(w)?;
        writeln!(w, "Overall connectivity: {}", percent(c))?;
    }
    if let (Some(passes), Some(converged)) = (payload.passes, payload.converged) {
        writeln!(w)?;
        let state = if converged { "converged" } else { "pass limit reached" };
        writeln!(w, "{passes} pass(es), {state}")?;
    }
    Ok(())
}
