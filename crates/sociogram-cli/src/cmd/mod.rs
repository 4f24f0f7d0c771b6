pub mod analyze;
pub mod closest;
pub mod completions;
pub mod groups;
pub mod stats;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use tracing::{debug, warn};

use sociogram_core::config::resolve_config;
use sociogram_core::{AnalysisConfig, ErrorCode, EventBatch, GraphStore, IngestReport, Ingestor, InteractionGraph};

use crate::output::{CliError, OutputMode, fail};

/// Event input shared by every analysis command.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Exported event bundle (JSON). Repeat to merge several exports.
    #[arg(short, long = "events", value_name = "FILE", required = true)]
    pub events: Vec<PathBuf>,
}

/// A loaded graph with the settings and diagnostics that produced it.
pub struct Loaded {
    pub config: AnalysisConfig,
    pub graph: InteractionGraph,
    pub ingest: IngestReport,
}

/// Resolve config, read every bundle, and build the snapshot.
///
/// Failures are rendered before being returned.
pub fn load(input: &InputArgs, config_path: Option<&Path>, output: OutputMode) -> Result<Loaded> {
    let cwd = std::env::current_dir()?;
    let config = resolve_config(config_path, &cwd)
        .map_err(|e| fail(output, &CliError::from_code(ErrorCode::ConfigParseError, format!("{e:#}"))))?;

    let mut batch = EventBatch::default();
    for path in &input.events {
        batch.extend(read_bundle(path, output)?);
    }

    let mut store = GraphStore::new();
    let ingest = Ingestor::new(config.ingest.unknown_identity.clone()).ingest(&mut store, &batch);
    if !ingest.degradations.is_empty() {
        warn!(
            missing_columns = ingest.missing_columns(),
            unresolved_references = ingest.unresolved_references(),
            malformed_records = ingest.malformed_records(),
            malformed_values = ingest.malformed_values(),
            "some records were skipped or only partly readable"
        );
    }
    let graph = store.freeze();
    debug!(hash = graph.content_hash(), "snapshot ready");

    Ok(Loaded { config, graph, ingest })
}

fn read_bundle(path: &Path, output: OutputMode) -> Result<EventBatch> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        let message = if e.kind() == io::ErrorKind::NotFound {
            format!("event file not found: {}", path.display())
        } else {
            format!("cannot read {}: {e}", path.display())
        };
        fail(output, &CliError::from_code(ErrorCode::InputNotFound, message))
    })?;

    let batch = EventBatch::from_json(&text).map_err(|e| {
        fail(
            output,
            &CliError::from_code(ErrorCode::InputParseError, format!("{}: {e}", path.display())),
        )
    })?;
    debug!(path = %path.display(), records = batch.len(), "read event bundle");
    Ok(batch)
}

/// Fail with `InvalidArgument` when a count flag was given as zero.
pub fn require_positive(flag: &str, value: Option<usize>, output: OutputMode) -> Result<()> {
    if value != Some(0) {
        return Ok(());
    }
    Err(fail(
        output,
        &CliError::from_code(ErrorCode::InvalidArgument, format!("{flag} must be at least 1")),
    ))
}

/// Fail with `IdentityNotFound` unless `id` is a vertex of `graph`.
pub fn require_identity(graph: &InteractionGraph, id: &str, output: OutputMode) -> Result<()> {
    if graph.vertex(id).is_some() {
        return Ok(());
    }
    Err(fail(
        output,
        &CliError::from_code(ErrorCode::IdentityNotFound, format!("identity '{id}' not found")),
    ))
}
