//! sociogram-core library.
//!
//! Event records, identity normalization, the interaction graph store and
//! its immutable snapshot, and the ingestion pipeline that connects them.
//! Nothing in this crate performs I/O except [`config`] file loading.
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums for library outcomes, `anyhow::Result`
//!   where files are read.
//! - **Logging**: `tracing` macros (`info!`, `debug!`, `trace!`).

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod graph;
pub mod ingest;
pub mod model;

pub use config::AnalysisConfig;
pub use error::{Degradation, ErrorCode, Stream};
pub use graph::{GraphStore, InteractionGraph};
pub use ingest::{IngestReport, Ingestor};
pub use model::EventBatch;

/// Ingest `batch` into a fresh store and freeze it.
///
/// ```rust
/// use sociogram_core::{build_graph, EventBatch};
///
/// let (graph, report) = build_graph(&EventBatch::default(), "unknown");
/// assert!(graph.is_empty());
/// assert_eq!(report.records_seen(), 0);
/// ```
#[must_use]
pub fn build_graph(batch: &EventBatch, unknown_identity: &str) -> (InteractionGraph, IngestReport) {
    let mut store = GraphStore::new();
    let report = Ingestor::new(unknown_identity).ingest(&mut store, batch);
    (store.freeze(), report)
}
