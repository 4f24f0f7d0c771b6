//! Interaction graph module.
//!
//! # Overview
//!
//! Ingestion writes into a mutable [`GraphStore`]; analytics read from the
//! immutable [`InteractionGraph`] it freezes into.
//!
//! ## Pipeline
//!
//! ```text
//! EventBatch
//!        ↓  ingest::Ingestor::ingest()
//! GraphStore (vertices = identities, edges = accumulated interactions)
//!        ↓  GraphStore::freeze()
//! InteractionGraph
//!   ├─ directed weighted graph (petgraph)
//!   ├─ undirected adjacency for proximity/components
//!   ├─ content_hash: BLAKE3 of the weighted edge set
//!   └─ cache: DerivedCache for memoized analytics
//! ```
//!
//! ## Typical Usage
//!
//! ```rust
//! use sociogram_core::graph::GraphStore;
//!
//! let mut store = GraphStore::new();
//! store.add_edge("alice", "bob", 3, "Closed issue #1");
//! let graph = store.freeze();
//! assert_eq!(graph.edge_weight("alice", "bob"), Some(3));
//! ```

pub mod cache;
pub mod snapshot;
pub mod store;

pub use cache::DerivedCache;
pub use snapshot::InteractionGraph;
pub use store::{EdgeOutcome, GraphStore, Interaction, RejectReason, Vertex};
