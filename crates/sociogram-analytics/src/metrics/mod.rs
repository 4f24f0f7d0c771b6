//! Scalar metrics over the interaction graph.
//!
//! # Overview
//!
//! - **Degree & influence** (`degree`): weighted degree, the composite
//!   influence score, top-k rankings, and directed density.
//! - **Fragmentation** (`fragmentation`): which contributor's departure
//!   would split the graph most, plus cheap bridging signals.
//!
//! ```rust
//! use sociogram_core::graph::GraphStore;
//! use sociogram_analytics::metrics::degree::{top_k, weighted_degree};
//!
//! let mut store = GraphStore::new();
//! store.add_edge("alice", "bob", 3, "Closed issue #1");
//! store.add_edge("alice", "carol", 2, "Comment on #1");
//! let graph = store.freeze();
//!
//! assert_eq!(weighted_degree(&graph, "alice"), 5);
//! assert_eq!(top_k(&graph, 1)[0].identity, "alice");
//! ```

pub mod degree;
pub mod fragmentation;
