#![forbid(unsafe_code)]
//! sociogram-analytics library.
//!
//! Read-only analytics over a frozen
//! [`InteractionGraph`](sociogram_core::graph::InteractionGraph). Every
//! function here is a pure function of the snapshot; results that are
//! expensive to recompute (the SCC partition, label assignments) are
//! memoized in the snapshot's derived cache.
//!
//! # Conventions
//!
//! - **Errors**: analytics never fail. Unknown identities yield zero or
//!   empty results; an empty graph yields neutral results.
//! - **Logging**: `tracing` macros (`info!`, `debug!`).

pub mod community;
pub mod components;
pub mod metrics;
pub mod proximity;
pub mod report;
pub mod stats;

pub use report::{AnalysisReport, analyze};
