//! Ingestion pipeline: typed event records → weighted interaction edges.
//!
//! # Overview
//!
//! ```text
//! EventBatch { issues, pull_requests, comments, reviews }
//!        ↓  ThreadIndex::build (issues first, then PRs)
//!        ↓  register every referenced identity as a vertex
//!        ↓  rules::{issue_closure, pull_request_resolution, review, comment}
//! GraphStore  +  IngestReport (counts, degradations)
//! ```
//!
//! Rules run in fixed priority order: issue closures, PR resolutions,
//! reviews, comments. Nothing here is fatal. A record that cannot be used
//! is counted, logged at `debug`, and skipped. Rows rejected while parsing
//! the bundle are counted the same way. Unreadable field values (an
//! unknown state, a garbled timestamp) are reported but do not stop the
//! record from contributing.
//!
//! Ingesting the same batch twice into one store doubles every edge and
//! activity weight; deduplication is the caller's business.

pub mod rules;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::error::{Degradation, Stream};
use crate::graph::GraphStore;
use crate::model::EventBatch;
use crate::model::identity::{normalize_author, normalize_counterpart};

pub use rules::{Candidate, RuleOutcome, ThreadIndex, ThreadKind};

/// Per-stream tally of what happened to the records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreamCounts {
    pub seen: usize,
    pub applied: usize,
    pub not_applicable: usize,
    pub self_interactions: usize,
    pub degraded: usize,
}

/// Summary of one [`Ingestor::ingest`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub issues: StreamCounts,
    pub pull_requests: StreamCounts,
    pub comments: StreamCounts,
    pub reviews: StreamCounts,
    /// Every skipped record's reason, in encounter order.
    pub degradations: Vec<Degradation>,
}

impl IngestReport {
    fn counts_mut(&mut self, stream: Stream) -> &mut StreamCounts {
        match stream {
            Stream::Issues => &mut self.issues,
            Stream::PullRequests => &mut self.pull_requests,
            Stream::Comments => &mut self.comments,
            Stream::Reviews => &mut self.reviews,
        }
    }

    #[must_use]
    pub fn counts(&self, stream: Stream) -> StreamCounts {
        match stream {
            Stream::Issues => self.issues,
            Stream::PullRequests => self.pull_requests,
            Stream::Comments => self.comments,
            Stream::Reviews => self.reviews,
        }
    }

    fn streams(&self) -> [StreamCounts; 4] {
        [self.issues, self.pull_requests, self.comments, self.reviews]
    }

    #[must_use]
    pub fn records_seen(&self) -> usize {
        self.streams().iter().map(|c| c.seen).sum()
    }

    #[must_use]
    pub fn edges_applied(&self) -> usize {
        self.streams().iter().map(|c| c.applied).sum()
    }

    #[must_use]
    pub fn self_interactions(&self) -> usize {
        self.streams().iter().map(|c| c.self_interactions).sum()
    }

    #[must_use]
    pub fn missing_columns(&self) -> usize {
        self.count_kind("missing_column")
    }

    #[must_use]
    pub fn unresolved_references(&self) -> usize {
        self.count_kind("unresolved_reference")
    }

    #[must_use]
    pub fn malformed_records(&self) -> usize {
        self.count_kind("malformed_record")
    }

    #[must_use]
    pub fn malformed_values(&self) -> usize {
        self.count_kind("malformed_value")
    }

    fn count_kind(&self, kind: &str) -> usize {
        self.degradations.iter().filter(|d| d.kind() == kind).count()
    }
}

/// Applies the interaction rule table to event batches.
#[derive(Debug, Clone)]
pub struct Ingestor {
    unknown_identity: String,
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::new(crate::model::UNKNOWN_IDENTITY)
    }
}

impl Ingestor {
    /// Create an ingestor that maps missing authors to `unknown_identity`.
    #[must_use]
    pub fn new(unknown_identity: impl Into<String>) -> Self {
        Self {
            unknown_identity: unknown_identity.into(),
        }
    }

    #[must_use]
    pub fn unknown_identity(&self) -> &str {
        &self.unknown_identity
    }

    /// Ingest one batch into `store`.
    #[instrument(skip(self, store, batch), fields(records = batch.len()))]
    pub fn ingest(&self, store: &mut GraphStore, batch: &EventBatch) -> IngestReport {
        let unknown = self.unknown_identity.as_str();
        let threads = ThreadIndex::build(&batch.issues, &batch.pull_requests, unknown);
        debug!(threads = threads.len(), "thread index built");

        self.register_identities(store, batch);

        let mut report = IngestReport::default();
        for rejected in &batch.rejected {
            if let Some(stream) = rejected.stream() {
                apply(store, &mut report, stream, RuleOutcome::Degraded(rejected.clone()));
            }
        }
        for issue in &batch.issues {
            note_unreadable(&mut report, Stream::Issues, issue.unreadable_fields());
            let outcome = rules::issue_closure(issue, unknown);
            apply(store, &mut report, Stream::Issues, outcome);
        }
        for pr in &batch.pull_requests {
            note_unreadable(&mut report, Stream::PullRequests, pr.unreadable_fields());
            let outcome = rules::pull_request_resolution(pr, unknown);
            apply(store, &mut report, Stream::PullRequests, outcome);
        }
        for review in &batch.reviews {
            let outcome = rules::review(review, &threads, unknown);
            apply(store, &mut report, Stream::Reviews, outcome);
        }
        for comment in &batch.comments {
            let outcome = rules::comment(comment, &threads, unknown);
            apply(store, &mut report, Stream::Comments, outcome);
        }

        info!(
            records = report.records_seen(),
            edges = report.edges_applied(),
            self_interactions = report.self_interactions(),
            missing_columns = report.missing_columns(),
            unresolved = report.unresolved_references(),
            malformed_records = report.malformed_records(),
            malformed_values = report.malformed_values(),
            vertices = store.vertex_count(),
            "ingestion complete"
        );
        report
    }

    /// Every identity a record names becomes a vertex, edge or not.
    fn register_identities(&self, store: &mut GraphStore, batch: &EventBatch) {
        let unknown = self.unknown_identity.as_str();
        let author = |raw: &Option<String>| normalize_author(raw.as_deref(), unknown);

        for issue in &batch.issues {
            store.add_vertex(&author(&issue.author));
            if let Some(closer) = normalize_counterpart(issue.closed_by.as_deref()) {
                store.add_vertex(&closer);
            }
        }
        for pr in &batch.pull_requests {
            store.add_vertex(&author(&pr.author));
            for counterpart in [pr.merged_by.as_deref(), pr.closed_by.as_deref()] {
                if let Some(id) = normalize_counterpart(counterpart) {
                    store.add_vertex(&id);
                }
            }
        }
        for review in &batch.reviews {
            store.add_vertex(&author(&review.author));
        }
        for comment in &batch.comments {
            store.add_vertex(&author(&comment.author));
        }
    }
}

fn note_unreadable(report: &mut IngestReport, stream: Stream, fields: Vec<&'static str>) {
    for field in fields {
        debug!(%stream, field, "unreadable value");
        report
            .degradations
            .push(Degradation::MalformedValue { stream, field });
    }
}

fn apply(store: &mut GraphStore, report: &mut IngestReport, stream: Stream, outcome: RuleOutcome) {
    let counts = report.counts_mut(stream);
    counts.seen += 1;
    match outcome {
        RuleOutcome::Edge(candidate) => {
            let result = store.add_interaction(
                &candidate.source,
                &candidate.target,
                candidate.kind,
                candidate.label,
            );
            if result.is_applied() {
                counts.applied += 1;
            } else {
                debug!(%stream, source = %candidate.source, target = %candidate.target, ?result, "edge rejected by store");
                counts.not_applicable += 1;
            }
        }
        RuleOutcome::NotApplicable => counts.not_applicable += 1,
        RuleOutcome::SelfInteraction => {
            debug!(%stream, "self-interaction discarded");
            counts.self_interactions += 1;
        }
        RuleOutcome::Degraded(degradation) => {
            debug!(%stream, reason = %degradation, "record skipped");
            counts.degraded += 1;
            report.degradations.push(degradation);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
