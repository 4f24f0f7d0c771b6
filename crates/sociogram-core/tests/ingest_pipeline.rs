//! End-to-end ingestion from exported JSON bundles.

use sociogram_core::error::{Degradation, Stream};
use sociogram_core::graph::GraphStore;
use sociogram_core::model::EventBatch;
use sociogram_core::{Ingestor, build_graph};

const BUNDLE: &str = r#"{
  "issues": [
    {"number": 1, "author": "alice", "state": "CLOSED", "closed_by": "bob",
     "closed_at": "2024-03-01T12:00:00Z"},
    {"number": 2, "author": "carol", "state": "OPEN"},
    {"number": 3, "author": null, "closed_at": "2024-03-02T08:30:00Z", "closed_by": "alice"}
  ],
  "pull_requests": [
    {"number": 10, "author": "bob", "state": "MERGED", "merged": true,
     "merged_at": "2024-03-03T10:00:00Z", "merged_by": "alice"},
    {"number": 11, "author": "dave", "state": "CLOSED", "closed_by": "carol"},
    {"number": 12, "author": "erin", "state": "OPEN"}
  ],
  "comments": [
    {"author": "dave", "issue_number": 2},
    {"author": "carol", "issue_number": 2},
    {"author": "erin", "issue_number": 10},
    {"author": "frank", "issue_number": 99},
    {"author": "gina"}
  ],
  "reviews": [
    {"author": "carol", "pr_number": 10, "state": "APPROVED"},
    {"author": "alice", "pr_number": 12, "state": "SOMETHING_NEW"},
    {"author": "bob", "pr_number": 2, "state": "COMMENTED"}
  ]
}"#;

fn parse() -> EventBatch {
    serde_json::from_str(BUNDLE).expect("bundle parses")
}

#[test]
fn bundle_deserializes_with_missing_fields() {
    let batch = parse();
    assert_eq!(batch.len(), 14);
    assert_eq!(batch.issues[2].author, None);
    assert_eq!(batch.comments[4].issue_number, None);
}

#[test]
fn bundle_edges() {
    let (graph, report) = build_graph(&parse(), "unknown");

    assert_eq!(graph.edge_weight("alice", "bob"), Some(3));
    assert_eq!(graph.edge_weight("unknown", "alice"), Some(3));
    assert_eq!(graph.edge_weight("bob", "alice"), Some(3));
    assert_eq!(graph.edge_weight("dave", "carol"), Some(3));
    assert_eq!(graph.edge_weight("carol", "dave"), Some(2));
    assert_eq!(graph.edge_weight("bob", "erin"), Some(2));
    assert_eq!(graph.edge_weight("bob", "carol"), Some(2));
    assert_eq!(graph.edge_weight("erin", "alice"), Some(2));

    let merged = graph.edge("bob", "alice").expect("merge edge");
    assert_eq!(merged.labels, vec!["Merged PR #10"]);
    let review = graph.edge("erin", "alice").expect("review edge");
    assert_eq!(review.labels, vec!["Review on PR #12 (OTHER)"]);

    assert_eq!(report.edges_applied(), 8);
    assert_eq!(report.self_interactions(), 1, "carol on her own issue");
    assert_eq!(report.issues.not_applicable, 1);
    assert_eq!(report.pull_requests.not_applicable, 1);
}

#[test]
fn bundle_degradations() {
    let (_, report) = build_graph(&parse(), "unknown");
    assert_eq!(
        report.degradations,
        vec![
            Degradation::UnresolvedReference {
                stream: Stream::Reviews,
                number: 2,
            },
            Degradation::UnresolvedReference {
                stream: Stream::Comments,
                number: 99,
            },
            Degradation::MissingColumn {
                stream: Stream::Comments,
                field: "issue_number",
            },
        ]
    );
    assert_eq!(report.unresolved_references(), 2);
    assert_eq!(report.missing_columns(), 1);
}

#[test]
fn bystanders_still_become_vertices() {
    let (graph, _) = build_graph(&parse(), "unknown");
    assert!(graph.vertex("frank").is_some());
    assert!(graph.vertex("gina").is_some());
    assert_eq!(graph.vertex_weight("gina"), Some(0));
}

#[test]
fn report_serializes_to_json() {
    let mut store = GraphStore::new();
    let report = Ingestor::default().ingest(&mut store, &parse());
    let json = serde_json::to_value(&report).expect("serialize");
    assert_eq!(json["degradations"][0]["kind"], "unresolved_reference");
    assert_eq!(json["degradations"][0]["stream"], "reviews");
    assert_eq!(json["issues"]["seen"], 3);
}

const ODD_BUNDLE: &str = r#"{
  "issues": [
    {"number": 1, "author": "alice", "state": "closed", "closed_by": "bob"},
    {"number": 2, "author": "carol", "state": "LOCKED", "closed_by": "dave"},
    {"number": 3, "author": "erin", "closed_at": "sometime in May", "closed_by": "alice"},
    {"number": 4, "author": "frank", "state": "Closed", "closed_at": "2023-05-01 10:00:00",
     "closed_by": "alice"},
    {"number": "five", "author": "gina"}
  ],
  "pull_requests": [
    {"number": 10, "author": "alice", "state": "merged", "merged": true, "closed_by": "bob"},
    {"number": 11, "author": "bob", "merged_at": 1714557600}
  ],
  "reviews": [
    {"author": "carol", "pr_number": 10, "state": "approved"}
  ]
}"#;

#[test]
fn odd_values_degrade_per_record() {
    let batch = EventBatch::from_json(ODD_BUNDLE).expect("odd bundle parses");
    assert_eq!(batch.issues.len(), 4);
    assert_eq!(batch.pull_requests.len(), 1);
    assert_eq!(batch.rejected.len(), 2);

    let (graph, report) = build_graph(&batch, "unknown");

    // Lowercase and mixed-case states still close the thread.
    assert_eq!(graph.edge_weight("alice", "bob"), Some(3 + 3));
    assert_eq!(graph.edge_weight("frank", "alice"), Some(3));
    // An unknown state closes nothing without a timestamp.
    assert_eq!(graph.edge_weight("carol", "dave"), None);
    // A garbled timestamp still marks the issue closed.
    assert_eq!(graph.edge_weight("erin", "alice"), Some(3));
    // Merged PR with only a closer recorded.
    let merged = graph.edge("alice", "bob").expect("edge");
    assert_eq!(merged.labels, vec!["Closed issue #1", "Merged PR #10"]);
    assert_eq!(graph.edge_weight("alice", "carol"), Some(2));
    assert!(graph.vertex("gina").is_none(), "rejected rows add nobody");

    assert_eq!(report.issues.seen, 5);
    assert_eq!(report.issues.degraded, 1);
    assert_eq!(report.pull_requests.seen, 2);
    assert_eq!(report.pull_requests.degraded, 1);
    assert_eq!(report.malformed_records(), 2);
    assert_eq!(
        report
            .degradations
            .iter()
            .filter(|d| matches!(d, Degradation::MalformedValue { .. }))
            .cloned()
            .collect::<Vec<_>>(),
        vec![
            Degradation::MalformedValue {
                stream: Stream::Issues,
                field: "state",
            },
            Degradation::MalformedValue {
                stream: Stream::Issues,
                field: "closed_at",
            },
        ]
    );
    assert_eq!(report.edges_applied(), 5);
}
