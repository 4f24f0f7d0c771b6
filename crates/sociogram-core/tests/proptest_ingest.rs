use proptest::prelude::*;

use sociogram_core::graph::GraphStore;
use sociogram_core::model::{
    CommentRecord, EventBatch, IssueRecord, PullRequestRecord, ReviewRecord, ThreadState,
};
use sociogram_core::{Ingestor, build_graph};

const PEOPLE: [&str; 6] = ["ana", "ben", "cai", "dee", "eli", ""];

fn person() -> impl Strategy<Value = Option<String>> {
    prop::option::of((0..PEOPLE.len()).prop_map(|i| PEOPLE[i].to_string()))
}

fn state() -> impl Strategy<Value = Option<ThreadState>> {
    prop::option::of(prop_oneof![
        Just(ThreadState::Open),
        Just(ThreadState::Closed),
        Just(ThreadState::Merged),
        Just(ThreadState::Other),
    ])
}

/// Raw JSON values an exporter might put in a `state` or timestamp column.
fn odd_value() -> impl Strategy<Value = serde_json::Value> {
    prop_oneof![
        Just(serde_json::Value::Null),
        prop::sample::select(vec!["closed", "Closed", "MERGED", "open", "locked", ""])
            .prop_map(serde_json::Value::from),
        prop::sample::select(vec![
            "2024-03-01T12:00:00Z",
            "2024-03-01 12:00:00",
            "not a date",
        ])
        .prop_map(serde_json::Value::from),
        any::<i64>().prop_map(serde_json::Value::from),
        any::<bool>().prop_map(serde_json::Value::from),
    ]
}

fn arb_batch() -> impl Strategy<Value = EventBatch> {
    let issues = prop::collection::vec(
        (prop::option::of(1_u64..8), person(), state(), person()).prop_map(
            |(number, author, state, closed_by)| IssueRecord {
                number,
                author,
                state,
                closed_at: None,
                closed_by,
            },
        ),
        0..8,
    );
    let prs = prop::collection::vec(
        (
            prop::option::of(5_u64..12),
            person(),
            state(),
            prop::option::of(any::<bool>()),
            person(),
            person(),
        )
            .prop_map(|(number, author, state, merged, merged_by, closed_by)| {
                PullRequestRecord {
                    number,
                    author,
                    state,
                    merged,
                    merged_by,
                    closed_by,
                    ..PullRequestRecord::default()
                }
            }),
        0..8,
    );
    let comments = prop::collection::vec(
        (person(), prop::option::of(1_u64..14))
            .prop_map(|(author, issue_number)| CommentRecord {
                author,
                issue_number,
            }),
        0..12,
    );
    let reviews = prop::collection::vec(
        (person(), prop::option::of(5_u64..14)).prop_map(|(author, pr_number)| ReviewRecord {
            author,
            pr_number,
            state: None,
        }),
        0..8,
    );
    (issues, prs, comments, reviews).prop_map(|(issues, pull_requests, comments, reviews)| {
        EventBatch {
            issues,
            pull_requests,
            comments,
            reviews,
            ..EventBatch::default()
        }
    })
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(256))]

    #[test]
    fn ingestion_never_creates_self_loops(batch in arb_batch()) {
        let (graph, _) = build_graph(&batch, "unknown");
        for (source, target, interaction) in graph.edges() {
            prop_assert_ne!(source, target);
            prop_assert!(!source.is_empty() && !target.is_empty());
            prop_assert!(interaction.weight >= 2);
        }
    }

    #[test]
    fn every_record_is_accounted_for(batch in arb_batch()) {
        let (_, report) = build_graph(&batch, "unknown");
        prop_assert_eq!(report.records_seen(), batch.len());
        for counts in [report.issues, report.pull_requests, report.comments, report.reviews] {
            prop_assert_eq!(
                counts.applied + counts.not_applicable + counts.self_interactions + counts.degraded,
                counts.seen
            );
        }
    }

    #[test]
    fn odd_values_never_fail_the_bundle(
        rows in prop::collection::vec((odd_value(), odd_value(), person(), person()), 0..10)
    ) {
        let issues: Vec<serde_json::Value> = rows
            .iter()
            .enumerate()
            .map(|(i, (state, closed_at, author, closed_by))| {
                serde_json::json!({
                    "number": i,
                    "author": author,
                    "state": state,
                    "closed_at": closed_at,
                    "closed_by": closed_by,
                })
            })
            .collect();
        let text = serde_json::json!({ "issues": issues }).to_string();

        let batch = EventBatch::from_json(&text).expect("bundle always parses");
        prop_assert_eq!(batch.len(), rows.len());
        let (_, report) = build_graph(&batch, "unknown");
        prop_assert_eq!(report.issues.seen, rows.len());
        prop_assert_eq!(report.malformed_records(), batch.rejected.len());
    }

    #[test]
    fn reingesting_doubles_every_weight(batch in arb_batch()) {
        let (once, _) = build_graph(&batch, "unknown");

        let mut store = GraphStore::new();
        let ingestor = Ingestor::default();
        ingestor.ingest(&mut store, &batch);
        ingestor.ingest(&mut store, &batch);
        let twice = store.freeze();

        prop_assert_eq!(once.edge_count(), twice.edge_count());
        prop_assert_eq!(once.vertex_count(), twice.vertex_count());
        for (source, target, interaction) in once.edges() {
            prop_assert_eq!(twice.edge_weight(source, target), Some(interaction.weight * 2));
        }
        for vertex in once.vertices() {
            prop_assert_eq!(twice.vertex_weight(&vertex.id), Some(vertex.activity * 2));
        }
    }

    #[test]
    fn activity_is_sum_of_touching_edges(batch in arb_batch()) {
        let (graph, _) = build_graph(&batch, "unknown");
        for vertex in graph.vertices() {
            let touching: u64 = graph
                .edges()
                .filter(|(s, t, _)| *s == vertex.id || *t == vertex.id)
                .map(|(_, _, i)| i.weight)
                .sum();
            prop_assert_eq!(vertex.activity, touching);
        }
    }
}
