use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use sociogram_analytics::community::communities;
use sociogram_analytics::components::natural_groups;
use sociogram_analytics::metrics::degree::top_k;
use sociogram_analytics::metrics::fragmentation::fragmentation_point;
use sociogram_analytics::proximity::closest_users;
use sociogram_core::build_graph;
use sociogram_core::config::FragmentationConfig;
use sociogram_core::model::{CommentRecord, EventBatch, IssueRecord, ThreadState};

struct Tier {
    name: &'static str,
    contributors: u64,
    issues: u64,
}

const TIERS: [Tier; 3] = [
    Tier {
        name: "small",
        contributors: 50,
        issues: 500,
    },
    Tier {
        name: "medium",
        contributors: 500,
        issues: 5_000,
    },
    Tier {
        name: "large",
        contributors: 2_000,
        issues: 20_000,
    },
];

/// Deterministic synthetic project: every issue is closed by someone and
/// draws two comments.
fn synthetic_batch(tier: &Tier, seed: u64) -> EventBatch {
    let mut state = seed;
    let mut next = |modulo: u64| {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (state >> 33) % modulo
    };
    let mut batch = EventBatch::default();
    for number in 1..=tier.issues {
        let author = format!("dev{}", next(tier.contributors));
        batch.issues.push(IssueRecord {
            number: Some(number),
            author: Some(author),
            state: Some(ThreadState::Closed),
            closed_at: None,
            closed_by: Some(format!("dev{}", next(tier.contributors))),
        });
        for _ in 0..2 {
            batch.comments.push(CommentRecord {
                author: Some(format!("dev{}", next(tier.contributors))),
                issue_number: Some(number),
            });
        }
    }
    batch
}

fn bench_analytics(c: &mut Criterion) {
    let mut group = c.benchmark_group("analytics.tiered");

    for tier in &TIERS {
        let batch = synthetic_batch(tier, 0x5EED_u64 + tier.issues);
        group.throughput(Throughput::Elements(batch.len() as u64));

        group.bench_with_input(BenchmarkId::new("ingest", tier.name), &batch, |b, batch| {
            b.iter(|| black_box(build_graph(batch, "unknown")));
        });

        let (graph, _) = build_graph(&batch, "unknown");

        group.bench_function(BenchmarkId::new("top_k", tier.name), |b| {
            b.iter(|| black_box(top_k(&graph, 10)));
        });

        group.bench_function(BenchmarkId::new("natural_groups", tier.name), |b| {
            b.iter(|| {
                graph.cache().clear();
                black_box(natural_groups(&graph))
            });
        });

        group.bench_function(BenchmarkId::new("communities", tier.name), |b| {
            b.iter(|| {
                graph.cache().clear();
                black_box(communities(&graph, 10, 3))
            });
        });

        let options = FragmentationConfig::default();
        group.bench_function(BenchmarkId::new("fragmentation", tier.name), |b| {
            b.iter(|| black_box(fragmentation_point(&graph, &options)));
        });

        group.bench_function(BenchmarkId::new("closest_users", tier.name), |b| {
            b.iter(|| black_box(closest_users(&graph, "dev0", 10)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_analytics);
criterion_main!(benches);
