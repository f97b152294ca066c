//! Serialization and batching benchmarks.
//!
//! `track` runs on the caller's thread, so query serialization is the cost
//! every caller pays synchronously.

use std::{hint::black_box, time::Duration};

use beacon_core::{QuerySerializer, TrackingAction};
use beacon_delivery::{Tracker, TrackerConfig};
use beacon_testing::{
    fixtures::{full_action, page_view, TEST_TOKEN},
    TestEnv,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tokio::runtime::Runtime;

fn bench_serialize(c: &mut Criterion) {
    let serializer = QuerySerializer::new(Some(42), Some(TEST_TOKEN.to_string()));
    let actions = [
        ("empty", TrackingAction::new()),
        ("page_view", page_view("Help / Feedback")),
        ("full", full_action()),
    ];

    let mut group = c.benchmark_group("serialize");
    group.throughput(Throughput::Elements(1));

    for (name, action) in &actions {
        group.bench_with_input(BenchmarkId::from_parameter(name), action, |b, action| {
            b.iter(|| serializer.serialize(black_box(action)))
        });
    }

    group.finish();
}

fn bench_track_window(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let env = rt.block_on(TestEnv::new());

    let mut group = c.benchmark_group("track_window");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    for batch_size in [1usize, 10, 100] {
        group.throughput(Throughput::Elements(batch_size as u64));

        group.bench_with_input(BenchmarkId::new("actions", batch_size), &batch_size, |b, &size| {
            b.to_async(&rt).iter(|| async {
                let config = TrackerConfig::builder(env.endpoint())
                    .default_site_id(42)
                    .delay(Duration::from_millis(1))
                    .build()
                    .unwrap();
                let tracker = Tracker::new(config).unwrap();

                let handles: Vec<_> =
                    (0..size).map(|i| tracker.track(&page_view(&format!("page {i}"))).unwrap()).collect();
                for handle in handles {
                    handle.await.unwrap();
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_serialize, bench_track_window);
criterion_main!(benches);
