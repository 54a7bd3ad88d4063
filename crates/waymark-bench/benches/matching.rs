//! Lookup benchmarks for Waymark.
//!
//! These benchmarks measure how fast a built router resolves request paths.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use waymark_bench::{api_router, fanout_router, API_PATHS};

/// Benchmark single lookups against the API table.
fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");
    let router = api_router();

    for path in API_PATHS {
        group.bench_with_input(BenchmarkId::from_parameter(path), path, |b, path| {
            b.iter(|| router.at(black_box(path)).map(|m| *m.action()))
        });
    }

    group.finish();
}

/// Benchmark resolving the whole path sample, captures included.
fn bench_lookup_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup_all");
    let router = api_router();

    group.throughput(Throughput::Elements(API_PATHS.len() as u64));
    group.bench_function("api", |b| {
        b.iter(|| {
            let mut captured = 0;
            for path in API_PATHS {
                if let Some(m) = router.at(black_box(path)) {
                    captured += m.captures().len();
                }
            }
            captured
        })
    });

    group.finish();
}

/// Benchmark literal fan-out on both sides of the list/map threshold.
fn bench_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("fanout");

    for size in [4usize, 11, 12, 64, 512] {
        let router = fanout_router(size);
        let last = format!("/items/item{}", size - 1);
        group.bench_with_input(BenchmarkId::from_parameter(size), &last, |b, path| {
            b.iter(|| router.at(black_box(path)).map(|m| *m.action()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_lookup, bench_lookup_all, bench_fanout);
criterion_main!(benches);
