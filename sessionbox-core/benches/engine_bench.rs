//! Criterion benchmarks for the session range engine.
//!
//! Benchmarks:
//! 1. Bar store construction (sort, dedupe, localize)
//! 2. Full build (ranges + breakout/mitigation scans) at several history lengths
//! 3. Memoized rebuild through RangeCache

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use sessionbox_core::{
    build, Bar, BarStore, BuildOptions, RangeCache, ReferenceZone, SessionDefinition,
};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize) -> Vec<Bar> {
    let origin = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.07).sin() * 10.0;
            Bar::new(
                origin + Duration::hours(i as i64),
                close - 0.3,
                close + 1.5,
                close - 1.5,
                close,
            )
        })
        .collect()
}

fn definitions() -> Vec<SessionDefinition> {
    vec![SessionDefinition::morning(), SessionDefinition::afternoon()]
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_store(c: &mut Criterion) {
    let bars = make_bars(5_000);
    c.bench_function("bar_store_new_5000", |b| {
        b.iter(|| BarStore::new(black_box(bars.clone()), ReferenceZone::new_york()))
    });
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for n in [500usize, 2_000, 8_000] {
        let store = BarStore::new(make_bars(n), ReferenceZone::new_york());
        let defs = definitions();
        group.bench_with_input(BenchmarkId::from_parameter(n), &store, |b, store| {
            b.iter(|| build(black_box(store), &defs, &BuildOptions::default()))
        });
    }
    group.finish();
}

fn bench_cache(c: &mut Criterion) {
    let store = BarStore::new(make_bars(2_000), ReferenceZone::new_york());
    let defs = definitions();
    let mut cache = RangeCache::new();
    cache.get_or_build(&store, &defs, &BuildOptions::default());
    c.bench_function("range_cache_hit_2000", |b| {
        b.iter(|| {
            cache
                .get_or_build(black_box(&store), &defs, &BuildOptions::default())
                .len()
        })
    });
}

criterion_group!(benches, bench_store, bench_build, bench_cache);
criterion_main!(benches);
