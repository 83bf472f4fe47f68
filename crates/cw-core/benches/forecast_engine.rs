//! Criterion benchmarks for the per-query forecasting path.
//!
//! Histories are synthetic and held in memory so runs are deterministic.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use cw_common::{Lookback, SeriesKey, Snapshot, TimeBasis, TICKS_PER_HOUR};
use cw_config::ForecastConfig;
use cw_core::adapters::MoodInput;
use cw_core::forecast::RateCalculator;
use cw_core::store::{MemorySnapshotStore, DEFAULT_RETENTION};
use cw_core::Engine;
use std::collections::HashMap;

fn hourly(start: f64, per_hour: f64, n: usize) -> Vec<Snapshot> {
    (0..n)
        .map(|i| Snapshot::new(i as u64 * TICKS_PER_HOUR, start + per_hour * i as f64))
        .collect()
}

fn bench_rate_estimate(c: &mut Criterion) {
    let basis = TimeBasis::default();
    let mut group = c.benchmark_group("rate_estimate");

    for n in [2usize, 24, DEFAULT_RETENTION] {
        let history = hourly(500.0, -2.0, n);
        let calc = RateCalculator::new(Lookback::All, &basis, -1.0);
        group.bench_with_input(BenchmarkId::new("all", n), &history, |b, series| {
            b.iter(|| black_box(calc.estimate(black_box(series))));
        });
    }

    group.finish();
}

fn bench_health_pass(c: &mut Criterion) {
    let engine = Engine::from_config(&ForecastConfig::default()).expect("default config builds");
    let store = MemorySnapshotStore::default();
    for name in ["food", "medicine", "wood", "steel"] {
        store
            .record_all(&SeriesKey::domain(name), hourly(400.0, -1.5, DEFAULT_RETENTION))
            .expect("ordered history");
    }

    let ids: Vec<String> = (0..10).map(|i| format!("Human{}", i)).collect();
    let mut floors: HashMap<String, f64> = HashMap::new();
    for id in &ids {
        floors.insert(id.clone(), 0.2);
        store
            .record_all(
                &SeriesKey::entity("mood", id),
                hourly(0.8, -0.005, DEFAULT_RETENTION),
            )
            .expect("ordered history");
    }
    let now = (DEFAULT_RETENTION as u64 - 1) * TICKS_PER_HOUR;
    let inputs: Vec<MoodInput<'_>> = ids
        .iter()
        .map(|id| MoodInput {
            colonist_id: id,
            current: 0.45,
            negative_thoughts: -12.0,
            now,
        })
        .collect();

    c.bench_function("engine/health_pass", |b| {
        b.iter(|| {
            let resources = engine
                .forecast_resources(&store, |_| Some(300.0))
                .expect("store is local");
            let mood = engine
                .assess_mood(&store, &floors, &inputs)
                .expect("floors are known");
            black_box(engine.health(&resources, Vec::new(), &mood));
        })
    });
}

criterion_group!(benches, bench_rate_estimate, bench_health_pass);
criterion_main!(benches);
