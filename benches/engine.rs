use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use repricer::{BanditEngine, EngineConfig, PolicyKind};
use std::hint::black_box;

fn fitted(policy: PolicyKind, dim: usize) -> BanditEngine {
    let mut engine = BanditEngine::new(EngineConfig {
        arms: vec![0.9, 1.0, 1.1],
        dimension: dim,
        policy,
        seed: 0,
    })
    .unwrap();
    let contexts: Vec<Vec<f64>> = (0..30)
        .map(|t| (0..dim).map(|i| ((t * 7 + i) % 13) as f64 * 0.1).collect())
        .collect();
    let decisions: Vec<f64> = (0..30).map(|t| [0.9, 1.0, 1.1][t % 3]).collect();
    let rewards: Vec<f64> = (0..30).map(|t| (t % 10) as f64 * 100.0).collect();
    engine.fit(&decisions, &rewards, &contexts).unwrap();
    engine
}

fn bench_predict_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("predict_update");
    for &dim in &[8usize, 16, 32] {
        let ctx: Vec<f64> = (0..dim).map(|i| (i as f64) * 0.05).collect();

        let mut ucb = fitted(
            PolicyKind::LinUcb {
                alpha: 1.0,
                lambda: 1.0,
            },
            dim,
        );
        group.bench_with_input(BenchmarkId::new("lin_ucb", dim), &dim, |b, _| {
            b.iter(|| {
                let tier = ucb.predict(black_box(&ctx)).unwrap();
                ucb.update(tier, 500.0, black_box(&ctx)).unwrap();
            })
        });

        let mut ts = fitted(
            PolicyKind::LinTs {
                alpha: 1.5,
                lambda: 1.0,
            },
            dim,
        );
        group.bench_with_input(BenchmarkId::new("lin_ts", dim), &dim, |b, _| {
            b.iter(|| {
                let tier = ts.predict(black_box(&ctx)).unwrap();
                ts.update(tier, 500.0, black_box(&ctx)).unwrap();
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_predict_update);
criterion_main!(benches);
