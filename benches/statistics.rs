use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use http_timing_oracle::analysis::{BaselineEstimator, Estimator, IntervalEstimator};
use http_timing_oracle::statistics::median_ns;
use http_timing_oracle::CaseDataset;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

fn dataset(rng: &mut StdRng, label: &str, mean_ms: f64, n: usize) -> CaseDataset {
    let normal = Normal::new(mean_ms, 5.0).unwrap();
    let samples = (0..n)
        .map(|_| (normal.sample(rng).max(0.0) * 1_000_000.0) as u64)
        .collect();
    CaseDataset::with_samples(label, samples)
}

fn bench_estimators(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);
    let mut group = c.benchmark_group("estimators");

    // Accumulated sizes late in a default run.
    for n in [1_000usize, 10_000, 50_000] {
        let pair = vec![dataset(&mut rng, "base", 50.0, n), dataset(&mut rng, "target", 50.5, n)];
        group.bench_with_input(BenchmarkId::new("interval", n), &pair, |b, pair| {
            let estimator = IntervalEstimator::default();
            b.iter(|| black_box(estimator.estimate(black_box(pair)).unwrap()));
        });

        let many: Vec<_> = (0..8)
            .map(|i| dataset(&mut rng, &format!("case-{i}"), 50.0, n))
            .collect();
        group.bench_with_input(BenchmarkId::new("baseline", n), &many, |b, many| {
            let estimator = BaselineEstimator::default();
            b.iter(|| black_box(estimator.estimate(black_box(many)).unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("median", n), &pair[0], |b, d| {
            b.iter(|| black_box(median_ns(black_box(d.samples()))));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_estimators);
criterion_main!(benches);
