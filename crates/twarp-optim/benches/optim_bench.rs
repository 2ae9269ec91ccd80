//! Criterion benchmarks for twarp-optim: scoring and the full search.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use twarp_cow::{Signal, SignalMatrix};
use twarp_optim::{OptimizeConfig, SearchSpace, simplicity};

fn make_chromatogram(n: usize, shift: f64) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64 - shift;
            let len = n as f64;
            (-((t - 0.35 * len) / 5.0).powi(2)).exp() + 0.6 * (-((t - 0.7 * len) / 7.0).powi(2)).exp()
        })
        .collect()
}

fn make_samples(rows: usize, n: usize) -> SignalMatrix {
    SignalMatrix::new(
        (0..rows)
            .map(|r| make_chromatogram(n, (r % 5) as f64 - 2.0))
            .collect(),
    )
    .unwrap()
}

fn bench_simplicity(c: &mut Criterion) {
    let mut group = c.benchmark_group("simplicity");
    for &(rows, n) in &[(10usize, 200usize), (40, 500)] {
        let samples = make_samples(rows, n);
        group.bench_with_input(BenchmarkId::from_parameter(format!("{rows}x{n}")), &samples, |b, s| {
            b.iter(|| simplicity(s));
        });
    }
    group.finish();
}

fn bench_optimize(c: &mut Criterion) {
    let samples = make_samples(6, 120);
    let reference = Signal::new(make_chromatogram(120, 0.0)).unwrap();
    let config = OptimizeConfig::new(SearchSpace::new(10, 30, 1, 5).unwrap());

    let mut group = c.benchmark_group("optimize");
    group.sample_size(10);
    group.bench_function("6x120_seg10-30_slack1-5", |b| {
        b.iter(|| config.optimize(&samples, Some(&reference)).unwrap());
    });
    group.finish();
}

criterion_group!(benches, bench_simplicity, bench_optimize);
criterion_main!(benches);
