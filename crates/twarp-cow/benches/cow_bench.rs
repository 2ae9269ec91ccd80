//! Criterion benchmarks for twarp-cow: alignment and reference selection.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use twarp_cow::{CowConfig, ReferenceMode, Signal, SignalMatrix, select_reference};

fn make_chromatogram(n: usize, shift: f64) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64 - shift;
            let len = n as f64;
            (-((t - 0.3 * len) / 6.0).powi(2)).exp()
                + 0.7 * (-((t - 0.55 * len) / 4.0).powi(2)).exp()
                + 0.4 * (-((t - 0.8 * len) / 8.0).powi(2)).exp()
        })
        .collect()
}

fn make_samples(rows: usize, n: usize) -> SignalMatrix {
    SignalMatrix::new(
        (0..rows)
            .map(|r| make_chromatogram(n, (r % 7) as f64 - 3.0))
            .collect(),
    )
    .unwrap()
}

fn bench_align(c: &mut Criterion) {
    let lengths = [256usize, 1024];
    let params: &[(usize, usize)] = &[(20, 2), (40, 5)];

    let mut group = c.benchmark_group("cow_align");

    for &len in &lengths {
        for &(seg, slack) in params {
            let id = BenchmarkId::new(format!("len{len}"), format!("seg{seg}_slack{slack}"));
            let reference = Signal::new(make_chromatogram(len, 0.0)).unwrap();
            let samples = make_samples(8, len);
            let config = CowConfig::uniform(seg, slack);

            group.bench_with_input(id, &(reference, samples, config), |bencher, (r, s, cfg)| {
                bencher.iter(|| cfg.align(r, s).unwrap());
            });
        }
    }

    group.finish();
}

fn bench_reference(c: &mut Criterion) {
    let samples = make_samples(40, 512);

    c.bench_function("reference_max_correlation_40x512", |b| {
        b.iter(|| select_reference(&samples, ReferenceMode::MaxCorrelation));
    });
}

criterion_group!(benches, bench_align, bench_reference);
criterion_main!(benches);
