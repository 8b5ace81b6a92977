//! composition counter benchmarks
//!
//! Usage:
//!   cargo bench -p shroud-odds                 # run all benchmarks
//!   cargo bench -p shroud-odds -- counter      # inclusion–exclusion only
//!   cargo bench -p shroud-odds -- exact        # full trustee tables

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use shroud_odds::{exact_recovery_cdf, BoundedCompositionCounter, RecoveryParams, Scheme};

fn bench_counter(c: &mut Criterion) {
    let mut group = c.benchmark_group("counter");
    for bins in [4usize, 8, 12, 16] {
        let counter = BoundedCompositionCounter::new(vec![6; bins]).unwrap();
        group.bench_function(BenchmarkId::new("capped_bins", bins), |b| {
            b.iter(|| black_box(counter.count(black_box(3 * bins as i64))))
        });
    }
    group.finish();
}

fn bench_exact(c: &mut Criterion) {
    let mut group = c.benchmark_group("exact");
    group.sample_size(10);
    for beta in [6usize, 10, 14] {
        let params = RecoveryParams {
            trustees: 20,
            anonymity: 150,
            subsecrets: beta,
            absolute_threshold: 3,
            leaf_threshold_percent: 50,
        };
        group.bench_function(BenchmarkId::new("subsecrets", beta), |b| {
            b.iter(|| exact_recovery_cdf(black_box(&params), &Scheme::Additive).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_counter, bench_exact);
criterion_main!(benches);
