//! Criterion timings for every catalog variant.
//!
//! One benchmark group per workload, one function per variant label, so the
//! criterion HTML report lines the implementation styles up side by side.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use paired_workload_bench::catalog;

fn bench_catalog(c: &mut Criterion) {
    for workload in catalog::all() {
        let mut group = c.benchmark_group(workload.name());
        group.sample_size(20);

        for variant in workload.variants() {
            group.bench_function(variant.label(), |bencher| {
                bencher.iter(|| black_box(variant.execute()))
            });
        }

        group.finish();
    }
}

criterion_group!(benches, bench_catalog);
criterion_main!(benches);
