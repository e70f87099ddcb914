//! Criterion benchmarks for the bounded tree reduce.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use fanout_bench::{bench_engine, int_profile, stress_len};

fn bench_reduce_cutoffs(c: &mut Criterion) {
    let input = int_profile(stress_len());
    let mut group = c.benchmark_group("reduce_sum_1m");
    for cutoff in [256, 2048, 16384, 131072] {
        let engine = bench_engine(8, cutoff).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(cutoff), &cutoff, |b, _| {
            b.iter(|| {
                let sum = engine.reduce(&input, |a, b| a.wrapping_add(*b)).unwrap();
                black_box(sum);
            });
        });
    }
    group.finish();
}

fn bench_reduce_sequential(c: &mut Criterion) {
    let input = int_profile(stress_len());
    let engine = bench_engine(1, 2048).unwrap();
    c.bench_function("reduce_sum_1m_single_worker", |b| {
        b.iter(|| {
            let sum = engine.reduce(&input, |a, b| a.wrapping_add(*b)).unwrap();
            black_box(sum);
        });
    });
}

criterion_group!(benches, bench_reduce_cutoffs, bench_reduce_sequential);
criterion_main!(benches);
