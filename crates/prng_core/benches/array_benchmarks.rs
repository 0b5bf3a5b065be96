//! Criterion benchmarks for prng_core aligned storage.
//!
//! Benchmarks cover:
//! - Slot construction and teardown (fill/clear cycles)
//! - Per-thread counter updates, padded vs packed (false sharing)
//! - Strided iteration

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use prng_core::AlignedArray;

const UPDATES_PER_THREAD: u64 = 100_000;

/// Benchmark in-place construction of every slot followed by clear.
fn bench_fill_clear(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill_clear");

    for capacity in [8, 64, 512] {
        group.bench_with_input(
            BenchmarkId::new("u64_x8", capacity),
            &capacity,
            |b, &n| {
                let mut array: AlignedArray<[u64; 8]> = AlignedArray::new(n, 64).unwrap();
                b.iter(|| {
                    array.fill([1; 8]);
                    black_box(array.len());
                    array.clear();
                });
            },
        );
    }

    group.finish();
}

/// Benchmark concurrent counter updates with and without cache line padding.
fn bench_false_sharing(c: &mut Criterion) {
    let mut group = c.benchmark_group("false_sharing");
    group.sample_size(20); // Each iteration spawns threads

    let n_threads = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
        .min(8);

    group.bench_function(BenchmarkId::new("packed_vec", n_threads), |b| {
        let mut counters = vec![0u64; n_threads];
        b.iter(|| {
            std::thread::scope(|scope| {
                for counter in counters.iter_mut() {
                    scope.spawn(move || {
                        for i in 0..UPDATES_PER_THREAD {
                            *black_box(&mut *counter) += i;
                        }
                    });
                }
            });
            black_box(counters.iter().sum::<u64>())
        });
    });

    group.bench_function(BenchmarkId::new("aligned_array", n_threads), |b| {
        let mut counters = AlignedArray::from_elem(n_threads, 64, 0u64).unwrap();
        b.iter(|| {
            std::thread::scope(|scope| {
                for counter in counters.iter_mut() {
                    scope.spawn(move || {
                        for i in 0..UPDATES_PER_THREAD {
                            *black_box(&mut *counter) += i;
                        }
                    });
                }
            });
            black_box(counters.iter().sum::<u64>())
        });
    });

    group.finish();
}

/// Benchmark strided iteration against a packed slice.
fn bench_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("iteration");
    let n = 4096;

    let packed: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let mut aligned: AlignedArray<f64> = AlignedArray::new(n, 64).unwrap();
    for i in 0..n {
        aligned.push(i as f64);
    }

    group.bench_function("vec_sum", |b| {
        b.iter(|| black_box(packed.iter().sum::<f64>()))
    });
    group.bench_function("aligned_sum", |b| {
        b.iter(|| black_box(aligned.iter().sum::<f64>()))
    });
    group.bench_function("aligned_rev_nth", |b| {
        b.iter(|| black_box(aligned.iter().rev().step_by(7).copied().sum::<f64>()))
    });

    group.finish();
}

criterion_group!(benches, bench_fill_clear, bench_false_sharing, bench_iteration);
criterion_main!(benches);
