//! Criterion benchmarks for prng_parallel.
//!
//! Benchmarks cover:
//! - Raw engine throughput (Lcg64, Lcg64Shift)
//! - Leapfrog split cost against thread count
//! - Uniform and normal sampling through a slot
//! - Parallel sampling over all slots vs a single shared stream

use std::sync::Mutex;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use prng_parallel::{Lcg64, Lcg64Shift, ParallelRngPool, SplittableRng};
use rand::RngCore;

/// Benchmark raw 64-bit draws.
fn bench_engines(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_next_u64");

    group.bench_function("lcg64", |b| {
        let mut rng = Lcg64::from_seed_u64(42);
        b.iter(|| black_box(rng.next_u64()))
    });
    group.bench_function("lcg64_shift", |b| {
        let mut rng = Lcg64Shift::from_seed_u64(42);
        b.iter(|| black_box(rng.next_u64()))
    });

    group.finish();
}

/// Benchmark splitting, which is O(log streams).
fn bench_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("split");

    for streams in [2usize, 64, 4096] {
        group.bench_with_input(BenchmarkId::new("last_stream", streams), &streams, |b, &s| {
            b.iter(|| {
                let mut rng = Lcg64Shift::from_seed_u64(42);
                rng.split(s, s - 1).unwrap();
                black_box(rng)
            })
        });
    }

    group.finish();
}

/// Benchmark sampling through one slot.
fn bench_slot_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("slot_sampling");

    for n_samples in [1_000, 10_000, 100_000] {
        group.bench_with_input(
            BenchmarkId::new("uniform_vec", n_samples),
            &n_samples,
            |b, &n| {
                let mut pool: ParallelRngPool = ParallelRngPool::with_seed_and_threads(42, 1).unwrap();
                b.iter(|| black_box(pool.uniform_vec(n)))
            },
        );
        group.bench_with_input(
            BenchmarkId::new("normal_vec", n_samples),
            &n_samples,
            |b, &n| {
                let mut pool: ParallelRngPool = ParallelRngPool::with_seed_and_threads(42, 1).unwrap();
                b.iter(|| black_box(pool.normal_vec(n)))
            },
        );
    }

    group.finish();
}

/// Benchmark parallel sampling: one slot per thread vs one locked stream.
fn bench_parallel(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel_sampling");
    group.sample_size(20); // Reduce sample size for slower benchmarks

    let n_threads = rayon::current_num_threads();
    let per_thread = 50_000;

    group.bench_function(BenchmarkId::new("per_thread_slots", n_threads), |b| {
        let mut pool: ParallelRngPool =
            ParallelRngPool::with_seed_and_threads(42, n_threads).unwrap();
        b.iter(|| {
            let sums = pool.par_map_slots(|_, mut slot| {
                let mut sum = 0.0;
                for _ in 0..per_thread {
                    sum += slot.normal();
                }
                sum
            });
            black_box(sums)
        })
    });

    group.bench_function(BenchmarkId::new("shared_locked_stream", n_threads), |b| {
        let shared = Mutex::new(Lcg64Shift::from_seed_u64(42));
        b.iter(|| {
            rayon::scope(|s| {
                for _ in 0..n_threads {
                    s.spawn(|_| {
                        let mut acc = 0u64;
                        for _ in 0..per_thread {
                            acc ^= shared.lock().unwrap().next_u64();
                        }
                        black_box(acc);
                    });
                }
            })
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_engines,
    bench_split,
    bench_slot_sampling,
    bench_parallel
);
criterion_main!(benches);
