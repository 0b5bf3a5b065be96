//! Integration tests for thread-partitioned sampling.
//!
//! Covers reproducibility across reseeds, independence and cache-line
//! separation of slots, the leapfrog relationship with a single stream,
//! and sampling from inside rayon parallel regions.

use std::sync::Mutex;

use approx::assert_abs_diff_eq;
use prng_core::AlignedArray;
use prng_parallel::{
    ErasedGenerator, Lcg64, Lcg64Shift, ParallelRngPool, PoolConfig, SplittableRng,
};
use proptest::prelude::*;
use rand::{Rng, RngCore};
use rayon::prelude::*;

const SEED: u64 = 42;
const N_SAMPLE: usize = 100;

fn check_sample_uniform(sample: &[f64]) {
    for (i, &r) in sample.iter().enumerate() {
        assert!(r.is_finite());
        assert!((0.0..1.0).contains(&r), "sample {i} = {r} outside [0, 1)");
        if i > 0 {
            assert_ne!(r, sample[i - 1], "successive samples equal");
        }
    }
}

fn check_sample_normal(sample: &[f64]) {
    for (i, &r) in sample.iter().enumerate() {
        assert!(r.is_finite());
        if i > 0 {
            assert_ne!(r, sample[i - 1], "successive samples equal");
        }
    }
}

fn pool(threads: usize) -> ParallelRngPool {
    ParallelRngPool::with_seed_and_threads(SEED, threads).unwrap()
}

#[test]
fn seed_is_repeatable() {
    let mut m = pool(1);
    assert_eq!(m.init_seed(), SEED);
    let r = m.next_u64();
    assert_eq!(m.init_seed(), SEED);

    m.seed(SEED).unwrap();
    assert_eq!(m.init_seed(), SEED, "init_seed not reset on call to seed()");
    assert_eq!(m.next_u64(), r, "seeding is not repeatable");

    m.seed(SEED >> 1).unwrap();
    assert_ne!(m.next_u64(), r, "reseeding does not change rng");
}

#[test]
fn reset_is_repeatable() {
    let mut m = pool(1);
    let r = m.next_u64();
    m.reset().unwrap();
    assert_eq!(m.init_seed(), SEED);
    assert_eq!(m.next_u64(), r);

    m.reset_with_seed(SEED >> 1).unwrap();
    assert_ne!(m.next_u64(), r);
}

#[test]
fn set_init_seed() {
    let mut m = pool(2);
    m.seed(SEED - 1).unwrap();
    assert_eq!(m.init_seed(), SEED - 1);
}

#[test]
fn scalar_bounds() {
    let mut m = pool(2);
    let uniform: Vec<f64> = (0..N_SAMPLE).map(|_| m.uniform()).collect();
    check_sample_uniform(&uniform);
    let normal: Vec<f64> = (0..N_SAMPLE).map(|_| m.normal()).collect();
    check_sample_normal(&normal);
}

#[test]
fn vector_and_matrix_bounds() {
    let mut m = pool(2);
    check_sample_uniform(&m.uniform_vec(N_SAMPLE));
    check_sample_normal(&m.normal_vec(N_SAMPLE));

    let u = m.uniform_matrix(N_SAMPLE, 3);
    assert_eq!(u.shape(), (N_SAMPLE, 3));
    check_sample_uniform(u.as_slice());

    let z = m.normal_matrix(4, N_SAMPLE);
    assert_eq!(z.shape(), (4, N_SAMPLE));
    check_sample_normal(z.as_slice());
}

#[test]
fn normal_moments_per_slot() {
    let mut m = pool(4);
    for mut slot in m.slots_mut() {
        let z = slot.normal_vec(40_000);
        let n = z.len() as f64;
        let mean = z.iter().sum::<f64>() / n;
        let var = z.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
        assert_abs_diff_eq!(mean, 0.0, epsilon = 0.03);
        assert_abs_diff_eq!(var, 1.0, epsilon = 0.04);
    }
}

#[test]
fn resample_categories() {
    let mut m = pool(1);
    let weights: Vec<f64> = (0..20)
        .map(|i| if i % 3 == 0 { 0.0 } else { i as f64 })
        .collect();
    let sample = m.resample_n(&weights, N_SAMPLE).unwrap();
    assert_eq!(sample.len(), N_SAMPLE);
    for &i in &sample {
        assert!(i < weights.len());
        assert!(weights[i] > 0.0, "category {i} has zero weight");
    }
}

#[test]
fn slots_are_on_separate_cache_lines() {
    let mut m = pool(4);
    let alignment = m.alignment();
    let addresses: Vec<usize> = m
        .slots_mut()
        .map(|mut slot| slot.generator() as *mut Lcg64Shift as usize)
        .collect();
    for pair in addresses.windows(2) {
        assert_eq!(pair[0] % alignment, 0);
        assert!(pair[1] - pair[0] >= alignment);
    }
}

#[test]
fn slots_leapfrog_one_stream() {
    let threads = 4;
    let draws = 25;
    let mut whole = Lcg64Shift::from_seed_u64(SEED);
    let sequence: Vec<u64> = (0..threads * draws).map(|_| whole.next_u64()).collect();

    let mut m = pool(threads);
    let mut interleaved = vec![0u64; threads * draws];
    for mut slot in m.slots_mut() {
        let id = slot.id();
        for k in 0..draws {
            interleaved[id + k * threads] = slot.next_u64();
        }
    }
    assert_eq!(interleaved, sequence);
}

#[test]
fn par_for_each_slot_is_deterministic() {
    let threads = 6;
    let mut m = pool(threads);
    let mut results = AlignedArray::from_elem(threads, 64, 0.0f64).unwrap();

    let collected = Mutex::new(Vec::new());
    m.par_for_each_slot(|id, mut slot| {
        let sum: f64 = slot.uniform_vec(1000).iter().sum();
        collected.lock().unwrap().push((id, sum));
    });
    for (id, sum) in collected.into_inner().unwrap() {
        results[id] = sum;
    }

    m.reset().unwrap();
    for (id, mut slot) in m.slots_mut().enumerate() {
        let sum: f64 = slot.uniform_vec(1000).iter().sum();
        assert_eq!(results[id], sum, "slot {id}");
    }
}

#[test]
fn implicit_slot_inside_rayon_pool() {
    let threads = 3;
    let workers = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .unwrap();
    let mut m = pool(threads);

    let firsts = workers.install(|| m.par_map_slots(|_, mut slot| slot.next_u64()));
    assert_eq!(firsts.len(), threads);

    // From a worker thread, the implicit API lands in that worker's slot.
    m.reset().unwrap();
    let (id, value) = workers.install(|| (rayon::current_thread_index(), m.next_u64()));
    let id = id.unwrap();
    assert!(id < threads);
    assert_eq!(value, firsts[id]);
}

#[test]
fn erased_generator_feeds_rand_distributions() {
    let mut m = pool(1);
    let mut erased: ErasedGenerator<'_> = m.generic_generator();
    let x: f64 = erased.gen_range(-1.0..1.0);
    assert!((-1.0..1.0).contains(&x));
    let dice: u8 = erased.gen_range(1..=6);
    assert!((1..=6).contains(&dice));
}

#[test]
fn pool_from_config_file_contents() {
    let config = PoolConfig::from_toml_str("seed = 42\nthreads = 2\nalignment = 128").unwrap();
    let mut from_config: ParallelRngPool = ParallelRngPool::from_config(&config).unwrap();
    let mut direct = pool(2);
    assert_eq!(from_config.alignment(), 128);
    assert_eq!(from_config.uniform_vec(8), direct.uniform_vec(8));
}

#[test]
fn lcg64_pool_in_f32() {
    let mut m: ParallelRngPool<Lcg64, f32> =
        ParallelRngPool::with_seed_and_threads(SEED, 2).unwrap();
    let draws: Vec<f32> = (0..N_SAMPLE).map(|_| m.uniform()).collect();
    assert!(draws.iter().all(|u| (0.0..1.0).contains(u)));
}

#[test]
fn parallel_sums_match_serial_sums() {
    let mut m = pool(4);
    let parallel: Vec<f64> =
        m.par_map_slots(|_, mut slot| slot.normal_vec(500).into_par_iter().sum::<f64>());
    m.reset().unwrap();
    let serial: Vec<f64> = m
        .slots_mut()
        .map(|mut slot| slot.normal_vec(500).into_iter().sum::<f64>())
        .collect();
    for (p, s) in parallel.iter().zip(&serial) {
        assert_abs_diff_eq!(*p, *s, epsilon = 1e-9);
    }
}

proptest! {
    #[test]
    fn prop_leapfrog_split(seed in any::<u64>(), streams in 1usize..12, offset in 0usize..12) {
        let index = offset % streams;
        let mut whole = Lcg64::from_seed_u64(seed);
        let sequence: Vec<u64> = (0..streams * 8).map(|_| whole.next_u64()).collect();

        let mut part = Lcg64::from_seed_u64(seed);
        part.split(streams, index).unwrap();
        for k in 0..8 {
            prop_assert_eq!(part.next_u64(), sequence[index + k * streams]);
        }
    }

    #[test]
    fn prop_reseed_reproduces(seed in any::<u64>(), threads in 1usize..6) {
        let mut m: ParallelRngPool = ParallelRngPool::with_seed_and_threads(seed, threads).unwrap();
        let first: Vec<u64> = m.slots_mut().map(|mut s| s.next_u64()).collect();
        m.seed(seed).unwrap();
        let second: Vec<u64> = m.slots_mut().map(|mut s| s.next_u64()).collect();
        prop_assert_eq!(first, second);
    }
}
