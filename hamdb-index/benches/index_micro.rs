//! Criterion microbenchmarks for insert / find / remove on the
//! multi-index at several resident sizes.
//!
//! Run with: `cargo bench --bench index_micro`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hamdb_core::Key;
use hamdb_index::Partitioning;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const BITS: u32 = 64;
const TOLERANCE: u32 = 4;

fn populated_index(n: usize) -> Partitioning<hamdb_index::MapStore> {
    let index = Partitioning::unbounded(BITS, TOLERANCE).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    for _ in 0..n {
        index.insert(&Key::from_u64(rng.gen(), BITS)).unwrap();
    }
    index
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for n in [1_000usize, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let index = populated_index(n);
            let mut rng = ChaCha8Rng::seed_from_u64(99);
            b.iter(|| {
                let key = Key::from_u64(rng.gen(), BITS);
                black_box(index.insert(&key).unwrap());
            });
        });
    }
    group.finish();
}

fn bench_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("find");
    for n in [1_000usize, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let index = populated_index(n);
            // Queries near indexed keys, so candidate tallies are non-trivial.
            let mut data = ChaCha8Rng::seed_from_u64(42);
            let mut jitter = ChaCha8Rng::seed_from_u64(7);
            b.iter(|| {
                let base: u64 = data.gen();
                let query = Key::from_u64(base, BITS).flip(jitter.gen_range(0..BITS));
                black_box(index.find(&query).unwrap());
            });
        });
    }
    group.finish();
}

fn bench_toggle(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_remove");
    group.bench_function(BenchmarkId::from_parameter(10_000), |b| {
        let index = populated_index(10_000);
        let mut rng = ChaCha8Rng::seed_from_u64(123);
        b.iter(|| {
            let key = Key::from_u64(rng.gen(), BITS);
            index.insert(&key).unwrap();
            black_box(index.remove(&key).unwrap());
        });
    });
    group.finish();
}

criterion_group!(benches, bench_insert, bench_find, bench_toggle);
criterion_main!(benches);
