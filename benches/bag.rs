//! # Bag Benchmarks
//!
//! Measures the allocator paths that walk the entry chain.
//!
//! | Benchmark            | What it measures                                  |
//! |----------------------|---------------------------------------------------|
//! | `insert/N`           | N inserts into a fresh in-memory bag              |
//! | `churn/N`            | remove + reinsert in a bag holding N strings      |
//! | `list/N`             | listing a bag holding N strings                   |
//! | `mmap_insert/N`      | N inserts into a file-backed bag, including growth|
//!
//! Every insert and remove is a linear scan, so cost grows with the number
//! of entries.
//!
//! ## Running Benchmarks
//!
//! ```bash
//! cargo bench --bench bag
//! cargo bench --bench bag -- churn
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use bagdb::{Bag, BagConfig, MemRegion, Region};

fn keys(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("key-{:08}", i)).collect()
}

fn filled(keys: &[String]) -> Bag<MemRegion> {
    let mut bag = Bag::from_region(MemRegion::new(), BagConfig::default()).unwrap();
    for key in keys {
        bag.insert(key).unwrap();
    }
    bag
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");

    for n in [100usize, 1_000, 5_000] {
        let keys = keys(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &keys, |b, keys| {
            b.iter(|| black_box(filled(keys)))
        });
    }

    group.finish();
}

fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("churn");

    for n in [100usize, 1_000, 5_000] {
        let keys = keys(n);
        let mut bag = filled(&keys);
        let victim = keys[n / 2].clone();

        group.bench_function(BenchmarkId::from_parameter(n), |b| {
            b.iter(|| {
                bag.remove(black_box(&victim)).unwrap();
                bag.insert(black_box(&victim)).unwrap();
            })
        });
    }

    group.finish();
}

fn bench_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("list");

    for n in [100usize, 1_000, 5_000] {
        let bag = filled(&keys(n));
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(BenchmarkId::from_parameter(n), |b| {
            b.iter(|| black_box(bag.list().unwrap()))
        });
    }

    group.finish();
}

fn bench_mmap_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("mmap_insert");
    group.sample_size(10);

    for n in [1_000usize, 10_000] {
        let keys = keys(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &keys, |b, keys| {
            b.iter(|| {
                let dir = tempfile::tempdir().unwrap();
                let mut bag = Bag::open(dir.path().join("bench.bag")).unwrap();
                for key in keys {
                    bag.insert(key).unwrap();
                }
                bag.sync().unwrap();
                black_box(bag.region().len())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_insert, bench_churn, bench_list, bench_mmap_insert);
criterion_main!(benches);
