//! Block pool benchmarks
//!
//! Compares the pool against the system allocator across single, batch,
//! growth and contended workloads

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use nebula_block_pool::{BlockPool, PoolConfig};
use std::alloc::Layout;
use std::hint::black_box;
use std::sync::Arc;
use std::thread;

/// Benchmark single allocation/deallocation cycle
fn bench_single_allocation(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_allocation");

    group.bench_function("pool_64b", |b| {
        let pool = BlockPool::with_config(64, 1024, 8, PoolConfig::production()).unwrap();

        b.iter(|| unsafe {
            let ptr = pool.allocate().unwrap();
            pool.deallocate(ptr);
            black_box(ptr);
        });
    });

    // System allocator (baseline)
    group.bench_function("system_64b", |b| {
        let layout = Layout::from_size_align(64, 8).unwrap();

        b.iter(|| unsafe {
            let ptr = std::alloc::alloc(layout);
            std::alloc::dealloc(ptr, layout);
            black_box(ptr);
        });
    });

    group.finish();
}

/// Benchmark batch allocations
fn bench_batch_allocations(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_allocations");
    group.throughput(Throughput::Elements(100));

    group.bench_function("pool_100x64b", |b| {
        let pool = BlockPool::with_config(64, 128, 8, PoolConfig::production()).unwrap();

        b.iter(|| unsafe {
            let mut ptrs = Vec::with_capacity(100);
            for _ in 0..100 {
                ptrs.push(pool.allocate().unwrap());
            }
            for ptr in ptrs.drain(..) {
                pool.deallocate(ptr);
            }
            black_box(ptrs);
        });
    });

    group.bench_function("pool_reset_100x64b", |b| {
        let pool = BlockPool::with_config(64, 128, 8, PoolConfig::production()).unwrap();

        b.iter(|| unsafe {
            for _ in 0..100 {
                black_box(pool.allocate().unwrap());
            }
            pool.reset();
        });
    });

    group.bench_function("system_100x64b", |b| {
        let layout = Layout::from_size_align(64, 8).unwrap();

        b.iter(|| unsafe {
            let mut ptrs = Vec::with_capacity(100);
            for _ in 0..100 {
                ptrs.push(std::alloc::alloc(layout));
            }
            for ptr in ptrs.drain(..) {
                std::alloc::dealloc(ptr, layout);
            }
            black_box(ptrs);
        });
    });

    group.finish();
}

/// Benchmark allocation through repeated growth from a tiny pool
fn bench_growth(c: &mut Criterion) {
    let mut group = c.benchmark_group("growth");

    for target in [64usize, 1024, 16 * 1024] {
        group.throughput(Throughput::Elements(target as u64));
        group.bench_with_input(BenchmarkId::new("grow_from_1", target), &target, |b, &n| {
            b.iter(|| {
                let pool = BlockPool::with_config(32, 1, 8, PoolConfig::production()).unwrap();
                for _ in 0..n {
                    black_box(pool.allocate().unwrap());
                }
                black_box(pool.region_count())
            });
        });
    }

    group.finish();
}

/// Benchmark contended allocation from several threads
fn bench_contention(c: &mut Criterion) {
    let mut group = c.benchmark_group("contention");
    const OPS: usize = 1_000;

    for threads in [1usize, 2, 4, 8] {
        group.throughput(Throughput::Elements((threads * OPS) as u64));
        group.bench_with_input(BenchmarkId::new("pool", threads), &threads, |b, &threads| {
            let pool = Arc::new(
                BlockPool::with_config(64, threads * 16, 8, PoolConfig::production()).unwrap(),
            );

            b.iter(|| {
                thread::scope(|scope| {
                    for _ in 0..threads {
                        let pool = Arc::clone(&pool);
                        scope.spawn(move || {
                            for _ in 0..OPS {
                                let ptr = pool.allocate().unwrap();
                                unsafe { pool.deallocate(black_box(ptr)) };
                            }
                        });
                    }
                });
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_single_allocation,
    bench_batch_allocations,
    bench_growth,
    bench_contention
);
criterion_main!(benches);
