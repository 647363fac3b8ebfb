use criterion::{criterion_group, criterion_main, Criterion, BenchmarkId, Throughput};
use worker_pool::{ResultBatch, WorkerPool};
use std::hint::black_box;

// Benchmark 1: Enqueue overhead
fn bench_enqueue_overhead(c: &mut Criterion) {
    let mut group = c.benchmark_group("enqueue_overhead");

    for size in [100u64, 1000, 10000] {
        group.throughput(Throughput::Elements(size));

        // отдельный handle на задачу
        group.bench_with_input(
            BenchmarkId::new("with_handle", size),
            &size,
            |b, &size| {
                let pool = WorkerPool::new(num_cpus::get()).unwrap();
                b.iter(|| {
                    let handles: Vec<_> = (0..size)
                        .map(|i| pool.enqueue(move || black_box(i)).unwrap())
                        .collect();
                    for mut handle in handles {
                        black_box(handle.get().unwrap());
                    }
                });
            },
        );

        // без handle
        group.bench_with_input(
            BenchmarkId::new("detached", size),
            &size,
            |b, &size| {
                b.iter(|| {
                    let pool = WorkerPool::new(num_cpus::get()).unwrap();
                    for i in 0..size {
                        pool.execute(move || { black_box(i); }).unwrap();
                    }
                    // drop дожидается всей очереди
                    drop(pool);
                });
            },
        );
    }

    group.finish();
}

// Benchmark 2: Batch vs inline
fn bench_batch_vs_inline(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_vs_inline");
    group.sample_size(20);

    let tasks = 10_000u64;
    group.throughput(Throughput::Elements(tasks));

    group.bench_function("pool_batch_10k", |b| {
        let pool = WorkerPool::new(num_cpus::get()).unwrap();
        b.iter(|| {
            let mut batch = ResultBatch::with_pool(&pool);
            for i in 0..tasks {
                batch.add(move || black_box(i * i)).unwrap();
            }
            black_box(batch.get().unwrap());
        });
    });

    group.bench_function("inline_batch_10k", |b| {
        b.iter(|| {
            let mut batch = ResultBatch::new();
            for i in 0..tasks {
                batch.add(move || black_box(i * i)).unwrap();
            }
            black_box(batch.get().unwrap());
        });
    });

    group.finish();
}

// Benchmark 3: Thread count scaling
fn bench_thread_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("thread_scaling");
    group.sample_size(20);

    let tasks = 5000u64;
    group.throughput(Throughput::Elements(tasks));

    for threads in [1usize, 2, 4, 8, 16] {
        if threads <= num_cpus::get() * 2 {
            group.bench_with_input(
                BenchmarkId::new("threads", threads),
                &threads,
                |b, &threads| {
                    let pool = WorkerPool::new(threads).unwrap();
                    b.iter(|| {
                        let mut batch = ResultBatch::with_pool(&pool);
                        for i in 0..tasks {
                            batch.add(move || {
                                // немного реальной работы на задачу
                                (0..64u64).fold(i, |acc, x| acc.wrapping_mul(31).wrapping_add(x))
                            }).unwrap();
                        }
                        black_box(batch.get().unwrap());
                    });
                },
            );
        }
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_enqueue_overhead,
    bench_batch_vs_inline,
    bench_thread_scaling
);
criterion_main!(benches);
