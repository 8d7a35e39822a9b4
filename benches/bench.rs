use std::hint::black_box;
use std::sync::{Arc, Barrier};
use std::time::{Duration, Instant};

use criterion::{Criterion, criterion_group, criterion_main};
use reuse_pool::ObjectPool;

criterion_group!(benches, entrypoint);
criterion_main!(benches);

const THREADS: usize = 4;

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("object_pool");

    let pool = ObjectPool::<Vec<u8>>::with_count(64);
    group.bench_function("acquire_release", |b| {
        b.iter(|| {
            let entry = pool.acquire();
            black_box(entry.len());
        });
    });

    let pool = ObjectPool::<Vec<u8>>::with_count(64);
    group.bench_function("acquire_wait_release", |b| {
        b.iter(|| {
            let entry = pool.acquire_wait(Duration::from_millis(1));
            black_box(entry.len());
        });
    });

    group.bench_function("push_into_new_pool", |b| {
        b.iter(|| {
            let pool = ObjectPool::new();
            for i in 0..64_u64 {
                pool.push(black_box(i)).unwrap();
            }
            black_box(pool.size())
        });
    });

    group.bench_function("allocate_past_capacity", |b| {
        b.iter(|| {
            let pool = ObjectPool::<u64>::new();
            let entries: Vec<_> = (0..64).map(|i| pool.allocate(|| i).unwrap()).collect();
            black_box(entries.len())
        });
    });

    group.bench_function("contended_acquire_blocking", |b| {
        b.iter_custom(|iters| {
            let pool = ObjectPool::<u64>::with_count(THREADS / 2);
            let barrier = Arc::new(Barrier::new(THREADS + 1));
            let workers: Vec<_> = (0..THREADS)
                .map(|_| {
                    let pool = pool.clone();
                    let barrier = barrier.clone();
                    std::thread::spawn(move || {
                        barrier.wait();
                        for _ in 0..iters {
                            let mut entry = pool.acquire_blocking();
                            *entry += 1;
                        }
                    })
                })
                .collect();

            barrier.wait();
            let start = Instant::now();
            for worker in workers {
                worker.join().unwrap();
            }
            start.elapsed()
        });
    });

    group.finish();
}
