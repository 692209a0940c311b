//! Benchmarks for submission and dispatch overhead

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use workpool::{Priority, ThreadPool};

fn bench_submit_wait(c: &mut Criterion) {
    let pool = ThreadPool::with_workers(4).unwrap();

    c.bench_function("submit_wait_1000", |b| {
        b.iter(|| {
            let handles: Vec<_> = (0..1000)
                .map(|i| pool.submit(move || black_box(i * i)).unwrap().0)
                .collect();
            for handle in handles {
                black_box(handle.wait());
            }
        })
    });

    pool.shutdown();
}

fn bench_priority_mix(c: &mut Criterion) {
    let pool = ThreadPool::with_workers(4).unwrap();
    let priorities = [
        Priority::Low,
        Priority::Normal,
        Priority::High,
        Priority::Critical,
    ];

    c.bench_function("priority_mix_1000", |b| {
        b.iter(|| {
            for i in 0..1000usize {
                pool.submit_with(priorities[i % 4], move || black_box(i))
                    .unwrap();
            }
            pool.wait_all();
        })
    });

    pool.shutdown();
}

criterion_group!(benches, bench_submit_wait, bench_priority_mix);
criterion_main!(benches);
