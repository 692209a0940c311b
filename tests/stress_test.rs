//! Stress tests for the workpool runtime

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use workpool::{Priority, ThreadPool};

#[test]
#[ignore] // Run with --ignored flag
fn stress_many_producers() {
    let pool = Arc::new(ThreadPool::with_workers(8).unwrap());
    let executed = Arc::new(AtomicUsize::new(0));

    let producers: Vec<_> = (0..8)
        .map(|_| {
            let pool = pool.clone();
            let executed = executed.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    let executed = executed.clone();
                    pool.submit(move || {
                        executed.fetch_add(1, Ordering::Relaxed);
                    })
                    .unwrap();
                }
            })
        })
        .collect();

    for producer in producers {
        producer.join().unwrap();
    }

    pool.wait_all();
    assert_eq!(executed.load(Ordering::Relaxed), 1600);
    assert_eq!(pool.stats().completed_total, 1600);

    pool.shutdown();
}

#[test]
#[ignore]
fn stress_concurrent_submit_and_cancel() {
    let pool = Arc::new(ThreadPool::with_workers(4).unwrap());

    let submitters: Vec<_> = (0..4)
        .map(|producer| {
            let pool = pool.clone();
            thread::spawn(move || {
                for i in 0..500 {
                    let id = format!("p{}-t{}", producer, i);
                    pool.submit_named(id.clone(), Priority::Normal, || std::hint::black_box(0))
                        .unwrap();

                    if i % 3 == 0 {
                        // Races dispatch on purpose; either outcome is fine.
                        pool.cancel(&id);
                    }
                }
            })
        })
        .collect();

    for submitter in submitters {
        submitter.join().unwrap();
    }

    pool.wait_all();
    let stats = pool.stats();
    assert_eq!(
        stats.completed_total + stats.failed_total + stats.cancelled_total,
        2000
    );
    assert_eq!(stats.failed_total, 0);

    pool.shutdown();
}

#[test]
#[ignore]
fn stress_resize_churn() {
    let pool = Arc::new(ThreadPool::with_workers(4).unwrap());
    let done = Arc::new(AtomicUsize::new(0));

    let resizer = {
        let pool = pool.clone();
        thread::spawn(move || {
            for round in 0..50 {
                pool.resize(1 + (round % 8)).unwrap();
                thread::sleep(Duration::from_millis(5));
            }
        })
    };

    for _ in 0..2000 {
        let done = done.clone();
        pool.submit(move || {
            done.fetch_add(1, Ordering::Relaxed);
        })
        .unwrap();
    }

    resizer.join().unwrap();
    pool.wait_all();
    assert_eq!(done.load(Ordering::Relaxed), 2000);

    pool.shutdown();
}

#[test]
#[ignore]
fn stress_repeated_startup_shutdown() {
    for _ in 0..20 {
        let pool = ThreadPool::with_workers(4).unwrap();
        for i in 0..50 {
            pool.submit(move || i * i).unwrap();
        }
        pool.shutdown();
        assert_eq!(pool.stats().completed_total, 50);
    }
}
