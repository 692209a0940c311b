//! Task priorities example

use workpool::prelude::*;

fn main() {
    println!("=== Task Priorities Example ===\n");

    // One worker makes the dispatch order visible.
    let pool = ThreadPool::with_workers(1).expect("Failed to create pool");

    println!("Submitting tasks with different priorities...");

    // Hold the worker so everything below queues up.
    let (gate_tx, gate_rx) = crossbeam_channel::bounded::<()>(1);
    pool.submit(move || {
        let _ = gate_rx.recv();
    })
    .unwrap();

    for i in 0..3 {
        pool.submit_with(Priority::Low, move || {
            println!("[LOW] background task {}", i);
        })
        .unwrap();
    }

    for i in 0..2 {
        pool.submit_with(Priority::Critical, move || {
            println!("[CRITICAL] urgent task {}", i);
        })
        .unwrap();
    }

    pool.submit_with(Priority::Normal, move || {
        println!("[NORMAL] regular task");
    })
    .unwrap();

    println!("Releasing the worker; critical tasks dispatch first.\n");
    gate_tx.send(()).unwrap();

    pool.wait_all();
    println!("\nAll tasks completed!");

    pool.shutdown();
    println!("\n=== Example Complete ===");
}
