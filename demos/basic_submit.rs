//! Basic submission example

use workpool::prelude::*;

fn main() {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    println!("=== Basic Submission Example ===\n");

    workpool::init().expect("Failed to initialize workpool");
    let pool = workpool::handle().unwrap();

    let handles: Vec<_> = (0..10)
        .map(|i| pool.submit(move || i * i).unwrap())
        .collect();

    for (handle, id) in handles {
        match handle.wait() {
            TaskOutcome::Completed(value) => println!("task {} -> {}", id, value),
            other => println!("task {} -> {:?}", id, other),
        }
    }

    let stats = pool.stats();
    println!(
        "\ncompleted={} failed={} avg={:.3}ms",
        stats.completed_total, stats.failed_total, stats.average_duration_ms
    );

    workpool::shutdown();
    println!("\n=== Example Complete ===");
}
