//! workpool - priority worker-pool runtime
//!
//! A cross-platform worker-pool runtime: tasks submitted from many
//! producers execute on a bounded set of long-lived worker threads,
//! highest declared priority first, with per-task lifecycle tracking,
//! cancellation, and incrementally maintained statistics.
//!
//! # Quick Start
//!
//! ```no_run
//! use workpool::prelude::*;
//!
//! let pool = ThreadPool::with_workers(4).unwrap();
//!
//! let (handle, id) = pool.submit(|| 21 * 2).unwrap();
//! assert_eq!(handle.wait().value(), Some(42));
//!
//! println!("task {} done, {:?}", id, pool.stats());
//! pool.shutdown();
//! ```
//!
//! # Features
//!
//! - **Priority Dispatch**: CRITICAL > HIGH > NORMAL > LOW, FIFO within a
//!   class by submit instant; running work is never preempted
//! - **Task Lifecycle**: every task is observable as PENDING, RUNNING,
//!   COMPLETED, FAILED, or CANCELLED, with timestamps and diagnostics
//! - **Result Handles**: each submission returns a single-consumer handle
//!   with blocking, timed, and non-blocking readiness queries
//! - **Cancellation**: pending tasks can be cancelled individually or in
//!   bulk; running work always finishes
//! - **Dynamic Resize**: grow immediately, shrink by target convergence
//! - **Graceful and Forced Shutdown**: drain everything, or cancel the
//!   backlog and stop after in-flight work
//! - **Statistics**: completion/failure/cancellation totals, running mean
//!   and percentile task durations
//! - **Injected Collaborators**: logger, thread-naming hook, and
//!   monotonic clock are capabilities; no-ops work everywhere

// Lint configuration
#![warn(missing_docs, missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod hooks;
pub mod pool;
pub mod prelude;
pub mod runtime;
pub mod stats;

// Re-export key types at crate root
pub use config::{Config, ConfigBuilder};
pub use error::{Error, Result};
pub use pool::{Priority, TaskHandle, TaskId, TaskInfo, TaskOutcome, TaskState, ThreadPool};
pub use runtime::{handle, init, init_with_config, shutdown, Runtime};
pub use stats::ThreadPoolStats;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_submit() {
        let pool = ThreadPool::with_workers(2).unwrap();

        let (handle, _id) = pool.submit(|| 2 + 2).unwrap();
        assert_eq!(handle.wait().value(), Some(4));

        pool.shutdown();
    }

    #[test]
    fn test_many_tasks() {
        let pool = ThreadPool::with_workers(4).unwrap();

        let handles: Vec<_> = (0..100)
            .map(|i| pool.submit(move || i * 2).unwrap().0)
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.wait().value(), Some(i * 2));
        }

        pool.shutdown();
    }

    #[test]
    fn test_priorities_accepted() {
        let pool = ThreadPool::with_workers(2).unwrap();

        for priority in [
            Priority::Low,
            Priority::Normal,
            Priority::High,
            Priority::Critical,
        ] {
            let (handle, _id) = pool.submit_with(priority, move || priority).unwrap();
            assert_eq!(handle.wait().value(), Some(priority));
        }

        pool.shutdown();
    }
}
