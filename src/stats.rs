//! Statistics aggregation for task outcomes.
//!
//! Counters live behind their own mutex, separate from the pool mutex, so
//! statistics bookkeeping never blocks submission or dispatch. Workers
//! feed the aggregator after each terminal transition; the controller
//! feeds it on cancellation.

use hdrhistogram::Histogram;
use parking_lot::Mutex;
use std::fmt;
use std::time::{Duration, Instant};

/// Incremental task-outcome counters and duration tracking.
pub struct PoolStats {
    inner: Mutex<StatsInner>,
    start_time: Instant,
}

struct StatsInner {
    completed: u64,
    failed: u64,
    cancelled: u64,
    /// Sum of durations over completed + failed, in milliseconds.
    duration_sum_ms: f64,
    /// Duration histogram in nanoseconds, for percentile reporting.
    durations: Histogram<u64>,
}

impl PoolStats {
    pub(crate) fn new() -> Self {
        // 3 significant figures, max value of 1 hour in nanoseconds
        let durations =
            Histogram::new_with_max(3_600_000_000_000, 3).expect("failed to create histogram");

        Self {
            inner: Mutex::new(StatsInner {
                completed: 0,
                failed: 0,
                cancelled: 0,
                duration_sum_ms: 0.0,
                durations,
            }),
            start_time: Instant::now(),
        }
    }

    /// Record a task that reached COMPLETED.
    pub(crate) fn record_completed(&self, duration: Duration) {
        let mut inner = self.inner.lock();
        inner.completed += 1;
        inner.observe(duration);
    }

    /// Record a task that reached FAILED.
    pub(crate) fn record_failed(&self, duration: Duration) {
        let mut inner = self.inner.lock();
        inner.failed += 1;
        inner.observe(duration);
    }

    /// Record a task cancelled while pending.
    pub(crate) fn record_cancelled(&self) {
        self.inner.lock().cancelled += 1;
    }

    /// Snapshot the counters, merging in the derived values supplied by
    /// the pool.
    pub(crate) fn snapshot(
        &self,
        queue_size: usize,
        active_workers: usize,
        workers: usize,
    ) -> ThreadPoolStats {
        let inner = self.inner.lock();
        let finished = inner.completed + inner.failed;
        let average_duration_ms = if finished == 0 {
            0.0
        } else {
            inner.duration_sum_ms / finished as f64
        };

        ThreadPoolStats {
            workers,
            active_workers,
            queue_size,
            completed_total: inner.completed,
            failed_total: inner.failed,
            cancelled_total: inner.cancelled,
            average_duration_ms,
            p50_duration_ms: inner.durations.value_at_quantile(0.50) as f64 / 1_000_000.0,
            p95_duration_ms: inner.durations.value_at_quantile(0.95) as f64 / 1_000_000.0,
            p99_duration_ms: inner.durations.value_at_quantile(0.99) as f64 / 1_000_000.0,
            uptime: self.start_time.elapsed(),
        }
    }
}

impl StatsInner {
    fn observe(&mut self, duration: Duration) {
        self.duration_sum_ms += duration.as_secs_f64() * 1000.0;
        let _ = self.durations.record(duration.as_nanos() as u64);
    }
}

impl fmt::Debug for PoolStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("PoolStats")
            .field("completed", &inner.completed)
            .field("failed", &inner.failed)
            .field("cancelled", &inner.cancelled)
            .finish_non_exhaustive()
    }
}

/// Snapshot of pool statistics at a point in time.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThreadPoolStats {
    /// Worker threads currently alive.
    pub workers: usize,
    /// Workers executing a task right now.
    pub active_workers: usize,
    /// Tasks waiting in the queue.
    pub queue_size: usize,
    /// Tasks that reached COMPLETED.
    pub completed_total: u64,
    /// Tasks that reached FAILED.
    pub failed_total: u64,
    /// Tasks cancelled while pending.
    pub cancelled_total: u64,
    /// Running mean duration over completed + failed tasks.
    pub average_duration_ms: f64,
    /// Median task duration.
    pub p50_duration_ms: f64,
    /// 95th percentile task duration.
    pub p95_duration_ms: f64,
    /// 99th percentile task duration.
    pub p99_duration_ms: f64,
    /// Time since the pool was constructed.
    pub uptime: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_tracks_sum_over_count() {
        let stats = PoolStats::new();

        stats.record_completed(Duration::from_millis(10));
        stats.record_completed(Duration::from_millis(30));
        stats.record_failed(Duration::from_millis(20));

        let snap = stats.snapshot(0, 0, 4);
        assert_eq!(snap.completed_total, 2);
        assert_eq!(snap.failed_total, 1);

        // average * (completed + failed) == sum of recorded durations
        let reconstructed =
            snap.average_duration_ms * (snap.completed_total + snap.failed_total) as f64;
        assert!((reconstructed - 60.0).abs() < 1e-6);
        assert!((snap.average_duration_ms - 20.0).abs() < 1e-6);
    }

    #[test]
    fn cancelled_tasks_do_not_move_the_average() {
        let stats = PoolStats::new();

        stats.record_completed(Duration::from_millis(50));
        stats.record_cancelled();
        stats.record_cancelled();

        let snap = stats.snapshot(0, 0, 1);
        assert_eq!(snap.cancelled_total, 2);
        assert!((snap.average_duration_ms - 50.0).abs() < 1e-6);
    }

    #[test]
    fn empty_stats_report_zero_average() {
        let stats = PoolStats::new();
        let snap = stats.snapshot(3, 1, 2);

        assert_eq!(snap.queue_size, 3);
        assert_eq!(snap.active_workers, 1);
        assert_eq!(snap.workers, 2);
        assert_eq!(snap.average_duration_ms, 0.0);
    }
}
