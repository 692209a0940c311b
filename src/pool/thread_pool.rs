//! Pool controller: submission, cancellation, resize, shutdown.

use super::handle::{TaskHandle, TaskOutcome};
use super::queue::PendingQueue;
use super::registry::TaskRegistry;
use super::task::{
    panic_text, CancelFn, DeliverFn, Priority, RunFn, TaskId, TaskInfo, TaskRecord, TaskState,
};
use super::worker::Worker;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::hooks::{Hooks, LogLevel};
use crate::stats::{PoolStats, ThreadPoolStats};
use crossbeam_channel::bounded;
use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// State guarded by the pool mutex.
pub(crate) struct PoolState {
    pub(crate) queue: PendingQueue,
    pub(crate) registry: TaskRegistry,
    /// Graceful shutdown requested: drain the queue, then exit.
    pub(crate) draining: bool,
    /// Immediate shutdown requested: exit without draining.
    pub(crate) halt: bool,
    /// Desired worker count; excess workers retire on observing it.
    pub(crate) target_size: usize,
}

/// Synchronization core shared between the controller and its workers.
pub(crate) struct PoolShared {
    pub(crate) state: Mutex<PoolState>,
    /// Workers park here; signalled on submit, broadcast on control paths.
    pub(crate) work_available: Condvar,
    /// `wait_all` callers park here; broadcast when work drains.
    pub(crate) idle: Condvar,
    /// Workers executing a task right now. Mutated only under the pool
    /// mutex so the idle condvar never misses a wakeup.
    pub(crate) active_workers: AtomicUsize,
    /// Worker threads alive, including excess ones that have not yet
    /// observed a lowered target. Mutated only under the pool mutex.
    pub(crate) alive_workers: AtomicUsize,
    /// Submission sequence; also mints anonymous task ids.
    submit_seq: AtomicU64,
    next_worker_id: AtomicUsize,
    pub(crate) stats: PoolStats,
    pub(crate) hooks: Hooks,
    pub(crate) config: Config,
}

/// Priority worker pool with per-task lifecycle, cancellation, and
/// statistics.
///
/// Tasks submitted from any number of producers execute on a bounded set
/// of long-lived worker threads, highest declared priority first. Each
/// submission returns a [`TaskHandle`] observing that task's outcome and
/// a [`TaskId`] usable for status queries and cancellation.
///
/// # Example
///
/// ```no_run
/// use workpool::{Priority, ThreadPool};
///
/// let pool = ThreadPool::with_workers(4).unwrap();
/// let (handle, _id) = pool.submit_with(Priority::High, || 2 + 2).unwrap();
/// assert_eq!(handle.wait().value(), Some(4));
/// pool.shutdown();
/// ```
pub struct ThreadPool {
    shared: Arc<PoolShared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl ThreadPool {
    /// Create a pool with the default collaborators.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_collaborators(config, Hooks::default())
    }

    /// Create a pool with `count` workers and default configuration.
    pub fn with_workers(count: usize) -> Result<Self> {
        Self::new(Config::builder().num_threads(count).build()?)
    }

    /// Create a pool with injected collaborators.
    pub fn with_collaborators(config: Config, hooks: Hooks) -> Result<Self> {
        config.validate()?;

        let count = config.worker_threads();
        if count == 0 {
            return Err(Error::config("need at least 1 worker"));
        }

        // Reject clocks that run backwards before trusting them with
        // task timestamps.
        let t0 = hooks.clock.now();
        let t1 = hooks.clock.now();
        if t1 < t0 {
            return Err(Error::config("clock is not monotonic"));
        }

        let shared = Arc::new(PoolShared {
            state: Mutex::new(PoolState {
                queue: PendingQueue::new(),
                registry: TaskRegistry::new(),
                draining: false,
                halt: false,
                target_size: count,
            }),
            work_available: Condvar::new(),
            idle: Condvar::new(),
            active_workers: AtomicUsize::new(0),
            alive_workers: AtomicUsize::new(0),
            submit_seq: AtomicU64::new(0),
            next_worker_id: AtomicUsize::new(0),
            stats: PoolStats::new(),
            hooks,
            config,
        });

        let pool = Self {
            shared,
            workers: Mutex::new(Vec::with_capacity(count)),
        };

        for _ in 0..count {
            pool.spawn_worker()?;
        }

        pool.shared.hooks.logger.log(
            LogLevel::Info,
            &format!("pool initialized with {} workers", count),
        );

        Ok(pool)
    }

    /// Submit a task at normal priority with a pool-minted id.
    pub fn submit<T, F>(&self, work: F) -> Result<(TaskHandle<T>, TaskId)>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.submit_inner(None, Priority::Normal, work)
    }

    /// Submit a task at the given priority with a pool-minted id.
    pub fn submit_with<T, F>(&self, priority: Priority, work: F) -> Result<(TaskHandle<T>, TaskId)>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.submit_inner(None, priority, work)
    }

    /// Submit a task under a caller-supplied id.
    ///
    /// Fails with [`Error::DuplicateId`] if the id is already registered.
    pub fn submit_named<T, F>(
        &self,
        id: impl Into<String>,
        priority: Priority,
        work: F,
    ) -> Result<(TaskHandle<T>, TaskId)>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.submit_inner(Some(id.into()), priority, work)
    }

    fn submit_inner<T, F>(
        &self,
        id: Option<String>,
        priority: Priority,
        work: F,
    ) -> Result<(TaskHandle<T>, TaskId)>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = bounded::<TaskOutcome<T>>(1);
        let cancel_tx = tx.clone();

        let run: RunFn = Box::new(move || match catch_unwind(AssertUnwindSafe(work)) {
            Ok(value) => {
                let deliver: DeliverFn = Box::new(move || {
                    let _ = tx.send(TaskOutcome::Completed(value));
                });
                (Ok(()), deliver)
            }
            Err(payload) => {
                let text = panic_text(payload);
                let delivered = text.clone();
                let deliver: DeliverFn = Box::new(move || {
                    let _ = tx.send(TaskOutcome::Failed(delivered));
                });
                (Err(text), deliver)
            }
        });
        let cancel: CancelFn = Box::new(move || {
            let _ = cancel_tx.send(TaskOutcome::Cancelled);
        });

        let task_id = {
            let mut state = self.shared.state.lock();

            if state.draining || state.halt {
                return Err(Error::ShutdownInProgress);
            }

            let seq = self.shared.submit_seq.fetch_add(1, Ordering::Relaxed);
            let task_id = match id {
                Some(text) => {
                    let task_id = TaskId::from(text);
                    if state.registry.contains(task_id.as_str()) {
                        return Err(Error::DuplicateId(task_id.to_string()));
                    }
                    task_id
                }
                // Minted ids skip over any caller-supplied id already
                // occupying the slot.
                None => loop {
                    let candidate =
                        TaskId::minted(self.shared.submit_seq.fetch_add(1, Ordering::Relaxed));
                    if !state.registry.contains(candidate.as_str()) {
                        break candidate;
                    }
                },
            };

            let record = Arc::new(TaskRecord::new(
                task_id.clone(),
                priority,
                self.shared.hooks.clock.now(),
                seq,
                run,
                cancel,
            ));

            state.registry.put(record.clone())?;
            state.queue.insert(record);
            task_id
        };

        self.shared.work_available.notify_one();
        Ok((TaskHandle::new(task_id.clone(), rx), task_id))
    }

    /// Cancel a pending task.
    ///
    /// Returns true iff the task was PENDING and is now CANCELLED; its
    /// handle observes [`TaskOutcome::Cancelled`]. Running and terminal
    /// tasks are left untouched.
    pub fn cancel(&self, id: &str) -> bool {
        // The taken work closure is dropped outside the locks; dropping
        // it can run arbitrary captured destructors.
        let (cancel_fn, _work) = {
            let mut state = self.shared.state.lock();

            let Some(record) = state.registry.get(id) else {
                return false;
            };

            let taken = {
                let mut cell = record.cell.lock();
                if cell.state != TaskState::Pending {
                    return false;
                }
                cell.state = TaskState::Cancelled;
                (cell.cancel.take(), cell.run.take())
            };

            state.queue.drain_matching(|record| record.id().as_str() == id);
            taken
        };

        if let Some(cancel_fn) = cancel_fn {
            cancel_fn();
        }
        self.shared.stats.record_cancelled();
        self.shared.idle.notify_all();
        true
    }

    /// Cancel every pending task, returning how many were cancelled.
    pub fn cancel_all_pending(&self) -> usize {
        let cancel_fns = {
            let mut state = self.shared.state.lock();
            cancel_drained(state.queue.drain())
        };

        let count = cancel_fns.len();
        for (cancel_fn, _work) in cancel_fns {
            cancel_fn();
            self.shared.stats.record_cancelled();
        }
        self.shared.idle.notify_all();
        count
    }

    /// Block until the queue is empty and no worker is executing a task.
    pub fn wait_all(&self) {
        let mut state = self.shared.state.lock();
        while !(state.queue.is_empty() && self.shared.active_workers.load(Ordering::Relaxed) == 0)
        {
            self.shared.idle.wait(&mut state);
        }
    }

    /// Like [`wait_all`](Self::wait_all), but gives up after `timeout`.
    ///
    /// Returns false on timeout; submitted tasks remain in progress.
    pub fn wait_all_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.state.lock();
        loop {
            if state.queue.is_empty() && self.shared.active_workers.load(Ordering::Relaxed) == 0 {
                return true;
            }
            if self.shared.idle.wait_until(&mut state, deadline).timed_out() {
                return state.queue.is_empty()
                    && self.shared.active_workers.load(Ordering::Relaxed) == 0;
            }
        }
    }

    /// Change the target worker count.
    ///
    /// Growth spawns workers immediately. Shrink is best-effort: excess
    /// workers exit at their next loop iteration, so [`size`](Self::size)
    /// may read above the target until they converge.
    pub fn resize(&self, new_count: usize) -> Result<()> {
        if new_count == 0 {
            return Err(Error::config("cannot resize to zero workers"));
        }

        let to_spawn = {
            let mut state = self.shared.state.lock();
            if state.draining || state.halt {
                return Err(Error::ShutdownInProgress);
            }
            state.target_size = new_count;
            new_count.saturating_sub(self.shared.alive_workers.load(Ordering::Relaxed))
        };

        for _ in 0..to_spawn {
            self.spawn_worker()?;
        }

        // Wake everyone so excess workers observe the lowered target.
        self.shared.work_available.notify_all();
        Ok(())
    }

    /// Graceful shutdown: workers drain all pending work, then exit.
    ///
    /// Blocks until every worker has been joined. After return no new
    /// submissions are accepted and every previously-submitted
    /// non-cancelled task has reached a terminal state. Calling this a
    /// second time is a no-op.
    pub fn shutdown(&self) {
        let first = {
            let mut state = self.shared.state.lock();
            let first = !state.draining && !state.halt;
            state.draining = true;
            first
        };

        if first {
            self.shared
                .hooks
                .logger
                .log(LogLevel::Info, "pool shutting down");
        }

        self.shared.work_available.notify_all();
        self.join_workers();
        self.shared.idle.notify_all();
    }

    /// Immediate shutdown: pending tasks are drained and CANCELLED; a
    /// worker mid-task finishes that one task, then exits.
    pub fn force_shutdown(&self) {
        let (first, cancel_fns) = {
            let mut state = self.shared.state.lock();
            let first = !state.halt;
            state.halt = true;
            (first, cancel_drained(state.queue.drain()))
        };

        if first {
            self.shared
                .hooks
                .logger
                .log(LogLevel::Info, "pool force shutdown");
        }

        for (cancel_fn, _work) in cancel_fns {
            cancel_fn();
            self.shared.stats.record_cancelled();
        }

        self.shared.work_available.notify_all();
        self.join_workers();
        self.shared.idle.notify_all();
    }

    /// Snapshot of the pool statistics.
    pub fn stats(&self) -> ThreadPoolStats {
        let queue_size = self.shared.state.lock().queue.len();
        self.shared
            .stats
            .snapshot(queue_size, self.active_workers(), self.size())
    }

    /// Drop a terminal task's record from the registry, freeing its id
    /// for reuse.
    ///
    /// Returns false while the task is unknown, pending, or running.
    pub fn evict(&self, id: &str) -> bool {
        let mut state = self.shared.state.lock();
        let Some(record) = state.registry.get(id) else {
            return false;
        };
        if !record.cell.lock().state.is_terminal() {
            return false;
        }
        state.registry.remove(id);
        true
    }

    /// Observable snapshot of one task, or None if the id is unknown.
    pub fn task_info(&self, id: &str) -> Option<TaskInfo> {
        let state = self.shared.state.lock();
        state.registry.get(id).map(|record| record.info())
    }

    /// Observable snapshots of every registered task.
    pub fn task_infos(&self) -> Vec<TaskInfo> {
        self.shared.state.lock().registry.snapshot()
    }

    /// Worker threads currently alive.
    pub fn size(&self) -> usize {
        self.shared.alive_workers.load(Ordering::Relaxed)
    }

    /// Workers executing a task right now.
    pub fn active_workers(&self) -> usize {
        self.shared.active_workers.load(Ordering::Relaxed)
    }

    /// Tasks waiting in the queue.
    pub fn pending_count(&self) -> usize {
        self.shared.state.lock().queue.len()
    }

    /// True once graceful or immediate shutdown has been requested.
    pub fn is_shutting_down(&self) -> bool {
        let state = self.shared.state.lock();
        state.draining || state.halt
    }

    fn spawn_worker(&self) -> Result<()> {
        let id = self.shared.next_worker_id.fetch_add(1, Ordering::Relaxed);
        let name = format!("{}-{}", self.shared.config.thread_name_prefix, id);

        let mut builder = thread::Builder::new().name(name);
        if let Some(stack_size) = self.shared.config.stack_size {
            builder = builder.stack_size(stack_size);
        }

        {
            let _state = self.shared.state.lock();
            self.shared.alive_workers.fetch_add(1, Ordering::Relaxed);
        }

        let shared = self.shared.clone();
        let handle = builder
            .spawn(move || Worker::new(shared, id).run())
            .map_err(|e| {
                let _state = self.shared.state.lock();
                self.shared.alive_workers.fetch_sub(1, Ordering::Relaxed);
                Error::executor(format!("spawn failed: {}", e))
            })?;

        self.workers.lock().push(handle);
        Ok(())
    }

    fn join_workers(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut workers = self.workers.lock();
            workers.drain(..).collect()
        };
        for handle in handles {
            let _ = handle.join();
        }
    }
}

/// Mark drained records cancelled, collecting their completion thunks.
/// The taken work closures ride along so the caller drops them with no
/// lock held.
fn cancel_drained(drained: Vec<Arc<TaskRecord>>) -> Vec<(CancelFn, Option<RunFn>)> {
    let mut cancel_fns = Vec::with_capacity(drained.len());
    for record in drained {
        let mut cell = record.cell.lock();
        if cell.state == TaskState::Pending {
            cell.state = TaskState::Cancelled;
            let work = cell.run.take();
            if let Some(cancel_fn) = cell.cancel.take() {
                cancel_fns.push((cancel_fn, work));
            }
        }
    }
    cancel_fns
}

impl fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("ThreadPool")
            .field("workers", &self.size())
            .field("active_workers", &self.active_workers())
            .field("pending", &state.queue.len())
            .field("registered", &state.registry.len())
            .finish()
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
