// worker loop

use super::task::{RunFn, TaskRecord, TaskState};
use super::thread_pool::PoolShared;
use crate::hooks::LogLevel;
use std::sync::atomic::Ordering;
use std::sync::Arc;

pub(crate) struct Worker {
    id: usize,
    shared: Arc<PoolShared>,
}

impl Worker {
    pub(crate) fn new(shared: Arc<PoolShared>, id: usize) -> Self {
        Self { id, shared }
    }

    // main loop
    pub(crate) fn run(self) {
        let name = format!("{}-{}", self.shared.config.thread_name_prefix, self.id);
        self.shared.hooks.thread_namer.set_current_thread_name(&name);
        self.shared
            .hooks
            .logger
            .log(LogLevel::Debug, &format!("worker {} started", name));

        while let Some((record, run)) = self.next_task() {
            self.execute(record, run);
        }

        self.shared.idle.notify_all();
        self.shared
            .hooks
            .logger
            .log(LogLevel::Debug, &format!("worker {} exited", name));
    }

    /// Park until there is work or an exit condition, then claim the
    /// highest-priority record. Returns None when this worker should
    /// retire; alive-worker accounting happens before the lock is
    /// released so shrink retires exactly the excess.
    fn next_task(&self) -> Option<(Arc<TaskRecord>, RunFn)> {
        let mut state = self.shared.state.lock();

        loop {
            if state.halt {
                break;
            }
            // Shrink: this worker is excess once alive exceeds target.
            if self.shared.alive_workers.load(Ordering::Relaxed) > state.target_size {
                break;
            }

            if let Some(record) = state.queue.pop_highest() {
                {
                    let mut cell = record.cell.lock();
                    // A record cancelled between enqueue and dequeue is
                    // skipped, never run.
                    if cell.state != TaskState::Pending {
                        continue;
                    }
                    let Some(run) = cell.run.take() else {
                        continue;
                    };
                    cell.state = TaskState::Running;
                    cell.started_at = Some(self.shared.hooks.clock.now());
                    drop(cell);

                    self.shared.active_workers.fetch_add(1, Ordering::Relaxed);
                    return Some((record, run));
                }
            }

            if state.draining {
                break;
            }

            self.shared.work_available.wait(&mut state);
        }

        self.shared.alive_workers.fetch_sub(1, Ordering::Relaxed);
        None
    }

    /// Run the user closure with no pool lock held, then drive the
    /// terminal transition: state + timestamps, result delivery, stats,
    /// active-counter drop.
    fn execute(&self, record: Arc<TaskRecord>, run: RunFn) {
        let (result, deliver) = run();

        let finished = self.shared.hooks.clock.now();
        let (duration, failed) = {
            let mut cell = record.cell.lock();
            cell.finished_at = Some(finished);
            let started = cell.started_at.unwrap_or(finished);
            let failed = match result {
                Ok(()) => {
                    cell.state = TaskState::Completed;
                    false
                }
                Err(text) => {
                    cell.state = TaskState::Failed;
                    cell.error = Some(text);
                    true
                }
            };
            (finished.saturating_duration_since(started), failed)
        };

        // Complete the result channel only after the terminal state is
        // visible through the registry.
        deliver();

        if failed {
            self.shared.stats.record_failed(duration);
        } else {
            self.shared.stats.record_completed(duration);
        }

        {
            let _state = self.shared.state.lock();
            self.shared.active_workers.fetch_sub(1, Ordering::Relaxed);
        }
        self.shared.idle.notify_all();
    }
}
