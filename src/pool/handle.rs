//! Caller-visible result handles.

use super::task::TaskId;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::fmt;
use std::time::Duration;

/// Terminal outcome of a task, delivered through its result handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome<T> {
    /// The work closure returned normally.
    Completed(T),
    /// The work closure panicked; the text is the captured diagnostic.
    Failed(String),
    /// The task was cancelled before dispatch.
    Cancelled,
}

impl<T> TaskOutcome<T> {
    /// True when the task finished normally.
    pub fn is_completed(&self) -> bool {
        matches!(self, TaskOutcome::Completed(_))
    }

    /// True when the task failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, TaskOutcome::Failed(_))
    }

    /// True when the task was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TaskOutcome::Cancelled)
    }

    /// The completed value, if any.
    pub fn value(self) -> Option<T> {
        match self {
            TaskOutcome::Completed(value) => Some(value),
            _ => None,
        }
    }
}

/// Single-consumer handle to one task's outcome, returned by `submit`.
///
/// The handle is safe to drop without consuming: the task still executes
/// and its outcome is discarded. Waiting never disturbs the task.
pub struct TaskHandle<T> {
    id: TaskId,
    outcome: Receiver<TaskOutcome<T>>,
}

impl<T> TaskHandle<T> {
    pub(crate) fn new(id: TaskId, outcome: Receiver<TaskOutcome<T>>) -> Self {
        Self { id, outcome }
    }

    /// The id of the task this handle observes.
    pub fn id(&self) -> &TaskId {
        &self.id
    }

    /// Non-blocking readiness check.
    pub fn is_ready(&self) -> bool {
        !self.outcome.is_empty()
    }

    /// Block until the task reaches a terminal state.
    pub fn wait(self) -> TaskOutcome<T> {
        // A disconnect without a message means the pool was torn down
        // before the task turned terminal; report it as cancelled.
        self.outcome.recv().unwrap_or(TaskOutcome::Cancelled)
    }

    /// Block for at most `timeout`; on timeout the handle is returned
    /// unchanged so the caller can keep waiting later.
    ///
    /// A zero timeout is a plain not-ready probe.
    pub fn wait_timeout(self, timeout: Duration) -> Result<TaskOutcome<T>, TaskHandle<T>> {
        match self.outcome.recv_timeout(timeout) {
            Ok(outcome) => Ok(outcome),
            Err(RecvTimeoutError::Timeout) => Err(self),
            Err(RecvTimeoutError::Disconnected) => Ok(TaskOutcome::Cancelled),
        }
    }
}

impl<T> fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.id)
            .field("ready", &self.is_ready())
            .finish()
    }
}
