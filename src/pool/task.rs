//! Task representation and lifecycle state.

use parking_lot::Mutex;
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Unique identifier for a task within its pool.
///
/// Callers may supply their own textual id at submission; otherwise the
/// pool mints one of the form `task-<n>` from a monotonic counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(Arc<str>);

impl TaskId {
    pub(crate) fn minted(n: u64) -> Self {
        TaskId(format!("task-{}", n).into())
    }

    /// View the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        TaskId(s.into())
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        TaskId(s.into())
    }
}

impl Borrow<str> for TaskId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Priority level for task dispatch.
///
/// Higher priorities dequeue first; they never preempt running work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Priority {
    /// Lowest priority
    Low = 0,
    /// Default priority
    Normal = 1,
    /// High priority
    High = 2,
    /// Highest priority
    Critical = 3,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

/// Lifecycle state of a task.
///
/// Transitions are monotonic: `Pending -> {Running, Cancelled}` and
/// `Running -> {Completed, Failed}`. Terminal states are never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TaskState {
    /// Waiting in the queue
    Pending,
    /// Claimed by a worker and executing
    Running,
    /// Finished normally
    Completed,
    /// User code panicked
    Failed,
    /// Cancelled before dispatch
    Cancelled,
}

impl TaskState {
    /// True for Completed, Failed, and Cancelled.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Failed | TaskState::Cancelled
        )
    }
}

/// Executes the user closure; returns the bookkeeping result plus a thunk
/// that completes the result channel. The worker invokes the thunk only
/// after the terminal state is written, so waiters never observe an
/// outcome for a task the registry still reports as running.
pub(crate) type RunFn = Box<dyn FnOnce() -> (Result<(), String>, DeliverFn) + Send>;

/// Completes the result channel with the captured outcome.
pub(crate) type DeliverFn = Box<dyn FnOnce() + Send>;

/// Completes the result channel with a cancellation indication.
pub(crate) type CancelFn = Box<dyn FnOnce() + Send>;

/// One submitted work unit: immutable identity plus a mutex-guarded
/// mutable cell.
///
/// The record owns both one-shot completion closures; exactly one of them
/// ever runs, which completes the result channel exactly once. Handles
/// hold only the receiving side, so there is no ownership cycle between
/// the record and its channel.
pub(crate) struct TaskRecord {
    id: TaskId,
    priority: Priority,
    submitted_at: Instant,
    /// Submission sequence number; final tie-break in the queue ordering.
    seq: u64,
    pub(crate) cell: Mutex<TaskCell>,
}

pub(crate) struct TaskCell {
    pub(crate) state: TaskState,
    pub(crate) started_at: Option<Instant>,
    pub(crate) finished_at: Option<Instant>,
    pub(crate) error: Option<String>,
    pub(crate) run: Option<RunFn>,
    pub(crate) cancel: Option<CancelFn>,
}

impl TaskRecord {
    pub(crate) fn new(
        id: TaskId,
        priority: Priority,
        submitted_at: Instant,
        seq: u64,
        run: RunFn,
        cancel: CancelFn,
    ) -> Self {
        Self {
            id,
            priority,
            submitted_at,
            seq,
            cell: Mutex::new(TaskCell {
                state: TaskState::Pending,
                started_at: None,
                finished_at: None,
                error: None,
                run: Some(run),
                cancel: Some(cancel),
            }),
        }
    }

    pub(crate) fn id(&self) -> &TaskId {
        &self.id
    }

    pub(crate) fn priority(&self) -> Priority {
        self.priority
    }

    pub(crate) fn submitted_at(&self) -> Instant {
        self.submitted_at
    }

    pub(crate) fn seq(&self) -> u64 {
        self.seq
    }

    /// Snapshot the observable fields.
    pub(crate) fn info(&self) -> TaskInfo {
        let cell = self.cell.lock();
        TaskInfo {
            id: self.id.clone(),
            priority: self.priority,
            state: cell.state,
            submitted_at: self.submitted_at,
            started_at: cell.started_at,
            finished_at: cell.finished_at,
            error: cell.error.clone(),
        }
    }
}

impl fmt::Debug for TaskRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRecord")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .field("seq", &self.seq)
            .finish_non_exhaustive()
    }
}

/// Observable snapshot of one task's lifecycle.
#[derive(Debug, Clone)]
pub struct TaskInfo {
    /// Task identifier.
    pub id: TaskId,
    /// Priority declared at submission.
    pub priority: Priority,
    /// Lifecycle state at snapshot time.
    pub state: TaskState,
    /// Monotonic timestamp set at enqueue.
    pub submitted_at: Instant,
    /// Set when a worker claims the task.
    pub started_at: Option<Instant>,
    /// Set on the terminal transition out of Running.
    pub finished_at: Option<Instant>,
    /// Diagnostic text, populated only on failure.
    pub error: Option<String>,
}

/// Render a panic payload to diagnostic text, best-effort.
pub(crate) fn panic_text(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
