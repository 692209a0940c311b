//! Priority-ordered container for pending tasks.

use super::task::TaskRecord;
use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::sync::Arc;

/// Heap entry; ordering reads the record's immutable identity fields.
struct QueueEntry(Arc<TaskRecord>);

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == CmpOrdering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        // BinaryHeap is a max-heap: higher priority first, then earlier
        // submit instant, then lower submission sequence.
        self.0
            .priority()
            .cmp(&other.0.priority())
            .then_with(|| other.0.submitted_at().cmp(&self.0.submitted_at()))
            .then_with(|| other.0.seq().cmp(&self.0.seq()))
    }
}

/// Ordered container of PENDING task records.
///
/// Dequeue order is a strict weak ordering on `(priority, submit
/// instant)`: higher priority rank first, earlier submission first within
/// a class. The queue holds no synchronization of its own; every access
/// happens under the pool mutex.
#[derive(Default)]
pub(crate) struct PendingQueue {
    heap: BinaryHeap<QueueEntry>,
}

impl PendingQueue {
    pub(crate) fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    pub(crate) fn insert(&mut self, record: Arc<TaskRecord>) {
        self.heap.push(QueueEntry(record));
    }

    /// Remove and return the highest-priority record.
    pub(crate) fn pop_highest(&mut self) -> Option<Arc<TaskRecord>> {
        self.heap.pop().map(|entry| entry.0)
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Move every record out, leaving the queue empty.
    pub(crate) fn drain(&mut self) -> Vec<Arc<TaskRecord>> {
        std::mem::take(&mut self.heap)
            .into_iter()
            .map(|entry| entry.0)
            .collect()
    }

    /// Remove and return the records matching `predicate`.
    pub(crate) fn drain_matching<F>(&mut self, predicate: F) -> Vec<Arc<TaskRecord>>
    where
        F: Fn(&TaskRecord) -> bool,
    {
        let mut matched = Vec::new();
        let mut kept = BinaryHeap::with_capacity(self.heap.len());

        for entry in std::mem::take(&mut self.heap) {
            if predicate(&entry.0) {
                matched.push(entry.0);
            } else {
                kept.push(entry);
            }
        }

        self.heap = kept;
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::task::{DeliverFn, Priority, TaskId, TaskRecord};
    use std::time::{Duration, Instant};

    fn record(id: &str, priority: Priority, submitted_at: Instant, seq: u64) -> Arc<TaskRecord> {
        Arc::new(TaskRecord::new(
            TaskId::from(id),
            priority,
            submitted_at,
            seq,
            Box::new(|| (Ok(()), Box::new(|| {}) as DeliverFn)),
            Box::new(|| {}),
        ))
    }

    #[test]
    fn pops_in_priority_order() {
        let base = Instant::now();
        let mut queue = PendingQueue::new();

        queue.insert(record("a", Priority::Low, base, 0));
        queue.insert(record("b", Priority::Critical, base, 1));
        queue.insert(record("c", Priority::Normal, base, 2));
        queue.insert(record("d", Priority::High, base, 3));

        let order: Vec<String> = std::iter::from_fn(|| queue.pop_highest())
            .map(|r| r.id().to_string())
            .collect();
        assert_eq!(order, ["b", "d", "c", "a"]);
    }

    #[test]
    fn fifo_within_a_priority_class() {
        let base = Instant::now();
        let mut queue = PendingQueue::new();

        queue.insert(record("late", Priority::Normal, base + Duration::from_micros(2), 2));
        queue.insert(record("early", Priority::Normal, base, 0));
        queue.insert(record("mid", Priority::Normal, base + Duration::from_micros(1), 1));

        let order: Vec<String> = std::iter::from_fn(|| queue.pop_highest())
            .map(|r| r.id().to_string())
            .collect();
        assert_eq!(order, ["early", "mid", "late"]);
    }

    #[test]
    fn equal_instants_fall_back_to_submission_sequence() {
        let base = Instant::now();
        let mut queue = PendingQueue::new();

        queue.insert(record("second", Priority::High, base, 8));
        queue.insert(record("first", Priority::High, base, 3));

        assert_eq!(queue.pop_highest().unwrap().id().as_str(), "first");
        assert_eq!(queue.pop_highest().unwrap().id().as_str(), "second");
    }

    #[test]
    fn drain_empties_the_queue() {
        let base = Instant::now();
        let mut queue = PendingQueue::new();
        for i in 0..5 {
            queue.insert(record(&format!("t{}", i), Priority::Normal, base, i));
        }

        let drained = queue.drain();
        assert_eq!(drained.len(), 5);
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn drain_matching_keeps_the_rest_ordered() {
        let base = Instant::now();
        let mut queue = PendingQueue::new();
        queue.insert(record("keep-low", Priority::Low, base, 0));
        queue.insert(record("drop", Priority::High, base, 1));
        queue.insert(record("keep-high", Priority::Critical, base, 2));

        let dropped = queue.drain_matching(|r| r.id().as_str() == "drop");
        assert_eq!(dropped.len(), 1);
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.pop_highest().unwrap().id().as_str(), "keep-high");
        assert_eq!(queue.pop_highest().unwrap().id().as_str(), "keep-low");
    }
}
