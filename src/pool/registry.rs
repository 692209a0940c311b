//! Id-to-record mapping backing status queries.

use super::task::{TaskId, TaskInfo, TaskRecord};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Mapping from task identifier to task record.
///
/// Source of truth for external status queries. Records stay registered
/// from submission until pool shutdown. Accessed only under the pool
/// mutex; no internal locking.
#[derive(Default)]
pub(crate) struct TaskRegistry {
    map: HashMap<TaskId, Arc<TaskRecord>>,
}

impl TaskRegistry {
    pub(crate) fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Register a record, failing if its id is already live.
    pub(crate) fn put(&mut self, record: Arc<TaskRecord>) -> Result<()> {
        if self.map.contains_key(record.id().as_str()) {
            return Err(Error::DuplicateId(record.id().to_string()));
        }
        self.map.insert(record.id().clone(), record);
        Ok(())
    }

    pub(crate) fn get(&self, id: &str) -> Option<&Arc<TaskRecord>> {
        self.map.get(id)
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.map.contains_key(id)
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<Arc<TaskRecord>> {
        self.map.remove(id)
    }

    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    /// Copy the observable fields of every record.
    pub(crate) fn snapshot(&self) -> Vec<TaskInfo> {
        self.map.values().map(|record| record.info()).collect()
    }
}
