//! Convenient re-exports for common workpool types and traits.
//!
//! This module provides a single import for most common use cases:
//! ```
//! use workpool::prelude::*;
//! ```

pub use crate::config::{Config, ConfigBuilder};
pub use crate::error::{Error, Result};
pub use crate::hooks::{Hooks, LogLevel, Logger};
pub use crate::pool::{Priority, TaskHandle, TaskId, TaskInfo, TaskOutcome, TaskState, ThreadPool};
pub use crate::stats::ThreadPoolStats;

#[doc(inline)]
pub use crate::{init, init_with_config, shutdown};
