//! Injected collaborator capabilities.
//!
//! The pool consumes three narrow capabilities: a level-tagged logger for
//! lifecycle narration, an optional thread-naming hook invoked by each
//! worker at startup, and a monotonic clock for task timestamps. All three
//! have production defaults and no-op implementations, and the pool is
//! fully functional with the no-ops.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Level-tagged record emission capability.
pub trait Logger: Send + Sync {
    /// Emit one log record.
    fn log(&self, level: LogLevel, message: &str);
}

/// Logger that forwards records to the `tracing` macros.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Trace => tracing::trace!("{}", message),
            LogLevel::Debug => tracing::debug!("{}", message),
            LogLevel::Info => tracing::info!("{}", message),
            LogLevel::Warn => tracing::warn!("{}", message),
            LogLevel::Error => tracing::error!("{}", message),
        }
    }
}

/// Logger that discards every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn log(&self, _level: LogLevel, _message: &str) {}
}

/// Optional capability for naming the current OS thread.
///
/// Workers call this once at startup with a name of the form
/// `<prefix>-<id>`. The pool already names threads through
/// `thread::Builder`, so the default implementation does nothing;
/// embedders with platform naming APIs can supply their own.
pub trait ThreadNamer: Send + Sync {
    fn set_current_thread_name(&self, name: &str);
}

/// Thread namer that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopThreadNamer;

impl ThreadNamer for NoopThreadNamer {
    fn set_current_thread_name(&self, _name: &str) {}
}

/// Monotonic time source for task timestamps.
///
/// Abstracted as a trait so tests can inject a controlled clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Production clock backed by the platform monotonic clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Bundle of the collaborators a pool consumes.
#[derive(Clone)]
pub struct Hooks {
    pub logger: Arc<dyn Logger>,
    pub thread_namer: Arc<dyn ThreadNamer>,
    pub clock: Arc<dyn Clock>,
}

impl Hooks {
    /// Collaborators that do nothing; the pool must work with these.
    pub fn noop() -> Self {
        Self {
            logger: Arc::new(NoopLogger),
            thread_namer: Arc::new(NoopThreadNamer),
            clock: Arc::new(MonotonicClock),
        }
    }
}

impl Default for Hooks {
    fn default() -> Self {
        Self {
            logger: Arc::new(TracingLogger),
            thread_namer: Arc::new(NoopThreadNamer),
            clock: Arc::new(MonotonicClock),
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_clock_never_goes_backwards() {
        let clock = MonotonicClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn noop_hooks_are_usable() {
        let hooks = Hooks::noop();
        hooks.logger.log(LogLevel::Info, "ignored");
        hooks.thread_namer.set_current_thread_name("ignored");
        let _ = hooks.clock.now();
    }
}
