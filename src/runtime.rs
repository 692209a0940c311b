use crate::config::Config;
use crate::error::{Error, Result};
use crate::pool::ThreadPool;
use parking_lot::RwLock;
use std::sync::Arc;

/// Process-wide lifecycle object owning a pool and its configuration.
///
/// Most callers go through the module-level [`init`]/[`shutdown`] facade;
/// embedders that want several pools construct [`ThreadPool`] directly.
pub struct Runtime {
    pool: Arc<ThreadPool>,
    config: Config,
}

impl Runtime {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let pool = ThreadPool::new(config.clone())?;

        Ok(Self {
            pool: Arc::new(pool),
            config,
        })
    }

    pub fn pool(&self) -> &Arc<ThreadPool> {
        &self.pool
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// Global runtime for the simple API
static GLOBAL_RUNTIME: RwLock<Option<Arc<Runtime>>> = RwLock::new(None);

/// Initialize the global runtime with default configuration.
pub fn init() -> Result<()> {
    init_with_config(Config::default())
}

/// Initialize the global runtime with the given configuration.
pub fn init_with_config(config: Config) -> Result<()> {
    let mut runtime = GLOBAL_RUNTIME.write();

    if runtime.is_some() {
        return Err(Error::AlreadyInitialized);
    }

    let rt = Runtime::new(config)?;
    *runtime = Some(Arc::new(rt));

    Ok(())
}

/// Access the globally initialized pool.
pub fn handle() -> Result<Arc<ThreadPool>> {
    GLOBAL_RUNTIME
        .read()
        .as_ref()
        .map(|rt| rt.pool().clone())
        .ok_or(Error::NotInitialized)
}

/// Shut the global runtime down gracefully. A no-op when nothing is
/// initialized.
pub fn shutdown() {
    let runtime = GLOBAL_RUNTIME.write().take();
    if let Some(rt) = runtime {
        rt.pool().shutdown();
    }
}
