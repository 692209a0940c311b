//! Error types for the workpool runtime.

/// Result type alias for workpool operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the workpool runtime.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Submission was rejected because shutdown has been requested
    #[error("pool is shutting down")]
    ShutdownInProgress,

    /// Caller-supplied task id collides with a live registry entry
    #[error("duplicate task id: {0}")]
    DuplicateId(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Worker spawn or executor error
    #[error("executor error: {0}")]
    Executor(String),

    /// Runtime not initialized
    #[error("runtime not initialized - call workpool::init() first")]
    NotInitialized,

    /// Runtime already initialized
    #[error("runtime already initialized")]
    AlreadyInitialized,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create an executor error
    pub fn executor<S: Into<String>>(msg: S) -> Self {
        Error::Executor(msg.into())
    }
}
