/// Errors that can occur when building or operating a ConcurrentMap.
///
/// Key absence is never reported through this type; lookups return `Option`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The shard count is invalid (must be greater than 0).
    InvalidShardCount,
    /// The worker pool size is invalid (must be greater than 0).
    InvalidPoolSize,
    /// The worker queue capacity is invalid (must be greater than 0).
    InvalidQueueCapacity,
    /// The OS refused to spawn a worker thread.
    WorkerSpawn(String),
    /// A task was submitted after the worker pool was closed.
    PoolClosed,
    /// A pool task died before delivering its result.
    TaskAborted,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidShardCount => write!(f, "shard count must be greater than 0"),
            Error::InvalidPoolSize => write!(f, "worker pool size must be greater than 0"),
            Error::InvalidQueueCapacity => {
                write!(f, "worker queue capacity must be greater than 0")
            }
            Error::WorkerSpawn(reason) => write!(f, "failed to spawn worker thread: {}", reason),
            Error::PoolClosed => write!(f, "worker pool is closed"),
            Error::TaskAborted => write!(f, "pool task aborted before completing"),
        }
    }
}

impl std::error::Error for Error {}
