use crate::error::Error;
use crate::hash::{ShardHash, ShardHasher};
use std::sync::Arc;

/// Default number of shards.
pub const DEFAULT_SHARD_COUNT: usize = 1024;
/// Default capacity hint for each shard's backing map.
pub const DEFAULT_SHARD_INITIAL_CAPACITY: usize = 64;

/// Which hash function to use for shard assignment.
#[derive(Clone, Default)]
pub enum HashFunction {
    /// XXH64 (default, fast and well-distributed).
    #[default]
    XxHash,
    /// Classic 64-bit FNV.
    Fnv,
    /// ahash with fixed keys.
    AHash,
    /// Use fxhash (faster but potentially less distributed).
    #[cfg(feature = "fxhash")]
    FxHash,
    /// User-provided hash.
    Custom(Arc<dyn ShardHash>),
}

impl std::fmt::Debug for HashFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HashFunction::XxHash => write!(f, "HashFunction::XxHash"),
            HashFunction::Fnv => write!(f, "HashFunction::Fnv"),
            HashFunction::AHash => write!(f, "HashFunction::AHash"),
            #[cfg(feature = "fxhash")]
            HashFunction::FxHash => write!(f, "HashFunction::FxHash"),
            HashFunction::Custom(_) => write!(f, "HashFunction::Custom(...)"),
        }
    }
}

/// Number of workers used when none is configured: one per available core.
pub fn default_worker_pool_size() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Configuration for a ConcurrentMap instance.
///
/// Setters validate eagerly; [`ConcurrentMap::with_config`](crate::ConcurrentMap::with_config)
/// validates again so a hand-assembled config can't slip through.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) shard_count: usize,
    pub(crate) shard_initial_capacity: usize,
    pub(crate) hash_function: HashFunction,
    pub(crate) worker_pool_size: usize,
    pub(crate) worker_queue_capacity: Option<usize>,
}

impl Config {
    /// Create a new config with defaults (1024 shards, xxhash, one worker per core).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of shards. Must be greater than 0.
    pub fn shard_count(mut self, count: usize) -> Result<Self, Error> {
        if count == 0 {
            return Err(Error::InvalidShardCount);
        }
        self.shard_count = count;
        Ok(self)
    }

    /// Set the initial capacity of each shard's backing map.
    pub fn shard_initial_capacity(mut self, capacity: usize) -> Self {
        self.shard_initial_capacity = capacity;
        self
    }

    /// Set the hash function to use.
    pub fn hash_function(mut self, hash_fn: HashFunction) -> Self {
        self.hash_function = hash_fn;
        self
    }

    /// Set the number of persistent workers backing `keys_parallel`. Must be greater than 0.
    pub fn worker_pool_size(mut self, size: usize) -> Result<Self, Error> {
        if size == 0 {
            return Err(Error::InvalidPoolSize);
        }
        self.worker_pool_size = size;
        Ok(self)
    }

    /// Set the bounded task queue capacity. Defaults to the worker count.
    pub fn worker_queue_capacity(mut self, capacity: usize) -> Result<Self, Error> {
        if capacity == 0 {
            return Err(Error::InvalidQueueCapacity);
        }
        self.worker_queue_capacity = Some(capacity);
        Ok(self)
    }

    /// Number of shards.
    pub fn get_shard_count(&self) -> usize {
        self.shard_count
    }

    /// Capacity hint per shard.
    pub fn get_shard_initial_capacity(&self) -> usize {
        self.shard_initial_capacity
    }

    /// Configured hash function.
    pub fn get_hash_function(&self) -> &HashFunction {
        &self.hash_function
    }

    /// Number of pool workers.
    pub fn get_worker_pool_size(&self) -> usize {
        self.worker_pool_size
    }

    /// Effective task queue capacity.
    pub fn get_worker_queue_capacity(&self) -> usize {
        self.worker_queue_capacity.unwrap_or(self.worker_pool_size)
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.shard_count == 0 {
            return Err(Error::InvalidShardCount);
        }
        if self.worker_pool_size == 0 {
            return Err(Error::InvalidPoolSize);
        }
        if self.worker_queue_capacity == Some(0) {
            return Err(Error::InvalidQueueCapacity);
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shard_count: DEFAULT_SHARD_COUNT,
            shard_initial_capacity: DEFAULT_SHARD_INITIAL_CAPACITY,
            hash_function: HashFunction::XxHash,
            worker_pool_size: default_worker_pool_size(),
            worker_queue_capacity: None,
        }
    }
}

/// Builder for creating a ConcurrentMap with custom configuration.
pub struct ConcurrentMapBuilder {
    config: Config,
}

impl ConcurrentMapBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Set the number of shards. Must be greater than 0.
    pub fn shard_count(mut self, count: usize) -> Result<Self, Error> {
        self.config = self.config.shard_count(count)?;
        Ok(self)
    }

    /// Set the initial capacity of each shard's backing map.
    pub fn shard_initial_capacity(mut self, capacity: usize) -> Self {
        self.config = self.config.shard_initial_capacity(capacity);
        self
    }

    /// Set the hash function to use.
    pub fn hash_function(mut self, hash_fn: HashFunction) -> Self {
        self.config = self.config.hash_function(hash_fn);
        self
    }

    /// Set the number of pool workers. Must be greater than 0.
    pub fn worker_pool_size(mut self, size: usize) -> Result<Self, Error> {
        self.config = self.config.worker_pool_size(size)?;
        Ok(self)
    }

    /// Set the bounded task queue capacity. Must be greater than 0.
    pub fn worker_queue_capacity(mut self, capacity: usize) -> Result<Self, Error> {
        self.config = self.config.worker_queue_capacity(capacity)?;
        Ok(self)
    }

    /// Build a ConcurrentMap with the configured settings.
    pub fn build<V>(self) -> Result<crate::ConcurrentMap<V>, Error>
    where
        V: Send + Sync + 'static,
    {
        crate::ConcurrentMap::with_config(self.config)
    }
}

impl Default for ConcurrentMapBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a hash function instance based on the configuration.
pub(crate) fn create_hasher(hash_fn: &HashFunction) -> ShardHasher {
    match hash_fn {
        HashFunction::XxHash => ShardHasher::XxHash,
        HashFunction::Fnv => ShardHasher::Fnv,
        HashFunction::AHash => ShardHasher::AHash,
        #[cfg(feature = "fxhash")]
        HashFunction::FxHash => ShardHasher::FxHash,
        HashFunction::Custom(hash) => ShardHasher::Custom(Arc::clone(hash)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.get_shard_count(), DEFAULT_SHARD_COUNT);
        assert_eq!(config.get_shard_initial_capacity(), DEFAULT_SHARD_INITIAL_CAPACITY);
        assert!(matches!(config.get_hash_function(), HashFunction::XxHash));
        assert_eq!(config.get_worker_pool_size(), default_worker_pool_size());
        assert_eq!(config.get_worker_queue_capacity(), config.get_worker_pool_size());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_queue_capacity_follows_pool_size() {
        let config = Config::new().worker_pool_size(3).unwrap();
        assert_eq!(config.get_worker_queue_capacity(), 3);

        let config = config.worker_queue_capacity(10).unwrap();
        assert_eq!(config.get_worker_queue_capacity(), 10);
        assert_eq!(config.get_worker_pool_size(), 3);
    }

    #[test]
    fn test_rejects_zero() {
        assert_eq!(
            Config::new().shard_count(0).unwrap_err(),
            Error::InvalidShardCount
        );
        assert_eq!(
            Config::new().worker_pool_size(0).unwrap_err(),
            Error::InvalidPoolSize
        );
        assert_eq!(
            Config::new().worker_queue_capacity(0).unwrap_err(),
            Error::InvalidQueueCapacity
        );
    }

    #[test]
    fn test_any_positive_shard_count() {
        // Routing is modulo, so non powers of two are fine.
        for count in [1, 2, 7, 50, 1000] {
            assert_eq!(Config::new().shard_count(count).unwrap().get_shard_count(), count);
        }
    }

    #[test]
    fn test_validate_catches_hand_assembled_config() {
        let mut config = Config::default();
        config.shard_count = 0;
        assert_eq!(config.validate().unwrap_err(), Error::InvalidShardCount);

        let mut config = Config::default();
        config.worker_pool_size = 0;
        assert_eq!(config.validate().unwrap_err(), Error::InvalidPoolSize);
    }

    #[test]
    fn test_hash_function_debug() {
        assert_eq!(format!("{:?}", HashFunction::default()), "HashFunction::XxHash");
        let custom = HashFunction::Custom(Arc::new(crate::hash::Fnv64));
        assert_eq!(format!("{:?}", custom), "HashFunction::Custom(...)");
    }
}
