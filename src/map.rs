use crate::config::Config;
use crate::error::Error;
use crate::pool::WorkerPool;
use crate::stats::{ShardOps, Stats};
use crate::table::ShardTable;
use crossbeam_channel::{bounded, unbounded};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Concurrent string-keyed map split across independently locked shards.
///
/// Every keyed operation hashes the key, locks exactly one shard for its
/// duration, and releases it on every exit path. Whole-map operations visit
/// shards one at a time and never hold two shard locks together, so they
/// are not a global snapshot: a write racing with `len` or `keys` may or may
/// not be observed.
///
/// The map owns a [`WorkerPool`] used by [`keys_parallel`](Self::keys_parallel).
/// Call [`close`](Self::close) when done with it; dropping the map closes
/// the pool as well.
///
/// # Example
///
/// ```rust
/// use cmap::ConcurrentMap;
///
/// let map = ConcurrentMap::new();
/// map.set("key1", "value1");
///
/// if let Some(value) = map.get("key1") {
///     println!("Found: {}", value);
/// }
/// map.close();
/// ```
pub struct ConcurrentMap<V> {
    table: Arc<ShardTable<V>>,
    pool: WorkerPool,
    config: Config,
}

impl<V> ConcurrentMap<V>
where
    V: Send + Sync + 'static,
{
    /// Create a new map with defaults (1024 shards, xxhash, one worker per core).
    ///
    /// # Panics
    ///
    /// Panics if the OS refuses to start the worker threads. Use
    /// [`with_config`](Self::with_config) to handle that as an error.
    pub fn new() -> Self {
        Self::with_config(Config::default()).expect("failed to start worker pool")
    }

    /// Create a new map with custom config.
    pub fn with_config(config: Config) -> Result<Self, Error> {
        config.validate()?;

        let table = ShardTable::new(
            config.shard_count,
            config.shard_initial_capacity,
            &config.hash_function,
        );
        let pool = WorkerPool::new(
            config.get_worker_pool_size(),
            config.get_worker_queue_capacity(),
        )?;

        debug!(
            shard_count = config.shard_count,
            shard_initial_capacity = config.shard_initial_capacity,
            hash_function = ?config.hash_function,
            worker_pool_size = pool.size(),
            "concurrent map created"
        );

        Ok(Self {
            table: Arc::new(table),
            pool,
            config,
        })
    }

    /// The configuration this map was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of shards.
    pub fn shard_count(&self) -> usize {
        self.table.len()
    }

    /// Which shard this key routes to.
    pub fn shard_index(&self, key: &str) -> usize {
        self.table.shard_index(key)
    }

    /// The underlying shard table, for callers that want to lock shards themselves.
    pub fn table(&self) -> &ShardTable<V> {
        &self.table
    }

    /// Insert or overwrite. Returns the old value if the key existed.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cmap::ConcurrentMap;
    ///
    /// let map = ConcurrentMap::new();
    /// assert!(map.set("key", "value").is_none());
    /// assert_eq!(map.set("key", "new_value"), Some("value"));
    /// ```
    pub fn set(&self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        let shard = self.table.get_shard(&key);
        let previous = shard.write().set(key, value);
        shard.stats().record_write();
        previous
    }

    /// Get a clone of the value stored under `key`.
    ///
    /// For values that are expensive to clone, use [`get_locked`](Self::get_locked)
    /// or store an `Arc<T>`.
    pub fn get(&self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        let shard = self.table.get_shard(key);
        let value = shard.read().get(key).cloned();
        if value.is_some() {
            shard.stats().record_read();
        }
        value
    }

    /// Run `f` against the stored value while the shard's shared lock is held.
    ///
    /// `f` sees `None` when the key is absent. Whatever it returns is handed
    /// back, which lets a caller derive data from a value without cloning it.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cmap::ConcurrentMap;
    ///
    /// let map = ConcurrentMap::new();
    /// map.set("foobar", "123456".to_string());
    ///
    /// let len = map.get_locked("foobar", |v| v.map(|s| s.len()));
    /// assert_eq!(len, Some(6));
    /// ```
    pub fn get_locked<R, F>(&self, key: &str, f: F) -> R
    where
        F: FnOnce(Option<&V>) -> R,
    {
        let shard = self.table.get_shard(key);
        let bucket = shard.read();
        let value = bucket.get(key);
        if value.is_some() {
            shard.stats().record_read();
        }
        f(value)
    }

    /// Check whether a key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.table.get_shard(key).read().contains_key(key)
    }

    /// Remove a key, returning its value if it existed.
    pub fn remove(&self, key: &str) -> Option<V> {
        let shard = self.table.get_shard(key);
        let removed = shard.write().remove(key);
        if removed.is_some() {
            shard.stats().record_remove();
        }
        removed
    }

    /// Compute and store a new value from the current one, atomically.
    ///
    /// `f` receives the current value (`None` if absent) and its result is
    /// written back and returned. The read and the write happen under one
    /// exclusive lock acquisition, so concurrent upserts on a key never lose
    /// an update.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cmap::ConcurrentMap;
    ///
    /// let map = ConcurrentMap::new();
    /// assert_eq!(map.upsert("counter", |old| old.map_or(1, |n| n + 1)), 1);
    /// assert_eq!(map.upsert("counter", |old| old.map_or(1, |n| n + 1)), 2);
    /// ```
    pub fn upsert<F>(&self, key: impl Into<String>, f: F) -> V
    where
        F: FnOnce(Option<&V>) -> V,
        V: Clone,
    {
        let key = key.into();
        let shard = self.table.get_shard(&key);
        let mut bucket = shard.write();
        let value = f(bucket.get(&key));
        bucket.set(key, value.clone());
        shard.stats().record_write();
        value
    }

    /// Insert only if the key is absent. Returns whether the value was inserted.
    ///
    /// Among callers racing on the same absent key exactly one sees `true`.
    pub fn set_if_absent(&self, key: impl Into<String>, value: V) -> bool {
        let key = key.into();
        let shard = self.table.get_shard(&key);
        let mut bucket = shard.write();
        if bucket.contains_key(&key) {
            return false;
        }
        bucket.set(key, value);
        shard.stats().record_write();
        true
    }

    /// Conditionally write a value computed from the current one.
    ///
    /// `f` receives the current value (`None` if absent) and returns
    /// `Some(candidate)` to store it or `None` to leave the map untouched.
    /// Returns whether a write happened.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cmap::ConcurrentMap;
    ///
    /// let map = ConcurrentMap::new();
    /// map.set("high_score", 10);
    ///
    /// // Only raise the score, never lower it.
    /// assert!(!map.set_if("high_score", |old| match old {
    ///     Some(&best) if best >= 7 => None,
    ///     _ => Some(7),
    /// }));
    /// assert!(map.set_if("high_score", |old| match old {
    ///     Some(&best) if best >= 12 => None,
    ///     _ => Some(12),
    /// }));
    /// assert_eq!(map.get("high_score"), Some(12));
    /// ```
    pub fn set_if<F>(&self, key: impl Into<String>, f: F) -> bool
    where
        F: FnOnce(Option<&V>) -> Option<V>,
    {
        let key = key.into();
        let shard = self.table.get_shard(&key);
        let mut bucket = shard.write();
        match f(bucket.get(&key)) {
            Some(candidate) => {
                bucket.set(key, candidate);
                shard.stats().record_write();
                true
            }
            None => false,
        }
    }

    /// Remove a key if `f` approves of its current value.
    ///
    /// `f` receives the current value (`None` if absent). The key is removed
    /// and `true` returned only when `f` says so and the key exists; the check
    /// and the delete share one exclusive lock acquisition.
    pub fn remove_if<F>(&self, key: &str, f: F) -> bool
    where
        F: FnOnce(Option<&V>) -> bool,
    {
        let shard = self.table.get_shard(key);
        let mut bucket = shard.write();
        let value = bucket.get(key);
        let found = value.is_some();
        if f(value) && found {
            bucket.remove(key);
            shard.stats().record_remove();
            return true;
        }
        false
    }

    /// Total number of entries, counted one shard at a time.
    pub fn len(&self) -> usize {
        self.table.shards().iter().map(|shard| shard.read().len()).sum()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.table.shards().iter().all(|shard| shard.read().is_empty())
    }

    /// Every key, gathered one shard at a time. Order is unspecified.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        for shard in self.table.shards() {
            keys.extend(shard.read().keys());
        }
        keys
    }

    /// Same result as [`keys`](Self::keys), with shards scanned on the worker pool.
    ///
    /// One task per shard snapshots that shard's keys under its shared lock
    /// and feeds them to an accumulator task, which is queued last. Blocks
    /// until the accumulator has collected every batch.
    ///
    /// Returns `Err(Error::PoolClosed)` after [`close`](Self::close). Must not
    /// be called from inside a pool task.
    pub fn keys_parallel(&self) -> Result<Vec<String>, Error> {
        if self.pool.is_closed() {
            warn!("keys_parallel called on a closed map");
            return Err(Error::PoolClosed);
        }

        let shard_count = self.table.len();
        trace!(shard_count, "fanning out key scan");

        let (batch_tx, batch_rx) = unbounded::<Vec<String>>();
        for index in 0..shard_count {
            let table = Arc::clone(&self.table);
            let batch_tx = batch_tx.clone();
            self.pool.submit(move || {
                let keys = table.shards()[index].read().keys();
                let _ = batch_tx.send(keys);
            })?;
        }
        // The accumulator stops once the last shard task drops its sender.
        drop(batch_tx);

        let (result_tx, result_rx) = bounded::<Vec<String>>(1);
        self.pool.submit(move || {
            let mut keys = Vec::new();
            for batch in batch_rx.iter() {
                keys.extend(batch);
            }
            let _ = result_tx.send(keys);
        })?;

        result_rx.recv().map_err(|_| Error::TaskAborted)
    }

    /// Remove every entry, clearing one shard at a time.
    pub fn clear(&self) {
        for shard in self.table.shards() {
            shard.write().clear();
        }
    }

    /// Number of entries in each shard, in shard order.
    pub fn shard_loads(&self) -> Vec<usize> {
        self.table
            .shards()
            .iter()
            .map(|shard| shard.read().len())
            .collect()
    }

    /// Get detailed statistics about the map and its shards.
    pub fn stats(&self) -> Stats {
        let shard_sizes = self.shard_loads();
        let operations: Vec<ShardOps> = self
            .table
            .shards()
            .iter()
            .map(|shard| shard.stats().snapshot())
            .collect();
        let size = shard_sizes.iter().sum();

        Stats {
            size,
            shard_sizes,
            operations,
        }
    }

    /// Shut down the worker pool. Idempotent.
    ///
    /// Single-key and sequential whole-map operations keep working afterwards;
    /// only [`keys_parallel`](Self::keys_parallel) needs the pool.
    pub fn close(&self) {
        self.pool.close();
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

impl<V> Default for ConcurrentMap<V>
where
    V: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> std::fmt::Debug for ConcurrentMap<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrentMap")
            .field("shard_count", &self.table.len())
            .field("pool", &self.pool)
            .finish()
    }
}
