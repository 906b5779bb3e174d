use crate::stats::ShardStats;
use hashbrown::HashMap;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// The key-value storage owned by one shard.
///
/// A `Bucket` never locks anything itself. It is only reachable through the
/// guards handed out by [`Shard::read`] and [`Shard::write`], so holding a
/// `&Bucket` means the shared lock is held and `&mut Bucket` means the
/// exclusive lock is held.
pub struct Bucket<V> {
    entries: HashMap<String, V>,
}

impl<V> Bucket<V> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    /// Insert or overwrite, returning the previous value if any.
    #[inline]
    pub fn set(&mut self, key: String, value: V) -> Option<V> {
        self.entries.insert(key, value)
    }

    /// Look up a key.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    /// Remove a key, returning its value if it was present.
    #[inline]
    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.entries.remove(key)
    }

    /// Check presence without touching the value.
    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries held.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the bucket holds nothing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Point-in-time copy of every key held. Order is unspecified.
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Drop every entry, keeping the allocation.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// A single shard: one read-write lock guarding one [`Bucket`].
///
/// Lock acquisition is the caller's job. Dropping the returned guard is the
/// release, which covers early returns and unwinding alike.
pub struct Shard<V> {
    bucket: RwLock<Bucket<V>>,
    stats: ShardStats,
}

impl<V> Shard<V> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            bucket: RwLock::new(Bucket::with_capacity(capacity)),
            stats: ShardStats::new(),
        }
    }

    /// Acquire the shared lock. Any number of readers may hold it at once.
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, Bucket<V>> {
        self.stats.record_lock_acquisition();
        self.bucket.read()
    }

    /// Acquire the exclusive lock, blocking readers and other writers.
    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, Bucket<V>> {
        self.stats.record_lock_acquisition();
        self.bucket.write()
    }

    /// Try to acquire the shared lock without blocking.
    pub fn try_read(&self) -> Option<RwLockReadGuard<'_, Bucket<V>>> {
        let guard = self.bucket.try_read();
        if guard.is_some() {
            self.stats.record_lock_acquisition();
        }
        guard
    }

    /// Try to acquire the exclusive lock without blocking.
    pub fn try_write(&self) -> Option<RwLockWriteGuard<'_, Bucket<V>>> {
        let guard = self.bucket.try_write();
        if guard.is_some() {
            self.stats.record_lock_acquisition();
        }
        guard
    }

    /// Operation counters for this shard.
    pub(crate) fn stats(&self) -> &ShardStats {
        &self.stats
    }
}
