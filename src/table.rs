use crate::config::create_hasher;
use crate::config::HashFunction;
use crate::hash::ShardHasher;
use crate::shard::Shard;

/// A fixed-length, ordered collection of shards plus the hash that routes
/// keys to them.
///
/// The shard count and hash never change after construction, so a key maps
/// to the same shard for the table's whole lifetime. Routing is lock-free;
/// all synchronization lives inside the returned [`Shard`].
pub struct ShardTable<V> {
    shards: Box<[Shard<V>]>,
    hash: ShardHasher,
}

impl<V> ShardTable<V> {
    /// Build `shard_count` empty shards, each pre-sized to `capacity`.
    ///
    /// `shard_count` must be non-zero; [`Config`](crate::Config) enforces this.
    pub(crate) fn new(shard_count: usize, capacity: usize, hash_fn: &HashFunction) -> Self {
        debug_assert!(shard_count > 0);
        let shards = (0..shard_count).map(|_| Shard::new(capacity)).collect();
        Self {
            shards,
            hash: create_hasher(hash_fn),
        }
    }

    /// Which shard this key belongs to: `hash64(key) mod shard_count`.
    #[inline]
    pub fn shard_index(&self, key: &str) -> usize {
        (self.hash.hash64(key) % self.shards.len() as u64) as usize
    }

    /// The shard owning `key`.
    #[inline]
    pub fn get_shard(&self, key: &str) -> &Shard<V> {
        &self.shards[self.shard_index(key)]
    }

    /// Every shard, in index order.
    #[inline]
    pub fn shards(&self) -> &[Shard<V>] {
        &self.shards
    }

    /// Number of shards.
    #[inline]
    pub fn len(&self) -> usize {
        self.shards.len()
    }

    /// Always false; a table has at least one shard.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }
}
