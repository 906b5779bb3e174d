//! # cmap
//!
//! An in-process concurrent map that spreads its keyspace over a fixed number
//! of independently locked shards.
//!
//! Each key hashes to exactly one shard, and every keyed operation locks only
//! that shard. Operations on keys in different shards never contend. Compound
//! read-modify-write operations (`upsert`, `set_if`, `set_if_absent`,
//! `remove_if`, `get_locked`) run under a single lock acquisition, so they
//! are atomic per key.
//!
//! ## Features
//!
//! - **Sharded locking**: one `parking_lot` read-write lock per shard
//! - **Atomic compound operations**: check-and-write under one lock
//! - **Pluggable routing hash**: xxhash (default), FNV, ahash, or your own
//! - **Parallel key scan**: `keys_parallel` fans out over a bounded worker pool
//! - **Statistics**: per-shard sizes, operation counters with `metrics`
//!
//! Whole-map operations (`len`, `keys`, `keys_parallel`, `clear`) lock one
//! shard at a time. They never deadlock, and they are not a global snapshot.
//!
//! ## Example
//!
//! ```rust
//! use cmap::ConcurrentMap;
//!
//! let map = ConcurrentMap::new();
//!
//! map.set("a", 1);
//! map.set("b", 2);
//!
//! // Atomic read-modify-write
//! map.upsert("a", |old| old.map_or(0, |v| v + 10));
//! assert_eq!(map.get("a"), Some(11));
//!
//! // Only the first writer wins
//! assert!(!map.set_if_absent("b", 20));
//!
//! // Remove only when the predicate agrees
//! assert!(map.remove_if("b", |v| v == Some(&2)));
//!
//! let mut keys = map.keys_parallel()?;
//! keys.sort();
//! assert_eq!(keys, vec!["a".to_string()]);
//!
//! map.close();
//! # Ok::<(), cmap::Error>(())
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use cmap::{ConcurrentMapBuilder, HashFunction};
//!
//! let map = ConcurrentMapBuilder::new()
//!     .shard_count(32)?
//!     .hash_function(HashFunction::Fnv)
//!     .worker_pool_size(2)?
//!     .build::<u64>()?;
//! assert_eq!(map.shard_count(), 32);
//! # Ok::<(), cmap::Error>(())
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

/// Configuration and builder types.
pub mod config;
/// Error types.
pub mod error;
/// Hash function implementations.
pub mod hash;
/// Main ConcurrentMap implementation.
pub mod map;
/// Worker pool backing parallel scans.
pub mod pool;
/// Shard and its unlocked storage.
pub mod shard;
/// Statistics and metrics collection.
pub mod stats;
/// Key-to-shard routing table.
pub mod table;

// Re-export main types
pub use config::{Config, ConcurrentMapBuilder, HashFunction};
pub use error::Error;
pub use hash::ShardHash;
pub use map::ConcurrentMap;
pub use pool::WorkerPool;
pub use stats::{ShardOps, Stats};
