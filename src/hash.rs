use std::hash::Hasher;
use std::sync::Arc;

/// A key → 64-bit digest mapping used only to route keys to shards.
///
/// Implementations must be deterministic for the lifetime of the process.
/// Collision resistance is not required; a roughly uniform spread over the
/// keys actually stored is.
pub trait ShardHash: Send + Sync {
    /// Digest a key.
    fn hash64(&self, key: &str) -> u64;
}

/// XXH64 with seed 0 (the default).
#[derive(Debug, Clone, Copy, Default)]
pub struct XxHash64;

impl ShardHash for XxHash64 {
    #[inline]
    fn hash64(&self, key: &str) -> u64 {
        twox_hash::XxHash64::oneshot(0, key.as_bytes())
    }
}

/// Classic 64-bit FNV.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fnv64;

impl ShardHash for Fnv64 {
    #[inline]
    fn hash64(&self, key: &str) -> u64 {
        let mut hasher = fnv::FnvHasher::default();
        hasher.write(key.as_bytes());
        hasher.finish()
    }
}

/// ahash with its fixed default keys, so digests are stable within a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct AHash64;

impl ShardHash for AHash64 {
    #[inline]
    fn hash64(&self, key: &str) -> u64 {
        let mut hasher = ahash::AHasher::default();
        hasher.write(key.as_bytes());
        hasher.finish()
    }
}

/// FxHash (faster but potentially less distributed).
#[cfg(feature = "fxhash")]
#[derive(Debug, Clone, Copy, Default)]
pub struct FxHash64;

#[cfg(feature = "fxhash")]
impl ShardHash for FxHash64 {
    #[inline]
    fn hash64(&self, key: &str) -> u64 {
        let mut hasher = fxhash::FxHasher64::default();
        hasher.write(key.as_bytes());
        hasher.finish()
    }
}

/// Hash dispatch for shard routing.
/// Uses an enum so the built-in hashes avoid a virtual call.
pub(crate) enum ShardHasher {
    XxHash,
    Fnv,
    AHash,
    #[cfg(feature = "fxhash")]
    FxHash,
    Custom(Arc<dyn ShardHash>),
}

impl ShardHasher {
    /// Digest a key to determine which shard it belongs to.
    #[inline]
    pub fn hash64(&self, key: &str) -> u64 {
        match self {
            ShardHasher::XxHash => XxHash64.hash64(key),
            ShardHasher::Fnv => Fnv64.hash64(key),
            ShardHasher::AHash => AHash64.hash64(key),
            #[cfg(feature = "fxhash")]
            ShardHasher::FxHash => FxHash64.hash64(key),
            ShardHasher::Custom(hash) => hash.hash64(key),
        }
    }
}
