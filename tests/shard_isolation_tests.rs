use cmap::{ConcurrentMap, ConcurrentMapBuilder, HashFunction};

fn map_with_shards(shards: usize, hash_fn: HashFunction) -> ConcurrentMap<usize> {
    ConcurrentMapBuilder::new()
        .shard_count(shards)
        .unwrap()
        .worker_pool_size(2)
        .unwrap()
        .hash_function(hash_fn)
        .build()
        .unwrap()
}

#[test]
fn test_shard_isolation() {
    let map = map_with_shards(4, HashFunction::XxHash);

    for i in 0..100 {
        map.set(format!("key_{}", i), i);
    }

    let stats = map.stats();
    assert_eq!(stats.shard_sizes.len(), 4);
    assert_eq!(stats.shard_sizes.iter().sum::<usize>(), 100);

    // Each key is held by exactly the shard it routes to.
    for i in 0..100 {
        let key = format!("key_{}", i);
        let home = map.shard_index(&key);
        for (index, shard) in map.table().shards().iter().enumerate() {
            assert_eq!(shard.read().contains_key(&key), index == home);
        }
    }
}

#[test]
fn test_deterministic_shard_assignment() {
    let map1 = map_with_shards(8, HashFunction::XxHash);
    let map2 = map_with_shards(8, HashFunction::XxHash);

    for i in 0..50 {
        let key = format!("key_{}", i);
        assert_eq!(map1.shard_index(&key), map2.shard_index(&key));
        map1.set(key.clone(), i);
        map2.set(key, i);
    }

    assert_eq!(map1.shard_loads(), map2.shard_loads());
}

#[test]
fn test_sequential_keys_spread_over_fifty_shards() {
    let map = map_with_shards(50, HashFunction::XxHash);
    for i in 0..1000 {
        map.set(i.to_string(), i);
    }

    // ~20 keys per shard.
    for (index, load) in map.shard_loads().into_iter().enumerate() {
        assert!(
            (10..=30).contains(&load),
            "shard {} holds {} of 1000 keys",
            index,
            load
        );
    }
}

#[test]
fn test_shard_distribution() {
    for hash_fn in [HashFunction::XxHash, HashFunction::Fnv, HashFunction::AHash] {
        let map = map_with_shards(16, hash_fn.clone());

        for i in 0..1000 {
            map.set(format!("key_{}", i), i);
        }

        let stats = map.stats();

        // With 1000 keys and 16 shards, we expect ~62-63 keys per shard
        let max_shard_size = *stats.shard_sizes.iter().max().unwrap();
        let min_shard_size = *stats.shard_sizes.iter().min().unwrap();
        assert!(
            max_shard_size < 100,
            "{:?}: shard distribution too uneven (max: {})",
            hash_fn,
            max_shard_size
        );
        assert!(
            min_shard_size > 30,
            "{:?}: shard distribution too uneven (min: {})",
            hash_fn,
            min_shard_size
        );
        assert!(stats.max_load_ratio() < 1.6);
    }
}
