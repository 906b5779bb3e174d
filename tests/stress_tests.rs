//! One simple load test: concurrent writes, scans and removes, then verify state and introspection.

use cmap::ConcurrentMapBuilder;
use std::sync::Arc;
use std::thread;

#[test]
fn test_under_load_then_introspect() {
    let map = Arc::new(
        ConcurrentMapBuilder::new()
            .shard_count(128)
            .unwrap()
            .worker_pool_size(4)
            .unwrap()
            .build::<usize>()
            .unwrap(),
    );
    let mut handles = vec![];

    for t in 0..4 {
        let map = Arc::clone(&map);
        let handle = thread::spawn(move || {
            for i in 0..2000 {
                let key = format!("t{}_k{}", t, i);
                map.set(key, i);
            }
            for i in 0..2000 {
                map.upsert(format!("t{}_k{}", t, i), |old| old.copied().unwrap_or(0) + 1);
            }
            let _ = map.keys_parallel().unwrap();
            for i in 0..2000 {
                let key = format!("t{}_k{}", t, i);
                assert!(map.remove_if(&key, |v| v == Some(&(i + 1))));
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(map.is_empty());
    assert_eq!(map.len(), 0);
    assert!(map.keys_parallel().unwrap().is_empty());
    let loads = map.shard_loads();
    assert_eq!(loads.iter().sum::<usize>(), 0);

    map.close();
    assert!(map.is_closed());
}
