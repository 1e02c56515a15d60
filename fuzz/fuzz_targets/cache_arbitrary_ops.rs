#![no_main]

use libfuzzer_sys::fuzz_target;
use rescache::{CacheBuilder, LoadMode, ResourceCache, ResourceHandle};

// Fuzz arbitrary get/drop sequences on ResourceCache
//
// Tests random sequences of get, clone, and drop operations against a model
// of live handles to find violations of identity sharing and release-on-drop.
fuzz_target!(|data: &[u8]| {
    let Some((&mode, ops)) = data.split_first() else {
        return;
    };
    let mode = if mode % 2 == 0 {
        LoadMode::Serialized
    } else {
        LoadMode::PerKey
    };

    let cache: ResourceCache<u8, u32, _> = CacheBuilder::new()
        .load_mode(mode)
        .build(|key: &u8| if *key >= 0xF0 { Err(()) } else { Ok(u32::from(*key) * 3) });
    let mut held: Vec<(u8, ResourceHandle<u32>)> = Vec::new();

    for pair in ops.chunks_exact(2) {
        let (op, key) = (pair[0] % 3, pair[1] % 0xF8);
        match op {
            0 => {
                // Get: identity with any live handle for the key
                match cache.get(&key) {
                    Ok(handle) => {
                        assert_eq!(*handle, u32::from(key) * 3);
                        if let Some((_, live)) = held.iter().find(|(k, _)| *k == key) {
                            assert!(ResourceHandle::ptr_eq(live, &handle));
                        }
                        held.push((key, handle));
                    },
                    Err(()) => {
                        assert!(key >= 0xF0);
                        assert!(!cache.contains(&key));
                    },
                }
            }
            1 => {
                // Drop one held handle
                if !held.is_empty() {
                    let idx = usize::from(key) % held.len();
                    let (dropped_key, handle) = held.swap_remove(idx);
                    drop(handle);
                    let still_held = held.iter().any(|(k, _)| *k == dropped_key);
                    assert_eq!(cache.contains(&dropped_key), still_held);
                }
            }
            _ => {
                // Clone a held handle
                if !held.is_empty() {
                    let idx = usize::from(key) % held.len();
                    let (k, handle) = &held[idx];
                    let clone = (*k, handle.clone());
                    held.push(clone);
                }
            }
        }

        let distinct: std::collections::HashSet<u8> = held.iter().map(|(k, _)| *k).collect();
        assert_eq!(cache.len(), distinct.len());
        assert!(cache.check_invariants().is_ok());
    }

    held.clear();
    assert!(cache.is_empty());
});
