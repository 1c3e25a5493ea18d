//! Key-name cache for reads.
//!
//! The node only offers a full key listing, so resolving a name to its wire
//! key costs one `get_keys` round trip. Each store listing replaces that
//! store's mapping wholesale; reads consult it before falling back to a
//! listing of their own.

use crate::config::CacheConfig;
use datalayer_rpc::{RawKey, StoreId};
use moka::sync::Cache;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

type NameMap = Arc<HashMap<String, RawKey>>;

pub struct KeyCache {
    stores: Cache<StoreId, NameMap>,
}

impl KeyCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            stores: Cache::builder()
                .max_capacity(config.max_entries)
                .weigher(|_store: &StoreId, names: &NameMap| {
                    u32::try_from(names.len().max(1)).unwrap_or(u32::MAX)
                })
                .time_to_live(Duration::from_secs(config.ttl_secs))
                .build(),
        }
    }

    /// Wire key last seen for `name` in `store`.
    pub fn get(&self, store: &StoreId, name: &str) -> Option<RawKey> {
        self.stores.get(store)?.get(name).cloned()
    }

    /// Replace the mapping for `store` with a fresh listing.
    ///
    /// When two wire keys decode to the same name the first one wins.
    pub fn refresh<'a, I>(&self, store: &StoreId, entries: I)
    where
        I: IntoIterator<Item = (&'a str, &'a RawKey)>,
    {
        let mut names = HashMap::new();
        for (name, raw) in entries {
            names.entry(name.to_string()).or_insert_with(|| raw.clone());
        }
        self.stores.insert(store.clone(), Arc::new(names));
    }

    pub fn invalidate(&self, store: &StoreId) {
        self.stores.invalidate(store);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> KeyCache {
        KeyCache::new(&CacheConfig::default())
    }

    #[test]
    fn refresh_then_get() {
        let cache = cache();
        let store = StoreId::from("storeA");
        let raw = RawKey::new("0x6b6579");

        assert!(cache.get(&store, "key").is_none());
        cache.refresh(&store, [("key", &raw)]);
        assert_eq!(cache.get(&store, "key"), Some(raw));
        assert!(cache.get(&StoreId::from("storeB"), "key").is_none());
    }

    #[test]
    fn refresh_replaces_previous_listing() {
        let cache = cache();
        let store = StoreId::from("storeA");
        let old = RawKey::new("0x6f6c64");
        let new = RawKey::new("0x6e6577");

        cache.refresh(&store, [("old", &old)]);
        cache.refresh(&store, [("new", &new)]);
        assert!(cache.get(&store, "old").is_none());
        assert_eq!(cache.get(&store, "new"), Some(new));
    }

    #[test]
    fn first_duplicate_wins() {
        let cache = cache();
        let store = StoreId::from("storeA");
        let first = RawKey::new("0x6b6579");
        let second = RawKey::new("0x6B6579");

        cache.refresh(&store, [("key", &first), ("key", &second)]);
        assert_eq!(cache.get(&store, "key"), Some(first));
    }

    #[test]
    fn invalidate_drops_store() {
        let cache = cache();
        let store = StoreId::from("storeA");
        let raw = RawKey::new("0x6b6579");
        cache.refresh(&store, [("key", &raw)]);
        cache.invalidate(&store);
        assert!(cache.get(&store, "key").is_none());
    }
}
