//! In-process [`DataStore`] used by tests and local demos.

use crate::error::{Error, Result};
use crate::store::DataStore;
use crate::types::{RawKey, StoreId};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
struct MemoryStoreState {
    /// Stores in subscription order, each with keys in insertion order.
    stores: Vec<(StoreId, Vec<(RawKey, Bytes)>)>,
    failing: HashSet<StoreId>,
    fail_subscriptions: bool,
}

/// A DataLayer node held entirely in memory.
///
/// Stores can be marked as failing to simulate a node that answers with an
/// unsuccessful or malformed response.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryStoreState>,
    keys_calls: AtomicUsize,
    value_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to `store` without adding any keys.
    pub fn add_store(&self, store: impl Into<StoreId>) {
        let store = store.into();
        let mut state = self.state.write();
        if !state.stores.iter().any(|(id, _)| *id == store) {
            state.stores.push((store, Vec::new()));
        }
    }

    /// Insert a value under a key given as plain bytes.
    pub fn insert(&self, store: impl Into<StoreId>, key: &[u8], value: &[u8]) {
        self.insert_raw(store, RawKey::from_bytes(key), Bytes::copy_from_slice(value));
    }

    /// Insert a value under a key already in wire form.
    pub fn insert_raw(&self, store: impl Into<StoreId>, key: RawKey, value: Bytes) {
        let store = store.into();
        self.add_store(store.clone());

        let mut state = self.state.write();
        if let Some((_, entries)) = state.stores.iter_mut().find(|(id, _)| *id == store) {
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = value,
                None => entries.push((key, value)),
            }
        }
    }

    /// Make every call touching `store` fail.
    pub fn fail_store(&self, store: impl Into<StoreId>) {
        self.state.write().failing.insert(store.into());
    }

    /// Make `subscriptions()` fail.
    pub fn fail_subscriptions(&self, fail: bool) {
        self.state.write().fail_subscriptions = fail;
    }

    /// Number of `keys()` calls served so far.
    pub fn keys_calls(&self) -> usize {
        self.keys_calls.load(Ordering::Relaxed)
    }

    /// Number of `value()` calls served so far.
    pub fn value_calls(&self) -> usize {
        self.value_calls.load(Ordering::Relaxed)
    }

    fn check_store(state: &MemoryStoreState, method: &str, store: &StoreId) -> Result<()> {
        if state.failing.contains(store) {
            return Err(Error::Malformed {
                method: method.to_string(),
                detail: format!("injected failure for store {}", store),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn subscriptions(&self) -> Result<Vec<StoreId>> {
        let state = self.state.read();
        if state.fail_subscriptions {
            return Err(Error::Unsuccessful {
                method: "get_subscriptions".to_string(),
                reason: "injected failure".to_string(),
            });
        }
        Ok(state.stores.iter().map(|(id, _)| id.clone()).collect())
    }

    async fn keys(&self, store: &StoreId) -> Result<Vec<RawKey>> {
        self.keys_calls.fetch_add(1, Ordering::Relaxed);
        let state = self.state.read();
        Self::check_store(&state, "get_keys", store)?;

        state
            .stores
            .iter()
            .find(|(id, _)| id == store)
            .map(|(_, entries)| entries.iter().map(|(k, _)| k.clone()).collect())
            .ok_or_else(|| Error::UnknownStore(store.to_string()))
    }

    async fn value(&self, store: &StoreId, key: &RawKey) -> Result<Bytes> {
        self.value_calls.fetch_add(1, Ordering::Relaxed);
        let state = self.state.read();
        Self::check_store(&state, "get_value", store)?;

        let (_, entries) = state
            .stores
            .iter()
            .find(|(id, _)| id == store)
            .ok_or_else(|| Error::UnknownStore(store.to_string()))?;

        entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| Error::Unsuccessful {
                method: "get_value".to_string(),
                reason: format!("key {} not found", key),
            })
    }
}
