//! Filesystem semantics over a [`DataStore`].
//!
//! `DataLayerFs` answers `readdir`, `open` and `read` for the three-level
//! path space. It holds no per-call state: every operation asks the node
//! again, so concurrent callers never observe each other.

use crate::cache::KeyCache;
use crate::codec::{decode_key, is_valid_entry_name};
use crate::config::MountConfig;
use crate::error::{FsError, Result};
use crate::path::FsPath;
use bytes::Bytes;
use datalayer_rpc::{DataStore, RawKey, StoreId};
use log::{debug, error, trace, warn};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Handle returned by every successful `open`. Reads carry no per-handle state.
pub const FILE_HANDLE: u64 = 0;

/// What a path refers to, as reported to `lookup`/`getattr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File { size: u64 },
}

/// Read-only view of a DataLayer node as root → store → key.
pub struct DataLayerFs {
    store: Arc<dyn DataStore>,
    request_timeout: Duration,
    keys: Option<KeyCache>,
}

impl DataLayerFs {
    pub fn new(store: Arc<dyn DataStore>, config: &MountConfig) -> Self {
        let keys = config.cache.enabled.then(|| KeyCache::new(&config.cache));
        Self {
            store,
            request_timeout: config.request_timeout(),
            keys,
        }
    }

    /// Run one node call under the request timeout, logging any failure.
    async fn remote<T, F>(&self, call: &str, fut: F) -> Result<T>
    where
        F: Future<Output = datalayer_rpc::Result<T>>,
    {
        match tokio::time::timeout(self.request_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                error!("{} failed: {}", call, e);
                Err(FsError::Remote(e))
            }
            Err(_) => {
                error!("{} timed out after {:?}", call, self.request_timeout);
                Err(FsError::TimedOut(self.request_timeout))
            }
        }
    }

    // Directory enumeration

    /// Subscribed stores, in the order the node reports them.
    pub async fn list_root(&self) -> Result<Vec<StoreId>> {
        self.remote("get_subscriptions", self.store.subscriptions()).await
    }

    /// Decoded key names of `store`. Duplicates are kept.
    pub async fn list_store(&self, store: &StoreId) -> Result<Vec<String>> {
        let entries = self.store_entries(store).await?;
        Ok(entries.into_iter().map(|(name, _)| name).collect())
    }

    /// Fetch and decode the key listing of `store`, refreshing the key cache.
    async fn store_entries(&self, store: &StoreId) -> Result<Vec<(String, RawKey)>> {
        let keys = match self.remote("get_keys", self.store.keys(store)).await {
            Ok(keys) => keys,
            Err(e) => {
                let err = self.classify_store_failure(store, e).await;
                if let (FsError::NotFound, Some(cache)) = (&err, &self.keys) {
                    cache.invalidate(store);
                }
                return Err(err);
            }
        };

        let mut entries = Vec::with_capacity(keys.len());
        for raw in keys {
            match decode_key(&raw) {
                Ok(name) if is_valid_entry_name(&name) => entries.push((name, raw)),
                Ok(name) => warn!(
                    "store {}: skipping key {} ({:?} is not a valid file name)",
                    store, raw, name
                ),
                Err(e) => warn!("store {}: skipping undecodable key {}: {}", store, raw, e),
            }
        }

        if let Some(cache) = &self.keys {
            cache.refresh(store, entries.iter().map(|(name, raw)| (name.as_str(), raw)));
        }
        debug!("store {} lists {} entries", store, entries.len());
        Ok(entries)
    }

    /// Turn a failed key listing into `NotFound` when the store is simply not subscribed.
    async fn classify_store_failure(&self, store: &StoreId, err: FsError) -> FsError {
        if let FsError::Remote(datalayer_rpc::Error::UnknownStore(_)) = err {
            return FsError::NotFound;
        }
        if !err.is_remote() {
            return err;
        }
        match self.list_root().await {
            Ok(ids) if !ids.contains(store) => {
                debug!("store {} is not subscribed", store);
                FsError::NotFound
            }
            _ => err,
        }
    }

    // File access

    /// Whether `name` is a key of `store`, by decoded-name equality over a fresh listing.
    pub async fn check_exists(&self, store: &StoreId, name: &str) -> Result<bool> {
        match self.store_entries(store).await {
            Ok(entries) => Ok(entries.iter().any(|(n, _)| n == name)),
            Err(FsError::NotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Resolve a key name to its wire key, consulting the cache first.
    async fn raw_key(&self, store: &StoreId, name: &str) -> Result<RawKey> {
        if let Some(raw) = self.keys.as_ref().and_then(|c| c.get(store, name)) {
            trace!("key cache hit for {}/{}", store, name);
            return Ok(raw);
        }

        self.store_entries(store)
            .await?
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(_, raw)| raw)
            .ok_or(FsError::NotFound)
    }

    /// Fetch the full value stored under `name`.
    pub async fn fetch_value(&self, store: &StoreId, name: &str) -> Result<Bytes> {
        let raw = self.raw_key(store, name).await?;
        self.remote("get_value", self.store.value(store, &raw)).await
    }

    /// Bytes `[offset, offset + length)` of the value, clamped to its end.
    pub async fn read_range(
        &self,
        store: &StoreId,
        name: &str,
        offset: u64,
        length: usize,
    ) -> Result<Bytes> {
        let value = self.fetch_value(store, name).await?;
        Ok(slice_range(&value, offset, length))
    }

    /// Kind and size of the entry at `path`.
    pub async fn stat(&self, path: &FsPath) -> Result<EntryKind> {
        match path {
            FsPath::Root => Ok(EntryKind::Directory),
            FsPath::Store(store) => {
                if self.list_root().await?.contains(store) {
                    Ok(EntryKind::Directory)
                } else {
                    Err(FsError::NotFound)
                }
            }
            FsPath::Key(store, name) => {
                if !self.check_exists(store, name).await? {
                    return Err(FsError::NotFound);
                }
                let value = self.fetch_value(store, name).await?;
                Ok(EntryKind::File {
                    size: value.len() as u64,
                })
            }
            FsPath::Invalid => Err(FsError::NotFound),
        }
    }

    // Host filesystem entry points

    /// Entry names of a directory.
    ///
    /// Node failures are reported as `NotFound`, like absent paths; the
    /// underlying error is logged.
    pub async fn readdir(&self, path: &FsPath) -> Result<Vec<String>> {
        trace!("readdir({})", path);
        let result = match path {
            FsPath::Root => self
                .list_root()
                .await
                .map(|ids| ids.into_iter().map(|id| id.to_string()).collect()),
            FsPath::Store(store) => self.list_store(store).await,
            FsPath::Key(..) | FsPath::Invalid => Err(FsError::NotFound),
        };

        result.map_err(|e| {
            if e.is_remote() {
                warn!("readdir({}): {}; reporting ENOENT", path, e);
            }
            FsError::NotFound
        })
    }

    /// Open a key for reading and return [`FILE_HANDLE`].
    ///
    /// Write-intent flags are refused with `PermissionDenied`.
    pub async fn open(&self, path: &FsPath, flags: i32) -> Result<u64> {
        trace!("open({}, flags={:#o})", path, flags);
        let FsPath::Key(store, name) = path else {
            return Err(FsError::NotFound);
        };

        if wants_write(flags) {
            debug!("open({}): refusing write access", path);
            return Err(FsError::PermissionDenied);
        }

        if self.check_exists(store, name).await? {
            Ok(FILE_HANDLE)
        } else {
            Err(FsError::NotFound)
        }
    }

    /// Copy up to `buf.len()` bytes starting at `offset` into `buf`.
    ///
    /// Returns the number of bytes copied. Zero means end of file, and is also
    /// what any failure reports; failures are logged.
    pub async fn read(&self, path: &FsPath, _fh: u64, buf: &mut [u8], offset: u64) -> usize {
        trace!("read({}, offset={}, size={})", path, offset, buf.len());
        let FsPath::Key(store, name) = path else {
            warn!("read({}): not a key path", path);
            return 0;
        };

        match self.read_range(store, name, offset, buf.len()).await {
            Ok(part) => {
                buf[..part.len()].copy_from_slice(&part);
                part.len()
            }
            Err(e) => {
                error!("read({}) failed: {}", path, e);
                0
            }
        }
    }
}

/// Whether open flags ask for anything beyond reading.
fn wants_write(flags: i32) -> bool {
    (flags & libc::O_ACCMODE) != libc::O_RDONLY
        || flags & (libc::O_TRUNC | libc::O_APPEND | libc::O_CREAT) != 0
}

/// Sub-slice `[offset, offset + length)` clamped to the value's length.
pub fn slice_range(value: &Bytes, offset: u64, length: usize) -> Bytes {
    let Ok(start) = usize::try_from(offset) else {
        return Bytes::new();
    };
    if start >= value.len() {
        return Bytes::new();
    }
    let end = start.saturating_add(length).min(value.len());
    value.slice(start..end)
}
