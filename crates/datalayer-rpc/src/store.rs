use crate::error::Result;
use crate::types::{RawKey, StoreId};
use async_trait::async_trait;
use bytes::Bytes;

/// Read access to a DataLayer node.
///
/// Implementations must be safe to call concurrently; the filesystem issues
/// one independent call per kernel request and keeps no session state.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Stores this node is subscribed to.
    async fn subscriptions(&self) -> Result<Vec<StoreId>>;

    /// All keys currently held by `store`, in wire form.
    async fn keys(&self, store: &StoreId) -> Result<Vec<RawKey>>;

    /// The full value stored under `key`, hex-decoded.
    async fn value(&self, store: &StoreId, key: &RawKey) -> Result<Bytes>;
}
