//! # datalayer-fs
//!
//! Read-only filesystem view of a DataLayer node.
//!
//! This crate provides:
//! - Path resolution for the root → store → key hierarchy
//! - Key name decoding (hex wire keys to UTF-8 file names)
//! - [`DataLayerFs`]: directory listing, open and byte-range reads over any
//!   [`DataStore`](datalayer_rpc::DataStore)
//! - Mount configuration loaded from TOML
//! - FUSE mounting (with the `fuse` feature)
//!
//! ## Example
//!
//! ```ignore
//! use datalayer_fs::{DataLayerFs, FsPath, MountConfig};
//! use datalayer_rpc::MemoryStore;
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStore::new());
//! store.insert("storeA", b"key", b"hello");
//!
//! let fs = DataLayerFs::new(store, &MountConfig::default());
//! let names = fs.readdir(&FsPath::resolve("/storeA")).await?;
//! assert_eq!(names, vec!["key"]);
//!
//! let mut buf = [0u8; 3];
//! let n = fs.read(&FsPath::resolve("/storeA/key"), 0, &mut buf, 1).await;
//! assert_eq!(&buf[..n], b"ell");
//! ```

mod adapter;
mod cache;
pub mod codec;
mod config;
mod error;
mod path;

#[cfg(feature = "fuse")]
pub mod fuse;

pub use adapter::{slice_range, DataLayerFs, EntryKind, FILE_HANDLE};
pub use config::{CacheConfig, ConfigError, MountConfig, DEFAULT_MOUNT_PATH};
pub use error::{FsError, Result};
pub use path::FsPath;

// Re-export datalayer-rpc types for convenience
pub use datalayer_rpc::{DataStore, RawKey, StoreId};
