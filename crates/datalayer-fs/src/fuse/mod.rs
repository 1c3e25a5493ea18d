//! FUSE binding for DataLayer stores.
//!
//! Mounts a [`DataLayerFs`](crate::DataLayerFs) as a read-only filesystem:
//! subscribed stores appear as top-level directories and their keys as files.
//!
//! # Features
//!
//! - **Non-blocking callbacks**: every node call runs as a tokio task and
//!   replies to the kernel when it completes
//! - **Direct I/O**: reads always go to the node, never the page cache
//! - **Stateless handles**: `open` hands out a constant handle
//!
//! # Example
//!
//! ```ignore
//! use datalayer_fs::fuse::mount;
//! use datalayer_fs::{DataLayerFs, MountConfig};
//! use datalayer_rpc::RpcClient;
//! use std::sync::Arc;
//!
//! let config = MountConfig::default();
//! let client = Arc::new(RpcClient::new(&config.rpc)?);
//! let fs = Arc::new(DataLayerFs::new(client, &config));
//! let mut handle = mount(fs, &config, tokio::runtime::Handle::current())?;
//! // ...
//! handle.unmount()?;
//! ```

mod adapter;
mod inode_table;

pub use adapter::*;
