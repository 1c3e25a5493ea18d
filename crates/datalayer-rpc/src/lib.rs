//! # datalayer-rpc
//!
//! Client side of a DataLayer node: the append-only key-value store that
//! `datalayer-fs` exposes as a filesystem.
//!
//! This crate provides:
//! - [`StoreId`] and [`RawKey`] wire types, plus hex payload decoding
//! - The [`DataStore`] trait the filesystem is written against
//! - [`RpcClient`], the HTTPS JSON-RPC implementation (mutual TLS)
//! - [`MemoryStore`], an in-process implementation for tests
//!
//! ## Example
//!
//! ```ignore
//! use datalayer_rpc::{DataStore, RpcClient, RpcConfig};
//!
//! let client = RpcClient::new(&RpcConfig::default())?;
//! for store in client.subscriptions().await? {
//!     println!("{store}: {} keys", client.keys(&store).await?.len());
//! }
//! ```

mod client;
mod config;
mod error;
mod memory;
mod store;
mod types;

pub use client::RpcClient;
pub use config::{RpcConfig, DEFAULT_RPC_URL};
pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use store::DataStore;
pub use types::{decode_hex_payload, strip_hex_prefix, RawKey, StoreId, HEX_PREFIX};
