use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default RPC endpoint of a local DataLayer node.
pub const DEFAULT_RPC_URL: &str = "https://localhost:8562";

/// Connection settings for [`crate::RpcClient`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Base URL of the DataLayer RPC server.
    pub url: String,
    /// PEM certificate presented to the node.
    pub cert_path: PathBuf,
    /// PEM private key matching `cert_path`.
    pub key_path: PathBuf,
    /// Accept the node's self-signed certificate.
    pub accept_invalid_certs: bool,
}

impl Default for RpcConfig {
    fn default() -> Self {
        let ssl_dir = default_ssl_dir();
        Self {
            url: DEFAULT_RPC_URL.to_string(),
            cert_path: ssl_dir.join("private_data_layer.crt"),
            key_path: ssl_dir.join("private_data_layer.key"),
            accept_invalid_certs: true,
        }
    }
}

/// `~/.chia/mainnet/config/ssl/data_layer`, honouring `CHIA_ROOT` when set.
fn default_ssl_dir() -> PathBuf {
    let root = std::env::var_os("CHIA_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("/"))
                .join(".chia")
                .join("mainnet")
        });
    root.join("config").join("ssl").join("data_layer")
}
