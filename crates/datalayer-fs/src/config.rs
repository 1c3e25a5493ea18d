use datalayer_rpc::RpcConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default mount point.
pub const DEFAULT_MOUNT_PATH: &str = "/chia";

/// Errors loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Settings for the key-name cache used by reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Remember key-name → wire-key mappings between listings.
    pub enabled: bool,
    /// Lifetime of a cached mapping in seconds.
    pub ttl_secs: u64,
    /// Maximum number of cached mappings.
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 60,
            max_entries: 10_000,
        }
    }
}

/// Configuration for mounting DataLayer stores.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MountConfig {
    /// Directory the filesystem is attached to.
    pub mount_path: PathBuf,
    /// Upper bound on each call to the node, in seconds.
    pub request_timeout_secs: u64,
    /// Let users other than the mounting user access the mount.
    pub allow_other: bool,
    /// Node connection settings.
    pub rpc: RpcConfig,
    /// Key-name cache settings.
    pub cache: CacheConfig,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            mount_path: PathBuf::from(DEFAULT_MOUNT_PATH),
            request_timeout_secs: 30,
            allow_other: false,
            rpc: RpcConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl MountConfig {
    /// Parse a TOML document; missing fields take their defaults.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load a TOML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = MountConfig::default();
        assert_eq!(config.mount_path, PathBuf::from("/chia"));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.cache.enabled);
        assert!(!config.allow_other);
    }

    #[test]
    fn empty_document_is_default() {
        let config = MountConfig::from_toml("").unwrap();
        assert_eq!(config.mount_path, PathBuf::from(DEFAULT_MOUNT_PATH));
    }

    #[test]
    fn nested_sections_override() {
        let config = MountConfig::from_toml(
            r#"
mount_path = "/mnt/datalayer"
request_timeout_secs = 5

[rpc]
url = "https://10.0.0.2:8562"

[cache]
enabled = false
"#,
        )
        .unwrap();

        assert_eq!(config.mount_path, PathBuf::from("/mnt/datalayer"));
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.rpc.url, "https://10.0.0.2:8562");
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.ttl_secs, 60);
    }

    #[test]
    fn bad_toml_is_rejected() {
        assert!(matches!(
            MountConfig::from_toml("mount_path = ["),
            Err(ConfigError::Toml(_))
        ));
    }
}
