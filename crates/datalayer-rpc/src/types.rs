use crate::error::Result;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix the node puts in front of hex-encoded keys.
pub const HEX_PREFIX: &str = "0x";

/// Identifier of a subscribed store (the launcher id, as hex text).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreId(String);

impl StoreId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StoreId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for StoreId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A key exactly as the node transmits it: hex text, usually `0x`-prefixed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawKey(String);

impl RawKey {
    pub fn new(wire: impl Into<String>) -> Self {
        Self(wire.into())
    }

    /// Encode arbitrary key bytes into the `0x`-prefixed wire form.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(format!("{}{}", HEX_PREFIX, hex::encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode the hex body of this key into raw bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(hex::decode(strip_hex_prefix(&self.0))?)
    }
}

impl fmt::Display for RawKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strip an optional `0x`/`0X` marker from a hex string.
pub fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix(HEX_PREFIX)
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Decode a hex value payload (prefix optional) into bytes.
pub fn decode_hex_payload(s: &str) -> Result<Bytes> {
    Ok(Bytes::from(hex::decode(strip_hex_prefix(s))?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_key_decodes_with_and_without_prefix() {
        assert_eq!(RawKey::new("0x6b6579").to_bytes().unwrap(), b"key");
        assert_eq!(RawKey::new("6b6579").to_bytes().unwrap(), b"key");
        assert_eq!(RawKey::new("0X6B6579").to_bytes().unwrap(), b"key");
    }

    #[test]
    fn raw_key_from_bytes_is_prefixed_lowercase() {
        assert_eq!(RawKey::from_bytes(b"key").as_str(), "0x6b6579");
    }

    #[test]
    fn invalid_hex_is_rejected() {
        assert!(RawKey::new("0xzz").to_bytes().is_err());
        assert!(decode_hex_payload("abc").is_err());
    }

    #[test]
    fn value_payload_decodes() {
        assert_eq!(&decode_hex_payload("68656c6c6f").unwrap()[..], b"hello");
        assert!(decode_hex_payload("").unwrap().is_empty());
    }

    #[test]
    fn store_id_serializes_transparently() {
        let ids: Vec<StoreId> = serde_json::from_str(r#"["a", "b"]"#).unwrap();
        assert_eq!(ids, vec![StoreId::from("a"), StoreId::from("b")]);
    }
}
