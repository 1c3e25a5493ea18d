//! HTTPS JSON-RPC transport for a DataLayer node.
//!
//! Every method is a `POST {url}/{method}` with a JSON object body. Responses
//! carry a `success` flag next to the payload fields; anything else is
//! reported as [`Error::Malformed`].

use crate::config::RpcConfig;
use crate::error::{Error, Result};
use crate::store::DataStore;
use crate::types::{decode_hex_payload, RawKey, StoreId};
use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, trace};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
struct SubscriptionsResponse {
    store_ids: Vec<StoreId>,
}

#[derive(Debug, Deserialize)]
struct KeysResponse {
    keys: Vec<RawKey>,
}

#[derive(Debug, Deserialize)]
struct ValueResponse {
    value: String,
}

/// Client for the DataLayer RPC API, authenticated with the node's TLS identity.
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    base_url: String,
}

impl RpcClient {
    /// Build a client from config, loading the PEM certificate and key.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS material cannot be read or parsed.
    pub fn new(config: &RpcConfig) -> Result<Self> {
        let cert = std::fs::read(&config.cert_path)?;
        let key = std::fs::read(&config.key_path)?;
        let identity = reqwest::Identity::from_pkcs8_pem(&cert, &key)?;

        let http = reqwest::Client::builder()
            .identity(identity)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self::with_http_client(http, &config.url))
    }

    /// Wrap an existing `reqwest::Client`, e.g. one without client certificates.
    pub fn with_http_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let url = format!("{}/{}", self.base_url, method);
        trace!("POST {} {}", url, params);

        let body = self.http.post(&url).json(&params).send().await?.bytes().await?;
        let response: Value = serde_json::from_slice(&body).map_err(|e| Error::Malformed {
            method: method.to_string(),
            detail: e.to_string(),
        })?;

        parse_response(method, response)
    }
}

/// Check the `success` flag and extract the typed payload.
fn parse_response<T: DeserializeOwned>(method: &str, response: Value) -> Result<T> {
    match response.get("success").and_then(Value::as_bool) {
        Some(true) => {}
        Some(false) => {
            let reason = response
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("no reason given")
                .to_string();
            return Err(Error::Unsuccessful {
                method: method.to_string(),
                reason,
            });
        }
        None => {
            return Err(Error::Malformed {
                method: method.to_string(),
                detail: "missing success flag".to_string(),
            })
        }
    }

    serde_json::from_value(response).map_err(|e| Error::Malformed {
        method: method.to_string(),
        detail: e.to_string(),
    })
}

#[async_trait]
impl DataStore for RpcClient {
    async fn subscriptions(&self) -> Result<Vec<StoreId>> {
        let response: SubscriptionsResponse = self.call("get_subscriptions", json!({})).await?;
        debug!("node reports {} subscriptions", response.store_ids.len());
        Ok(response.store_ids)
    }

    async fn keys(&self, store: &StoreId) -> Result<Vec<RawKey>> {
        let response: KeysResponse = self.call("get_keys", json!({ "id": store })).await?;
        debug!("store {} has {} keys", store, response.keys.len());
        Ok(response.keys)
    }

    async fn value(&self, store: &StoreId, key: &RawKey) -> Result<Bytes> {
        let response: ValueResponse = self
            .call("get_value", json!({ "id": store, "key": key }))
            .await?;
        decode_hex_payload(&response.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_successful_subscriptions() {
        let response = json!({ "store_ids": ["aa", "bb"], "success": true });
        let parsed: SubscriptionsResponse = parse_response("get_subscriptions", response).unwrap();
        assert_eq!(parsed.store_ids, vec![StoreId::from("aa"), StoreId::from("bb")]);
    }

    #[test]
    fn unsuccessful_response_carries_reason() {
        let response = json!({ "success": false, "error": "store not found" });
        let err = parse_response::<KeysResponse>("get_keys", response).unwrap_err();
        match err {
            Error::Unsuccessful { method, reason } => {
                assert_eq!(method, "get_keys");
                assert_eq!(reason, "store not found");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_success_flag_is_malformed() {
        let response = json!({ "keys": ["0x6b6579"] });
        let err = parse_response::<KeysResponse>("get_keys", response).unwrap_err();
        assert!(matches!(err, Error::Malformed { .. }));
    }

    #[test]
    fn missing_payload_field_is_malformed() {
        let response = json!({ "success": true });
        let err = parse_response::<ValueResponse>("get_value", response).unwrap_err();
        assert!(matches!(err, Error::Malformed { .. }));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = RpcClient::with_http_client(reqwest::Client::new(), "https://localhost:8562/");
        assert_eq!(client.base_url(), "https://localhost:8562");
    }

    #[test]
    fn missing_certificate_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = RpcConfig {
            cert_path: dir.path().join("missing.crt"),
            key_path: dir.path().join("missing.key"),
            ..RpcConfig::default()
        };
        assert!(matches!(RpcClient::new(&config), Err(Error::Io(_))));
    }
}
