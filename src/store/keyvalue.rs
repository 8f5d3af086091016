//! Key-value store and the remote-pairing session cache
//!
//! Remote-pairing sessions keep a local/remote key pair per pairing phrase.
//! Entries are keyed by a hash of the phrase so the phrase itself is never
//! used as a storage key.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::Result;

/// Prefix for pairing session entries
pub const PAIRING_STORAGE_PREFIX: &str = "pairing-session";

/// Durable string key-value store
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: String) -> Result<()>;
}

/// In-memory key-value store
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: DashMap<String, String>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Session keys negotiated for a pairing phrase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingSessionKeys {
    pub local_key: String,
    pub remote_key: String,
}

/// Storage key for a pairing phrase
pub fn pairing_key(phrase: &str) -> String {
    let digest = Sha256::digest(phrase.as_bytes());
    format!("{}:{}", PAIRING_STORAGE_PREFIX, hex::encode(digest))
}

/// Load cached session keys for a phrase
///
/// Returns `None` when nothing is cached, the entry is unreadable, or
/// either key is missing.
pub async fn load_session_keys(
    store: &dyn KeyValueStore,
    phrase: &str,
) -> Result<Option<PairingSessionKeys>> {
    let Some(raw) = store.get(&pairing_key(phrase)).await? else {
        return Ok(None);
    };

    let keys: PairingSessionKeys = match serde_json::from_str(&raw) {
        Ok(keys) => keys,
        Err(e) => {
            warn!("Ignoring unreadable pairing session entry: {}", e);
            return Ok(None);
        }
    };

    if keys.local_key.is_empty() || keys.remote_key.is_empty() {
        return Ok(None);
    }

    debug!("Loaded cached pairing session keys");
    Ok(Some(keys))
}

/// Cache session keys for a phrase
pub async fn store_session_keys(
    store: &dyn KeyValueStore,
    phrase: &str,
    keys: &PairingSessionKeys,
) -> Result<()> {
    let json = serde_json::to_string(keys)?;
    store.set(&pairing_key(phrase), json).await
}
