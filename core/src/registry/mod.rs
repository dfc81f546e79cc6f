//! Client key registry
//!
//! Maps a client identifier to its RSA and ECDSA public keys, stored under
//! one shared expiry in an injected [`KeyValueStore`]. A registration is
//! either present and unexpired or absent; there is no other state.

mod memory;
mod record;
mod redis;
mod store;

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::codec::{base64_decode, base64_encode};
use crate::keys::{
    parse_ecdsa_public_key_der, parse_rsa_public_key_der, EcdsaPublicKey, RsaPublicKey,
};
use crate::{Config, Error, Result};

pub use self::memory::MemoryStore;
pub use self::record::{ClientKeyRecord, KeyLayout};
pub use self::redis::RedisStore;
pub use self::store::{KeyValueStore, StoreError};

use self::record::{slot_key, Slot};

/// Registry of per-client public keys with TTL semantics
#[derive(Clone)]
pub struct ClientKeyRegistry {
    store: Arc<dyn KeyValueStore>,
    namespace: String,
    layout: KeyLayout,
    default_ttl: Duration,
}

impl ClientKeyRegistry {
    /// Create a registry over `store`, taking namespace, layout and
    /// default TTL from `config`
    pub fn new(store: Arc<dyn KeyValueStore>, config: &Config) -> Self {
        Self {
            store,
            namespace: config.key_namespace.clone(),
            layout: config.layout,
            default_ttl: config.default_ttl,
        }
    }

    pub fn layout(&self) -> KeyLayout {
        self.layout
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Register (or overwrite) both public keys of `client_id`, expiring
    /// together after `ttl`.
    ///
    /// Saves are unconditional overwrites, so retrying after a storage
    /// error is safe.
    pub async fn save_client_keys(
        &self,
        client_id: &str,
        rsa_pub_der: &[u8],
        ecdsa_pub_der: &[u8],
        ttl: Duration,
    ) -> Result<()> {
        validate_client_id(client_id)?;
        if ttl.is_zero() {
            return Err(Error::Config("registry ttl must be positive".to_string()));
        }

        match self.layout {
            KeyLayout::Combined => {
                let record = ClientKeyRecord {
                    client_id: client_id.to_string(),
                    rsa_public_key_der: rsa_pub_der.to_vec(),
                    ecdsa_public_key_der: ecdsa_pub_der.to_vec(),
                    expires_at: Some(unix_now().saturating_add(ttl.as_secs())),
                };
                let json = serde_json::to_string(&record)?;
                self.write_slot(client_id, Slot::Combined, &json, ttl).await?;
            }
            KeyLayout::Split => {
                self.write_slot(client_id, Slot::Rsa, &base64_encode(rsa_pub_der), ttl)
                    .await?;
                if let Err(e) = self
                    .write_slot(client_id, Slot::Ecdsa, &base64_encode(ecdsa_pub_der), ttl)
                    .await
                {
                    tracing::warn!(
                        client_id,
                        "rsa_pub saved but ecdsa_pub failed; rsa_pub remains until it expires"
                    );
                    return Err(e);
                }
            }
        }

        tracing::debug!(
            client_id,
            ttl_secs = ttl.as_secs(),
            layout = ?self.layout,
            "saved client keys"
        );
        Ok(())
    }

    /// Save with the configured default TTL
    pub async fn save_client_keys_with_default_ttl(
        &self,
        client_id: &str,
        rsa_pub_der: &[u8],
        ecdsa_pub_der: &[u8],
    ) -> Result<()> {
        self.save_client_keys(client_id, rsa_pub_der, ecdsa_pub_der, self.default_ttl)
            .await
    }

    /// Raw PKIX DER of the client's RSA public key
    pub async fn get_client_rsa_public_key_der(&self, client_id: &str) -> Result<Vec<u8>> {
        validate_client_id(client_id)?;
        match self.layout {
            KeyLayout::Combined => {
                Ok(self.read_record(client_id, Slot::Rsa).await?.rsa_public_key_der)
            }
            KeyLayout::Split => self.read_split_slot(client_id, Slot::Rsa).await,
        }
    }

    /// The client's RSA public key, parsed
    pub async fn get_client_rsa_public_key(&self, client_id: &str) -> Result<RsaPublicKey> {
        let der = self.get_client_rsa_public_key_der(client_id).await?;
        parse_rsa_public_key_der(&der)
    }

    /// The client's ECDSA public key, parsed from PKIX DER
    pub async fn get_client_ecdsa_public_key(&self, client_id: &str) -> Result<EcdsaPublicKey> {
        validate_client_id(client_id)?;
        let der = match self.layout {
            KeyLayout::Combined => {
                self.read_record(client_id, Slot::Ecdsa).await?.ecdsa_public_key_der
            }
            KeyLayout::Split => self.read_split_slot(client_id, Slot::Ecdsa).await?,
        };
        parse_ecdsa_public_key_der(&der)
    }

    /// Both keys of a registration.
    ///
    /// With the split layout the two slots are read separately and may
    /// come from different saves; `expires_at` is not known.
    pub async fn get_client_keys(&self, client_id: &str) -> Result<ClientKeyRecord> {
        validate_client_id(client_id)?;
        match self.layout {
            KeyLayout::Combined => self.read_record(client_id, Slot::Combined).await,
            KeyLayout::Split => Ok(ClientKeyRecord {
                client_id: client_id.to_string(),
                rsa_public_key_der: self.read_split_slot(client_id, Slot::Rsa).await?,
                ecdsa_public_key_der: self.read_split_slot(client_id, Slot::Ecdsa).await?,
                expires_at: None,
            }),
        }
    }

    async fn write_slot(
        &self,
        client_id: &str,
        slot: Slot,
        value: &str,
        ttl: Duration,
    ) -> Result<()> {
        let key = slot_key(&self.namespace, client_id, slot);
        self.store
            .set(&key, value, ttl)
            .await
            .map_err(|source| Error::Storage {
                operation: slot.save_operation(),
                client_id: client_id.to_string(),
                source,
            })
    }

    /// Fetch a slot's raw value; `wanted` names the key the caller asked for
    async fn read_slot(&self, client_id: &str, slot: Slot, wanted: Slot) -> Result<String> {
        let key = slot_key(&self.namespace, client_id, slot);
        let value = self
            .store
            .get(&key)
            .await
            .map_err(|source| Error::Storage {
                operation: slot.get_operation(),
                client_id: client_id.to_string(),
                source,
            })?;

        value.ok_or_else(|| {
            tracing::debug!(client_id, slot = wanted.suffix(), "no registered key");
            Error::NotFound {
                client_id: client_id.to_string(),
                slot: wanted.suffix(),
            }
        })
    }

    async fn read_split_slot(&self, client_id: &str, slot: Slot) -> Result<Vec<u8>> {
        let encoded = self.read_slot(client_id, slot, slot).await?;
        base64_decode(&encoded).map_err(|e| {
            tracing::warn!(client_id, slot = slot.suffix(), "stored key is not valid base64");
            e
        })
    }

    async fn read_record(&self, client_id: &str, wanted: Slot) -> Result<ClientKeyRecord> {
        let json = self.read_slot(client_id, Slot::Combined, wanted).await?;
        serde_json::from_str(&json).map_err(|e| {
            tracing::warn!(client_id, "stored key record is corrupt");
            Error::Encoding(format!("corrupt key record: {}", e))
        })
    }
}

/// Client ids become part of store keys, so the separator is reserved
fn validate_client_id(client_id: &str) -> Result<()> {
    if client_id.is_empty() || client_id.contains(':') {
        return Err(Error::InvalidClientId(client_id.to_string()));
    }
    Ok(())
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{parse_rsa_public_key_pem, rsa_public_key_to_der, EcdsaPrivateKey};

    const RSA_PUBLIC_PEM: &str = include_str!("../../tests/fixtures/rsa_public.pem");
    const ED25519_PUBLIC_PEM: &str = include_str!("../../tests/fixtures/ed25519_public.pem");

    /// Fails every write whose key ends with the given suffix
    struct FailingStore {
        inner: MemoryStore,
        fail_suffix: &'static str,
    }

    #[async_trait::async_trait]
    impl KeyValueStore for FailingStore {
        async fn set(
            &self,
            key: &str,
            value: &str,
            ttl: Duration,
        ) -> std::result::Result<(), StoreError> {
            if key.ends_with(self.fail_suffix) {
                return Err(StoreError::Backend("connection reset".to_string()));
            }
            self.inner.set(key, value, ttl).await
        }

        async fn get(&self, key: &str) -> std::result::Result<Option<String>, StoreError> {
            self.inner.get(key).await
        }
    }

    fn new_registry(store: Arc<dyn KeyValueStore>, layout: KeyLayout) -> ClientKeyRegistry {
        let config = Config {
            layout,
            ..Config::default()
        };
        ClientKeyRegistry::new(store, &config)
    }

    fn key_material() -> (Vec<u8>, EcdsaPrivateKey) {
        let rsa = parse_rsa_public_key_pem(RSA_PUBLIC_PEM.as_bytes()).unwrap();
        (rsa_public_key_to_der(&rsa).unwrap(), EcdsaPrivateKey::generate())
    }

    #[tokio::test]
    async fn test_roundtrip_both_layouts() {
        for layout in [KeyLayout::Combined, KeyLayout::Split] {
            let registry = new_registry(Arc::new(MemoryStore::new()), layout);
            let (rsa_der, ecdsa) = key_material();
            let ecdsa_der = ecdsa.public_key().to_der().unwrap();

            registry
                .save_client_keys("bob", &rsa_der, &ecdsa_der, Duration::from_secs(30))
                .await
                .unwrap();

            assert_eq!(registry.get_client_rsa_public_key_der("bob").await.unwrap(), rsa_der);
            assert_eq!(
                registry.get_client_ecdsa_public_key("bob").await.unwrap(),
                ecdsa.public_key()
            );
            registry.get_client_rsa_public_key("bob").await.unwrap();

            let record = registry.get_client_keys("bob").await.unwrap();
            assert_eq!(record.rsa_public_key_der, rsa_der);
            assert_eq!(record.ecdsa_public_key_der, ecdsa_der);
            assert_eq!(record.expires_at.is_some(), layout == KeyLayout::Combined);
        }
    }

    #[tokio::test]
    async fn test_split_layout_uses_namespaced_slots() {
        let store = Arc::new(MemoryStore::new());
        let registry = new_registry(store.clone(), KeyLayout::Split);

        registry
            .save_client_keys("carol", b"rsa-der", b"ecdsa-der", Duration::from_secs(30))
            .await
            .unwrap();

        assert_eq!(
            store.get("client:carol:rsa_pub").await.unwrap().as_deref(),
            Some("cnNhLWRlcg==")
        );
        assert_eq!(
            store.get("client:carol:ecdsa_pub").await.unwrap().as_deref(),
            Some("ZWNkc2EtZGVy")
        );
    }

    #[tokio::test]
    async fn test_unknown_client_not_found() {
        let registry = new_registry(Arc::new(MemoryStore::new()), KeyLayout::Combined);
        assert!(matches!(
            registry.get_client_rsa_public_key_der("nobody").await,
            Err(Error::NotFound { slot: "rsa_pub", .. })
        ));
        assert!(matches!(
            registry.get_client_ecdsa_public_key("nobody").await,
            Err(Error::NotFound { slot: "ecdsa_pub", .. })
        ));
    }

    #[tokio::test]
    async fn test_second_write_failure_names_sub_write() {
        let store = Arc::new(FailingStore {
            inner: MemoryStore::new(),
            fail_suffix: "ecdsa_pub",
        });
        let registry = new_registry(store.clone(), KeyLayout::Split);

        let err = registry
            .save_client_keys("dave", b"rsa", b"ecdsa", Duration::from_secs(30))
            .await
            .unwrap_err();
        match err {
            Error::Storage { operation, client_id, .. } => {
                assert_eq!(operation, "save ecdsa_pub");
                assert_eq!(client_id, "dave");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // The first write stays visible until its own TTL
        assert_eq!(registry.get_client_rsa_public_key_der("dave").await.unwrap(), b"rsa");
    }

    #[tokio::test]
    async fn test_corrupt_values_are_encoding_errors() {
        let store = Arc::new(MemoryStore::new());
        store
            .set("client:erin:rsa_pub", "%%% not base64", Duration::from_secs(30))
            .await
            .unwrap();
        store
            .set("client:erin:keys", "{\"client_id\":", Duration::from_secs(30))
            .await
            .unwrap();

        let split = new_registry(store.clone(), KeyLayout::Split);
        assert!(matches!(
            split.get_client_rsa_public_key_der("erin").await,
            Err(Error::Encoding(_))
        ));

        let combined = new_registry(store, KeyLayout::Combined);
        assert!(matches!(
            combined.get_client_rsa_public_key_der("erin").await,
            Err(Error::Encoding(_))
        ));
    }

    #[tokio::test]
    async fn test_wrong_algorithm_ecdsa_slot() {
        let registry = new_registry(Arc::new(MemoryStore::new()), KeyLayout::Combined);
        let (rsa_der, _) = key_material();
        let ed25519_der = crate::codec::extract_pem_block(ED25519_PUBLIC_PEM.as_bytes()).unwrap();

        // An RSA key and an Ed25519 key stored in the ECDSA slot
        for wrong in [&rsa_der, &ed25519_der] {
            registry
                .save_client_keys("frank", &rsa_der, wrong, Duration::from_secs(30))
                .await
                .unwrap();
            assert!(matches!(
                registry.get_client_ecdsa_public_key("frank").await,
                Err(Error::KeyParse(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_invalid_client_ids_and_ttl() {
        let registry = new_registry(Arc::new(MemoryStore::new()), KeyLayout::Combined);
        for id in ["", "a:b"] {
            assert!(matches!(
                registry.save_client_keys(id, b"r", b"e", Duration::from_secs(1)).await,
                Err(Error::InvalidClientId(_))
            ));
        }
        assert!(matches!(
            registry.save_client_keys("gina", b"r", b"e", Duration::ZERO).await,
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_unrepresentable_ttl_is_storage_error() {
        for layout in [KeyLayout::Combined, KeyLayout::Split] {
            let registry = new_registry(Arc::new(MemoryStore::new()), layout);
            let result = registry
                .save_client_keys("ivy", b"r", b"e", Duration::from_secs(u64::MAX))
                .await;
            assert!(matches!(result, Err(Error::Storage { .. })));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_ttl_expiry() {
        let registry = new_registry(Arc::new(MemoryStore::new()), KeyLayout::Combined);
        registry
            .save_client_keys_with_default_ttl("hank", b"r", b"e")
            .await
            .unwrap();
        assert_eq!(registry.default_ttl(), Config::default().default_ttl);

        tokio::time::advance(registry.default_ttl() - Duration::from_secs(1)).await;
        assert!(registry.get_client_keys("hank").await.is_ok());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(matches!(
            registry.get_client_keys("hank").await,
            Err(Error::NotFound { .. })
        ));
    }
}
