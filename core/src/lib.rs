//! Keybridge Core - secure-channel bootstrap primitives
//!
//! This library provides the client-side cryptography (ECDSA payload
//! signatures, RSA-OAEP encryption, random secrets, key parsing) and the
//! server-side registry that keeps each client's public keys under a
//! time-bounded entry.

pub mod codec;
pub mod constants;
pub mod crypto;
pub mod keys;
pub mod registry;

mod error;

use std::path::PathBuf;
use std::time::Duration;

pub use error::{Error, Result};

/// Configuration for the key registry and tooling
#[derive(Debug, Clone)]
pub struct Config {
    /// TTL applied when a save does not specify one
    pub default_ttl: Duration,
    /// Prefix of every registry key (`{namespace}:{client_id}:...`)
    pub key_namespace: String,
    /// Store layout of a client's two public keys
    pub layout: registry::KeyLayout,
    /// Redis endpoint for [`registry::RedisStore`]
    pub redis_url: String,
    /// Where generated key files are written
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(constants::DEFAULT_TTL_SECS),
            key_namespace: constants::DEFAULT_KEY_NAMESPACE.to_string(),
            layout: registry::KeyLayout::default(),
            redis_url: constants::DEFAULT_REDIS_URL.to_string(),
            data_dir: dirs_home().join(".keybridge"),
        }
    }
}

fn dirs_home() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

// Re-export key types for convenience
pub use crypto::{
    decrypt, encrypt, generate_random_bytes, sign_payload, verify_payload, RandomBytes,
};
pub use keys::{EcdsaCurve, EcdsaPrivateKey, EcdsaPublicKey, RsaPrivateKey, RsaPublicKey};
pub use registry::{
    ClientKeyRecord, ClientKeyRegistry, KeyLayout, KeyValueStore, MemoryStore, RedisStore,
};
