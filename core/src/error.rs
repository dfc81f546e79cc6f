use thiserror::Error;

use crate::registry::StoreError;

/// Keybridge error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Invalid format: {0}")]
    Format(String),

    #[error("Failed to parse key: {0}")]
    KeyParse(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed: {0}")]
    Decryption(String),

    #[error("Entropy source unavailable: {0}")]
    Entropy(String),

    #[error("Storage error during {operation} for client {client_id}: {source}")]
    Storage {
        operation: &'static str,
        client_id: String,
        #[source]
        source: StoreError,
    },

    #[error("No {slot} key registered for client {client_id}")]
    NotFound { client_id: String, slot: &'static str },

    #[error("Invalid client id: {0:?}")]
    InvalidClientId(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to serialize/deserialize: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
