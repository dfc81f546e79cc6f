//! Serde adapters for byte fields stored as base64 text
//!
//! Registry records are persisted as JSON; DER blobs inside them are
//! written as base64 strings so the store never sees raw binary.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Deserializer, Serializer};

/// Serialize/deserialize a `Vec<u8>` as a base64 string.
///
/// Usage:
/// ```ignore
/// #[serde(with = "crate::codec::serde_utils::base64_bytes")]
/// pub der: Vec<u8>,
/// ```
pub mod base64_bytes {
    use super::*;

    pub fn serialize<S>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&BASE64.encode(data))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        BASE64.decode(s.trim()).map_err(serde::de::Error::custom)
    }
}
