//! Stored record shapes and key naming

use serde::{Deserialize, Serialize};

use crate::constants::{COMBINED_SLOT, ECDSA_SLOT, RSA_SLOT};

/// How a client's two public keys are laid out in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyLayout {
    /// One JSON record at `{ns}:{id}:keys`, written atomically
    #[default]
    Combined,
    /// Two base64 values at `{ns}:{id}:rsa_pub` and `{ns}:{id}:ecdsa_pub`.
    ///
    /// The writes are independent: a concurrent save for the same client
    /// can leave the RSA key of one save next to the ECDSA key of another,
    /// and a failed second write leaves the first in place until it expires.
    Split,
}

impl std::str::FromStr for KeyLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "combined" => Ok(Self::Combined),
            "split" => Ok(Self::Split),
            other => Err(format!("unknown key layout {:?} (expected combined or split)", other)),
        }
    }
}

/// Public key material registered for one client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientKeyRecord {
    pub client_id: String,
    #[serde(with = "crate::codec::serde_utils::base64_bytes")]
    pub rsa_public_key_der: Vec<u8>,
    #[serde(with = "crate::codec::serde_utils::base64_bytes")]
    pub ecdsa_public_key_der: Vec<u8>,
    /// Unix seconds; only the combined layout persists it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
}

/// Which value of a client's registration an operation touches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    Rsa,
    Ecdsa,
    Combined,
}

impl Slot {
    pub(crate) fn suffix(self) -> &'static str {
        match self {
            Slot::Rsa => RSA_SLOT,
            Slot::Ecdsa => ECDSA_SLOT,
            Slot::Combined => COMBINED_SLOT,
        }
    }

    pub(crate) fn save_operation(self) -> &'static str {
        match self {
            Slot::Rsa => "save rsa_pub",
            Slot::Ecdsa => "save ecdsa_pub",
            Slot::Combined => "save keys",
        }
    }

    pub(crate) fn get_operation(self) -> &'static str {
        match self {
            Slot::Rsa => "get rsa_pub",
            Slot::Ecdsa => "get ecdsa_pub",
            Slot::Combined => "get keys",
        }
    }
}

/// `{namespace}:{client_id}:{slot}`
pub(crate) fn slot_key(namespace: &str, client_id: &str, slot: Slot) -> String {
    format!("{}:{}:{}", namespace, client_id, slot.suffix())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_keys() {
        assert_eq!(slot_key("client", "alice", Slot::Rsa), "client:alice:rsa_pub");
        assert_eq!(slot_key("client", "alice", Slot::Ecdsa), "client:alice:ecdsa_pub");
        assert_eq!(slot_key("client", "alice", Slot::Combined), "client:alice:keys");
    }

    #[test]
    fn test_record_json_shape() {
        let record = ClientKeyRecord {
            client_id: "alice".to_string(),
            rsa_public_key_der: vec![1, 2, 3],
            ecdsa_public_key_der: vec![4, 5, 6],
            expires_at: Some(1_700_000_000),
        };
        let json: serde_json::Value = serde_json::to_value(&record).unwrap();
        assert_eq!(json["rsa_public_key_der"], "AQID");
        assert_eq!(json["ecdsa_public_key_der"], "BAUG");
        assert_eq!(json["expires_at"], 1_700_000_000u64);
    }

    #[test]
    fn test_layout_from_str() {
        assert_eq!("split".parse::<KeyLayout>().unwrap(), KeyLayout::Split);
        assert_eq!("combined".parse::<KeyLayout>().unwrap(), KeyLayout::Combined);
        assert!("both".parse::<KeyLayout>().is_err());
    }
}
