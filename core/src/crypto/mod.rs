//! Cryptographic operations
//!
//! - ECDSA (P-256, P-384) / SHA-256 payload signatures (DER, base64)
//! - RSA-OAEP (SHA-256) encryption
//! - CSPRNG secrets

mod encryption;
mod random;
mod signing;

pub use encryption::{decrypt, encrypt, max_oaep_payload};
pub use random::{generate_random_bytes, RandomBytes};
pub use signing::{sign_payload, verify_payload};
