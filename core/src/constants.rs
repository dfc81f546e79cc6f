//! Centralized protocol constants
//!
//! Store key naming, hash sizes and defaults shared by the crypto layer
//! and the registry.

use p256::pkcs8::ObjectIdentifier;

/// Namespace prefix for registry keys (`client:{id}:...`)
pub const DEFAULT_KEY_NAMESPACE: &str = "client";

/// Slot suffix for the RSA public key in the split layout
pub const RSA_SLOT: &str = "rsa_pub";

/// Slot suffix for the ECDSA public key in the split layout
pub const ECDSA_SLOT: &str = "ecdsa_pub";

/// Slot suffix for the combined record
pub const COMBINED_SLOT: &str = "keys";

/// Default registry TTL (24 hours)
pub const DEFAULT_TTL_SECS: u64 = 24 * 60 * 60;

/// Default Redis endpoint
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// SHA-256 output size, used for the OAEP payload bound
pub const SHA256_SIZE: usize = 32;

/// Default block size for PKCS#7 padding
pub const PKCS7_BLOCK_SIZE: usize = 16;

/// Default RSA modulus size for generated keys
pub const DEFAULT_RSA_BITS: usize = 2048;

/// `id-ecPublicKey` (RFC 5480)
pub const EC_PUBLIC_KEY_OID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");

/// `secp256r1` / NIST P-256
pub const P256_CURVE_OID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");

/// `secp384r1` / NIST P-384
pub const P384_CURVE_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.34");
