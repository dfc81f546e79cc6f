//! Key material parsing and encoding
//!
//! - ECDSA P-256/P-384 private keys from SEC1 or PKCS#8 PEM
//! - ECDSA P-256/P-384 public keys from PKIX DER
//! - RSA public keys from PKIX (or PKCS#1) DER

mod ecdsa;
mod rsa;

pub(crate) use self::ecdsa::{EcdsaSecret, EcdsaVerifyingKey};
pub use self::ecdsa::{
    parse_ecdsa_private_key, parse_ecdsa_public_key_der, EcdsaCurve, EcdsaPrivateKey,
    EcdsaPublicKey,
};
pub use self::rsa::{
    generate_rsa_private_key, load_rsa_public_key_der, parse_rsa_private_key_pem,
    parse_rsa_public_key_der, parse_rsa_public_key_pem, rsa_key_bits, rsa_private_key_to_pem,
    rsa_public_key_to_der, rsa_public_key_to_pem,
};
pub use ::rsa::{RsaPrivateKey, RsaPublicKey};
