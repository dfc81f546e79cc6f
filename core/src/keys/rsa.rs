//! RSA key material: PKIX/PKCS#1 parsing and PKCS#8 export

use rand::rngs::OsRng;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};

use crate::codec::extract_pem_block;
use crate::{Error, Result};

/// Extract the DER payload of a PEM public key without parsing it.
///
/// The bytes are handed to the registry as-is; parsing happens where the
/// key is used.
pub fn load_rsa_public_key_der(pem_bytes: &[u8]) -> Result<Vec<u8>> {
    extract_pem_block(pem_bytes)
}

/// Parse an RSA public key from PKIX DER, falling back to PKCS#1
pub fn parse_rsa_public_key_der(der: &[u8]) -> Result<RsaPublicKey> {
    RsaPublicKey::from_public_key_der(der)
        .or_else(|pkix_err| {
            RsaPublicKey::from_pkcs1_der(der).map_err(|pkcs1_err| {
                Error::KeyParse(format!(
                    "unable to parse RSA public key (PKIX: {}; PKCS#1: {})",
                    pkix_err, pkcs1_err
                ))
            })
        })
}

/// Parse a PEM-armored RSA public key
pub fn parse_rsa_public_key_pem(pem_bytes: &[u8]) -> Result<RsaPublicKey> {
    parse_rsa_public_key_der(&load_rsa_public_key_der(pem_bytes)?)
}

/// Parse a PEM-armored RSA private key (PKCS#8, falling back to PKCS#1)
pub fn parse_rsa_private_key_pem(pem_bytes: &[u8]) -> Result<RsaPrivateKey> {
    let der = extract_pem_block(pem_bytes)?;
    RsaPrivateKey::from_pkcs8_der(&der).or_else(|pkcs8_err| {
        RsaPrivateKey::from_pkcs1_der(&der).map_err(|pkcs1_err| {
            Error::KeyParse(format!(
                "unable to parse RSA private key (PKCS#8: {}; PKCS#1: {})",
                pkcs8_err, pkcs1_err
            ))
        })
    })
}

/// Serialize an RSA public key to PKIX DER
pub fn rsa_public_key_to_der(key: &RsaPublicKey) -> Result<Vec<u8>> {
    key.to_public_key_der()
        .map(|doc| doc.as_bytes().to_vec())
        .map_err(|e| Error::KeyParse(format!("PKIX encoding failed: {}", e)))
}

/// Serialize an RSA public key to PKIX PEM
pub fn rsa_public_key_to_pem(key: &RsaPublicKey) -> Result<String> {
    key.to_public_key_pem(LineEnding::LF)
        .map_err(|e| Error::KeyParse(format!("PKIX encoding failed: {}", e)))
}

/// Serialize an RSA private key to PKCS#8 PEM
pub fn rsa_private_key_to_pem(key: &RsaPrivateKey) -> Result<String> {
    key.to_pkcs8_pem(LineEnding::LF)
        .map(|pem| pem.to_string())
        .map_err(|e| Error::KeyParse(format!("PKCS#8 encoding failed: {}", e)))
}

/// Modulus size in bits
pub fn rsa_key_bits(key: &RsaPublicKey) -> usize {
    key.size() * 8
}

/// Generate a new RSA private key with a `bits`-bit modulus
pub fn generate_rsa_private_key(bits: usize) -> Result<RsaPrivateKey> {
    RsaPrivateKey::new(&mut OsRng, bits)
        .map_err(|e| Error::KeyParse(format!("RSA key generation failed: {}", e)))
}
