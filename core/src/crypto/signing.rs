//! ECDSA payload signatures
//!
//! Payloads are hashed with SHA-256 and the digest is signed with a fresh
//! per-call nonce. The wire format is the DER `SEQUENCE { r, s }`, base64.

use p256::ecdsa::signature::hazmat::{PrehashVerifier, RandomizedPrehashSigner};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::codec::{base64_decode, base64_encode};
use crate::keys::{EcdsaPrivateKey, EcdsaPublicKey, EcdsaSecret, EcdsaVerifyingKey};
use crate::{Error, Result};

/// Sign `data`, returning a base64 DER signature
pub fn sign_payload(private_key: &EcdsaPrivateKey, data: &[u8]) -> Result<String> {
    let digest = Sha256::digest(data);
    let der = match private_key.secret() {
        EcdsaSecret::P256(secret) => {
            let signature: p256::ecdsa::Signature = p256::ecdsa::SigningKey::from(secret)
                .sign_prehash_with_rng(&mut OsRng, &digest)
                .map_err(|e| Error::Signing(e.to_string()))?;
            signature.to_der().as_bytes().to_vec()
        }
        EcdsaSecret::P384(secret) => {
            let signature: p384::ecdsa::Signature = p384::ecdsa::SigningKey::from(secret)
                .sign_prehash_with_rng(&mut OsRng, &digest)
                .map_err(|e| Error::Signing(e.to_string()))?;
            signature.to_der().as_bytes().to_vec()
        }
    };

    Ok(base64_encode(der))
}

/// Verify a base64 DER signature produced by [`sign_payload`]
pub fn verify_payload(
    public_key: &EcdsaPublicKey,
    data: &[u8],
    signature_b64: &str,
) -> Result<()> {
    let der = base64_decode(signature_b64)?;
    let digest = Sha256::digest(data);

    let verified = match public_key.verifying_key() {
        EcdsaVerifyingKey::P256(key) => {
            let signature = p256::ecdsa::Signature::from_der(&der).map_err(malformed)?;
            key.verify_prehash(&digest, &signature)
        }
        EcdsaVerifyingKey::P384(key) => {
            let signature = p384::ecdsa::Signature::from_der(&der).map_err(malformed)?;
            key.verify_prehash(&digest, &signature)
        }
    };
    verified.map_err(|_| Error::Signing("signature verification failed".to_string()))
}

fn malformed(e: p256::ecdsa::Error) -> Error {
    Error::Signing(format!("malformed signature: {}", e))
}
