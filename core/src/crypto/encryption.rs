//! RSA-OAEP encryption with SHA-256 (hash and MGF1), empty label

use rand::rngs::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

use crate::codec::{base64_decode, base64_encode};
use crate::constants::SHA256_SIZE;
use crate::{Error, Result};

/// Largest plaintext OAEP-SHA256 accepts for this key (`k - 2*hLen - 2`)
pub fn max_oaep_payload(public_key: &RsaPublicKey) -> usize {
    public_key.size().saturating_sub(2 * SHA256_SIZE + 2)
}

/// Encrypt `plaintext` to a base64 OAEP ciphertext
pub fn encrypt(public_key: &RsaPublicKey, plaintext: &[u8]) -> Result<String> {
    let limit = max_oaep_payload(public_key);
    if plaintext.len() > limit {
        return Err(Error::Encryption(format!(
            "plaintext too long: {} bytes (max {} for a {}-bit key)",
            plaintext.len(),
            limit,
            public_key.size() * 8
        )));
    }

    let ciphertext = public_key
        .encrypt(&mut OsRng, Oaep::new::<Sha256>(), plaintext)
        .map_err(|e| Error::Encryption(e.to_string()))?;

    Ok(base64_encode(ciphertext))
}

/// Decrypt a base64 OAEP ciphertext
pub fn decrypt(private_key: &RsaPrivateKey, ciphertext_b64: &str) -> Result<Vec<u8>> {
    let ciphertext = base64_decode(ciphertext_b64)?;
    private_key
        .decrypt(Oaep::new::<Sha256>(), &ciphertext)
        .map_err(|e| Error::Decryption(e.to_string()))
}
