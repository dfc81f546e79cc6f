//! Sign/verify/encrypt/decrypt/random command implementations.
//!
//! Every core error is propagated to `main`, which exits non-zero: a
//! signing failure aborts the command rather than printing a partial result.

use std::fs;
use std::path::Path;

use keybridge_core::keys::{
    parse_ecdsa_private_key, parse_rsa_private_key_pem, parse_rsa_public_key_pem,
};
use keybridge_core::EcdsaPublicKey;

/// Print `size` random bytes as base64.
pub fn print_random(size: usize) -> anyhow::Result<()> {
    let bytes = keybridge_core::generate_random_bytes(size)?;
    println!("{}", bytes.encoded);
    Ok(())
}

/// Sign `data` and print the base64 DER signature.
pub fn sign(key_path: &Path, data: &str) -> anyhow::Result<()> {
    let key = parse_ecdsa_private_key(&fs::read(key_path)?)?;
    println!("{}", keybridge_core::sign_payload(&key, data.as_bytes())?);
    Ok(())
}

/// Verify a signature, failing the command if it does not match.
pub fn verify(pubkey_path: &Path, data: &str, signature: &str) -> anyhow::Result<()> {
    let key = EcdsaPublicKey::from_pem(&fs::read(pubkey_path)?)?;
    keybridge_core::verify_payload(&key, data.as_bytes(), signature)?;
    println!("\x1b[1;32m✓\x1b[0m Signature valid ({})", key.fingerprint());
    Ok(())
}

/// Encrypt `data` and print the base64 ciphertext.
pub fn encrypt(pubkey_path: &Path, data: &str) -> anyhow::Result<()> {
    let key = parse_rsa_public_key_pem(&fs::read(pubkey_path)?)?;
    println!("{}", keybridge_core::encrypt(&key, data.as_bytes())?);
    Ok(())
}

/// Decrypt a base64 ciphertext and print the plaintext.
pub fn decrypt(key_path: &Path, ciphertext: &str) -> anyhow::Result<()> {
    let key = parse_rsa_private_key_pem(&fs::read(key_path)?)?;
    let plaintext = keybridge_core::decrypt(&key, ciphertext)?;
    println!("{}", String::from_utf8_lossy(&plaintext));
    Ok(())
}
