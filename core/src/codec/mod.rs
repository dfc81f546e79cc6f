//! Pure data-transform helpers: base64, PKCS#7 padding, PEM blocks

pub mod serde_utils;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::{Error, Result};

/// Encode bytes as standard (padded) base64
pub fn base64_encode(data: impl AsRef<[u8]>) -> String {
    BASE64.encode(data)
}

/// Decode standard (padded) base64
pub fn base64_decode(s: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(s.trim())
        .map_err(|e| Error::Encoding(format!("invalid base64: {}", e)))
}

/// Append PKCS#7 padding up to the next multiple of `block_size`.
///
/// Input that is already aligned gets a full extra block, so the result is
/// always strictly longer than `data`.
pub fn pkcs7_pad(data: &[u8], block_size: usize) -> Result<Vec<u8>> {
    check_block_size(block_size)?;
    let pad_len = block_size - (data.len() % block_size);

    let mut padded = Vec::with_capacity(data.len() + pad_len);
    padded.extend_from_slice(data);
    // pad_len <= block_size <= 255
    padded.resize(data.len() + pad_len, pad_len as u8);
    Ok(padded)
}

/// Strip PKCS#7 padding, validating every pad byte
pub fn pkcs7_unpad(data: &[u8], block_size: usize) -> Result<Vec<u8>> {
    check_block_size(block_size)?;

    if data.is_empty() || data.len() % block_size != 0 {
        return Err(Error::Format(format!(
            "padded length {} is not a positive multiple of {}",
            data.len(),
            block_size
        )));
    }

    let pad_len = data.last().copied().map(usize::from).unwrap_or_default();
    if pad_len == 0 || pad_len > block_size {
        return Err(Error::Format(format!("invalid padding length {}", pad_len)));
    }

    let (body, padding) = data.split_at(data.len() - pad_len);
    if padding.iter().any(|&b| usize::from(b) != pad_len) {
        return Err(Error::Format("inconsistent padding bytes".to_string()));
    }

    Ok(body.to_vec())
}

fn check_block_size(block_size: usize) -> Result<()> {
    if !(1..=255).contains(&block_size) {
        return Err(Error::Format(format!(
            "block size must be 1..=255, got {}",
            block_size
        )));
    }
    Ok(())
}

/// Extract the first PEM block, returning its label and DER payload
pub fn extract_pem(pem_bytes: &[u8]) -> Result<(String, Vec<u8>)> {
    let block = pem::parse(pem_bytes)
        .map_err(|e| Error::Format(format!("invalid PEM block: {}", e)))?;
    Ok((block.tag().to_string(), block.into_contents()))
}

/// Extract the DER payload of the first PEM block
pub fn extract_pem_block(pem_bytes: &[u8]) -> Result<Vec<u8>> {
    extract_pem(pem_bytes).map(|(_, der)| der)
}
