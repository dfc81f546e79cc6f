//! Random secret generation

use rand::rngs::OsRng;
use rand::RngCore;

use crate::codec::base64_encode;
use crate::{Error, Result};

/// One draw from the OS CSPRNG, in both representations
#[derive(Clone, PartialEq, Eq)]
pub struct RandomBytes {
    pub encoded: String,
    pub raw: Vec<u8>,
}

impl std::fmt::Debug for RandomBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomBytes")
            .field("len", &self.raw.len())
            .finish_non_exhaustive()
    }
}

/// Fill `size` bytes from the OS CSPRNG
pub fn generate_random_bytes(size: usize) -> Result<RandomBytes> {
    let mut raw = vec![0u8; size];
    OsRng
        .try_fill_bytes(&mut raw)
        .map_err(|e| Error::Entropy(e.to_string()))?;

    Ok(RandomBytes {
        encoded: base64_encode(&raw),
        raw,
    })
}
