//! ECDSA key material on the NIST P-256 and P-384 curves

use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use p256::pkcs8::spki::SubjectPublicKeyInfoRef;
use p256::pkcs8::{
    DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding,
    ObjectIdentifier, PrivateKeyInfo,
};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::codec::extract_pem_block;
use crate::constants::{EC_PUBLIC_KEY_OID, P256_CURVE_OID, P384_CURVE_OID};
use crate::{Error, Result};

/// Named curves accepted for ECDSA keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EcdsaCurve {
    #[default]
    P256,
    P384,
}

impl EcdsaCurve {
    pub fn name(self) -> &'static str {
        match self {
            Self::P256 => "P-256",
            Self::P384 => "P-384",
        }
    }

    /// Resolve an `AlgorithmIdentifier`, requiring `id-ecPublicKey`
    fn from_algorithm(
        algorithm: ObjectIdentifier,
        curve: Option<ObjectIdentifier>,
    ) -> Result<Self> {
        if algorithm != EC_PUBLIC_KEY_OID {
            return Err(Error::KeyParse(format!(
                "unexpected key algorithm {}, want ECDSA",
                algorithm
            )));
        }
        match curve {
            Some(oid) if oid == P256_CURVE_OID => Ok(Self::P256),
            Some(oid) if oid == P384_CURVE_OID => Ok(Self::P384),
            Some(oid) => Err(Error::KeyParse(format!("unsupported ECDSA curve {}", oid))),
            None => Err(Error::KeyParse("missing curve parameters".to_string())),
        }
    }
}

impl FromStr for EcdsaCurve {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "p256" | "p-256" | "prime256v1" | "secp256r1" => Ok(Self::P256),
            "p384" | "p-384" | "secp384r1" => Ok(Self::P384),
            other => Err(format!("unknown curve {:?} (expected p256 or p384)", other)),
        }
    }
}

impl std::fmt::Display for EcdsaCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone)]
pub(crate) enum EcdsaSecret {
    P256(p256::SecretKey),
    P384(p384::SecretKey),
}

#[derive(Clone, PartialEq, Eq)]
pub(crate) enum EcdsaVerifyingKey {
    P256(p256::ecdsa::VerifyingKey),
    P384(p384::ecdsa::VerifyingKey),
}

type PrivateKeyDecoder = fn(&[u8]) -> Result<EcdsaSecret>;

/// Private key containers, tried in order
const PRIVATE_KEY_DECODERS: &[(&str, PrivateKeyDecoder)] =
    &[("SEC1", decode_sec1), ("PKCS#8", decode_pkcs8)];

/// ECDSA private key used for payload signing
#[derive(Clone)]
pub struct EcdsaPrivateKey {
    secret: EcdsaSecret,
}

impl std::fmt::Debug for EcdsaPrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcdsaPrivateKey")
            .field("curve", &self.curve())
            .field("public", &self.public_key().fingerprint())
            .finish()
    }
}

impl EcdsaPrivateKey {
    /// Generate a new random P-256 key
    pub fn generate() -> Self {
        Self::generate_with_curve(EcdsaCurve::P256)
    }

    /// Generate a new random key on `curve`
    pub fn generate_with_curve(curve: EcdsaCurve) -> Self {
        let secret = match curve {
            EcdsaCurve::P256 => EcdsaSecret::P256(p256::SecretKey::random(&mut OsRng)),
            EcdsaCurve::P384 => EcdsaSecret::P384(p384::SecretKey::random(&mut OsRng)),
        };
        Self { secret }
    }

    /// Parse a PEM-armored SEC1 or PKCS#8 private key
    pub fn from_pem(pem_bytes: &[u8]) -> Result<Self> {
        parse_ecdsa_private_key(pem_bytes)
    }

    pub fn curve(&self) -> EcdsaCurve {
        match self.secret {
            EcdsaSecret::P256(_) => EcdsaCurve::P256,
            EcdsaSecret::P384(_) => EcdsaCurve::P384,
        }
    }

    /// Get the corresponding public key
    pub fn public_key(&self) -> EcdsaPublicKey {
        let inner = match &self.secret {
            EcdsaSecret::P256(secret) => {
                EcdsaVerifyingKey::P256(p256::ecdsa::VerifyingKey::from(secret.public_key()))
            }
            EcdsaSecret::P384(secret) => {
                EcdsaVerifyingKey::P384(p384::ecdsa::VerifyingKey::from(secret.public_key()))
            }
        };
        EcdsaPublicKey { inner }
    }

    /// Export as PKCS#8 PEM
    pub fn to_pkcs8_pem(&self) -> Result<String> {
        let pem = match &self.secret {
            EcdsaSecret::P256(secret) => secret.to_pkcs8_pem(LineEnding::LF),
            EcdsaSecret::P384(secret) => secret.to_pkcs8_pem(LineEnding::LF),
        };
        pem.map(|pem| pem.to_string())
            .map_err(|e| Error::KeyParse(format!("PKCS#8 encoding failed: {}", e)))
    }

    pub(crate) fn secret(&self) -> &EcdsaSecret {
        &self.secret
    }
}

/// Parse an ECDSA private key from a PEM block.
///
/// The DER payload is tried as a raw SEC1 `ECPrivateKey` first, then as a
/// PKCS#8 container. A PKCS#8 container holding anything other than an
/// `id-ecPublicKey` key is rejected.
pub fn parse_ecdsa_private_key(pem_bytes: &[u8]) -> Result<EcdsaPrivateKey> {
    let der = extract_pem_block(pem_bytes)?;

    let mut failures = Vec::with_capacity(PRIVATE_KEY_DECODERS.len());
    for (container, decode) in PRIVATE_KEY_DECODERS {
        match decode(&der) {
            Ok(secret) => return Ok(EcdsaPrivateKey { secret }),
            Err(e) => failures.push(format!("{}: {}", container, e)),
        }
    }

    Err(Error::KeyParse(format!(
        "unable to parse ECDSA private key ({})",
        failures.join("; ")
    )))
}

// SEC1 curve parameters are optional; try each curve in turn
fn decode_sec1(der: &[u8]) -> Result<EcdsaSecret> {
    match p256::SecretKey::from_sec1_der(der) {
        Ok(secret) => Ok(EcdsaSecret::P256(secret)),
        Err(_) => p384::SecretKey::from_sec1_der(der)
            .map(EcdsaSecret::P384)
            .map_err(|e| Error::KeyParse(e.to_string())),
    }
}

fn decode_pkcs8(der: &[u8]) -> Result<EcdsaSecret> {
    let info = PrivateKeyInfo::try_from(der).map_err(|e| Error::KeyParse(e.to_string()))?;
    let curve =
        EcdsaCurve::from_algorithm(info.algorithm.oid, info.algorithm.parameters_oid().ok())?;

    match curve {
        EcdsaCurve::P256 => p256::SecretKey::from_pkcs8_der(der).map(EcdsaSecret::P256),
        EcdsaCurve::P384 => p384::SecretKey::from_pkcs8_der(der).map(EcdsaSecret::P384),
    }
    .map_err(|e| Error::KeyParse(e.to_string()))
}

/// ECDSA public key
#[derive(Clone, PartialEq, Eq)]
pub struct EcdsaPublicKey {
    inner: EcdsaVerifyingKey,
}

// Serialized as base64 PKIX DER rather than a struct
impl Serialize for EcdsaPublicKey {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let der = self.to_der().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&BASE64.encode(der))
    }
}

impl<'de> Deserialize<'de> for EcdsaPublicKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        let der = BASE64.decode(&s).map_err(serde::de::Error::custom)?;
        parse_ecdsa_public_key_der(&der).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for EcdsaPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcdsaPublicKey")
            .field("curve", &self.curve())
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

impl EcdsaPublicKey {
    /// Parse PKIX (SubjectPublicKeyInfo) DER
    pub fn from_der(der: &[u8]) -> Result<Self> {
        parse_ecdsa_public_key_der(der)
    }

    /// Parse a PEM-armored PKIX public key
    pub fn from_pem(pem_bytes: &[u8]) -> Result<Self> {
        parse_ecdsa_public_key_der(&extract_pem_block(pem_bytes)?)
    }

    pub fn curve(&self) -> EcdsaCurve {
        match self.inner {
            EcdsaVerifyingKey::P256(_) => EcdsaCurve::P256,
            EcdsaVerifyingKey::P384(_) => EcdsaCurve::P384,
        }
    }

    /// Export as PKIX DER
    pub fn to_der(&self) -> Result<Vec<u8>> {
        match &self.inner {
            EcdsaVerifyingKey::P256(key) => key.to_public_key_der(),
            EcdsaVerifyingKey::P384(key) => key.to_public_key_der(),
        }
        .map(|doc| doc.as_bytes().to_vec())
        .map_err(|e| Error::KeyParse(format!("PKIX encoding failed: {}", e)))
    }

    /// Export as PKIX PEM
    pub fn to_pem(&self) -> Result<String> {
        match &self.inner {
            EcdsaVerifyingKey::P256(key) => key.to_public_key_pem(LineEnding::LF),
            EcdsaVerifyingKey::P384(key) => key.to_public_key_pem(LineEnding::LF),
        }
        .map_err(|e| Error::KeyParse(format!("PKIX encoding failed: {}", e)))
    }

    /// Uncompressed SEC1 point (`0x04 || X || Y`)
    pub fn to_sec1_bytes(&self) -> Vec<u8> {
        match &self.inner {
            EcdsaVerifyingKey::P256(key) => key.to_encoded_point(false).as_bytes().to_vec(),
            EcdsaVerifyingKey::P384(key) => key.to_encoded_point(false).as_bytes().to_vec(),
        }
    }

    /// Get a human-readable fingerprint (first 8 bytes of SHA256, base64)
    pub fn fingerprint(&self) -> String {
        let hash = Sha256::digest(self.to_sec1_bytes());
        BASE64.encode(&hash[..8])
    }

    pub(crate) fn verifying_key(&self) -> &EcdsaVerifyingKey {
        &self.inner
    }
}

/// Parse a PKIX-encoded public key, asserting it is an ECDSA key
pub fn parse_ecdsa_public_key_der(der: &[u8]) -> Result<EcdsaPublicKey> {
    let spki = SubjectPublicKeyInfoRef::try_from(der)
        .map_err(|e| Error::KeyParse(format!("malformed public key DER: {}", e)))?;
    let curve =
        EcdsaCurve::from_algorithm(spki.algorithm.oid, spki.algorithm.parameters_oid().ok())?;

    let inner = match curve {
        EcdsaCurve::P256 => {
            p256::ecdsa::VerifyingKey::from_public_key_der(der).map(EcdsaVerifyingKey::P256)
        }
        EcdsaCurve::P384 => {
            p384::ecdsa::VerifyingKey::from_public_key_der(der).map(EcdsaVerifyingKey::P384)
        }
    }
    .map_err(|e| Error::KeyParse(format!("invalid ECDSA public key: {}", e)))?;
    Ok(EcdsaPublicKey { inner })
}
