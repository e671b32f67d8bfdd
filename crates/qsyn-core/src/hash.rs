//! Stable fingerprints for built schemas.
//!
//! A fingerprint is the blake3 hash of a validator's JSON description, so two
//! schemas derived from the same shape and extensions share one.

use blake3::Hasher;
use serde::Serialize;

use crate::validator::Validator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for Hash256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

pub fn hash_bytes(bytes: &[u8]) -> Hash256 {
    let mut h = Hasher::new();
    h.update(bytes);
    let out = h.finalize();
    Hash256(out.into())
}

/// Hash any serde-serializable value deterministically (via JSON).
pub fn hash_serde<T: Serialize>(v: &T) -> Result<Hash256, crate::error::Error> {
    let bytes = serde_json::to_vec(v).map_err(|e| crate::error::Error::Hash(e.to_string()))?;
    Ok(hash_bytes(&bytes))
}

/// Fingerprint of a validator's description.
pub fn fingerprint<V: Validator + ?Sized>(schema: &V) -> Result<Hash256, crate::error::Error> {
    hash_serde(&schema.describe())
}
