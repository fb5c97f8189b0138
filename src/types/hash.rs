use sha2::{Digest, Sha256};

pub fn compute(data: &[u8]) -> Vec<u8> {
    Sha256::digest(data).to_vec()
}

/// Hash of the JSON form of `value`.
pub fn calculate_hash<T: serde::Serialize>(value: &T) -> crate::Result<Vec<u8>> {
    let serialized = serde_json::to_vec(value)?;
    Ok(compute(&serialized))
}
