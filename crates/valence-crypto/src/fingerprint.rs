use crate::keys::PublicKey;

/// BLAKE3 hash (32 bytes).
pub type Hash = [u8; 32];

/// Number of hash bytes rendered into a fingerprint (16 bytes = 32 hex chars).
const FINGERPRINT_BYTES: usize = 16;

/// Length of a textual fingerprint in characters.
pub const FINGERPRINT_LEN: usize = FINGERPRINT_BYTES * 2;

/// Hash arbitrary data using BLAKE3.
pub fn hash(data: &[u8]) -> Hash {
    *blake3::hash(data).as_bytes()
}

/// Compute the textual fingerprint of an Ed25519 public key.
///
/// The fingerprint is the first 16 bytes of the BLAKE3 hash of the raw
/// public key, hex-encoded: a fixed-length 32-character lowercase string.
/// Identical keys always yield identical fingerprints.
pub fn fingerprint(public_key: &PublicKey) -> String {
    let digest = hash(public_key.as_bytes());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}
