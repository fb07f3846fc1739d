use valence_crypto::{fingerprint, PublicKey, FINGERPRINT_LEN};

use crate::error::IdentityError;

/// Prefix of every Valence DID.
pub const DID_PREFIX: &str = "did:valence:";

/// Derive the DID string for a public key.
///
/// The DID format is: `did:valence:<fingerprint>` where the fingerprint is
/// the fixed-length BLAKE3 rendering of the raw key. Pure and deterministic:
/// the same key always derives the same DID.
pub fn derive_did(public_key: &PublicKey) -> String {
    format!("{}{}", DID_PREFIX, fingerprint(public_key))
}

/// Validate the textual form of a DID.
pub fn validate_did(did: &str) -> Result<(), IdentityError> {
    let fp = did
        .strip_prefix(DID_PREFIX)
        .ok_or_else(|| IdentityError::InvalidDid(did.to_string()))?;
    if fp.len() != FINGERPRINT_LEN || !fp.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')) {
        return Err(IdentityError::InvalidDid(did.to_string()));
    }
    Ok(())
}

/// Check that a DID was derived from the given public key.
///
/// Recomputes the DID from the key and compares; used wherever a DID claim
/// must be bound to key material (proof verification in particular).
pub fn did_matches_key(did: &str, public_key: &PublicKey) -> bool {
    derive_did(public_key) == did
}
