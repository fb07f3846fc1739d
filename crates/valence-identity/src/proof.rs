use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use valence_crypto::{hash, sign, verify, KeyPair, PublicKey, Signature};

use crate::did::{did_matches_key, validate_did};
use crate::error::IdentityError;

/// Domain separation tag for link-proof payloads.
const PAYLOAD_DOMAIN: &[u8] = b"valence:link-proof:v1";

/// A bilateral proof that two DIDs belong to the same identity.
///
/// Both parties sign the identical canonical payload, so neither can forge
/// the link alone. The DID pair is normalized at construction
/// (`did_a < did_b` lexicographically): linking (a, b) and linking (b, a)
/// produce the same proof shape and the same payload. Once created a proof
/// is immutable and re-verifiable offline against the two recorded public
/// keys, with no external authority involved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkProof {
    /// The lexicographically smaller DID of the pair.
    pub did_a: String,
    /// The lexicographically larger DID of the pair.
    pub did_b: String,
    /// Uniqueness nonce (UUID v7).
    pub nonce: Uuid,
    /// Creation timestamp (Unix milliseconds).
    pub timestamp_ms: u64,
    /// Ed25519 signature by `did_a`'s key over the canonical payload.
    pub signature_a: Vec<u8>,
    /// Ed25519 signature by `did_b`'s key over the canonical payload.
    pub signature_b: Vec<u8>,
}

impl LinkProof {
    /// Construct a bilateral link proof. Requires both private keys;
    /// that requirement is the point of the scheme.
    ///
    /// Fails with `InvalidProof` for a self-link, a malformed DID, or a
    /// keypair that does not derive its claimed DID (such a proof could
    /// never verify).
    pub fn create(
        did_a: &str,
        key_a: &KeyPair,
        did_b: &str,
        key_b: &KeyPair,
    ) -> Result<Self, IdentityError> {
        if did_a == did_b {
            return Err(IdentityError::InvalidProof(
                "cannot link a DID to itself".into(),
            ));
        }
        validate_did(did_a)?;
        validate_did(did_b)?;
        if !did_matches_key(did_a, &key_a.public_key()) {
            return Err(IdentityError::InvalidProof(format!(
                "keypair does not derive {}",
                did_a
            )));
        }
        if !did_matches_key(did_b, &key_b.public_key()) {
            return Err(IdentityError::InvalidProof(format!(
                "keypair does not derive {}",
                did_b
            )));
        }

        // Normalize the pair so argument order never changes the payload.
        let ((did_a, key_a), (did_b, key_b)) = if did_a < did_b {
            ((did_a, key_a), (did_b, key_b))
        } else {
            ((did_b, key_b), (did_a, key_a))
        };

        let nonce = Uuid::now_v7();
        let timestamp_ms = Utc::now().timestamp_millis() as u64;
        let payload = signing_payload(did_a, did_b, &nonce, timestamp_ms);

        Ok(Self {
            did_a: did_a.to_string(),
            did_b: did_b.to_string(),
            nonce,
            timestamp_ms,
            signature_a: sign(&payload, key_a).to_bytes().to_vec(),
            signature_b: sign(&payload, key_b).to_bytes().to_vec(),
        })
    }

    /// Recompute the canonical payload both parties signed.
    pub fn signing_payload(&self) -> Vec<u8> {
        signing_payload(&self.did_a, &self.did_b, &self.nonce, self.timestamp_ms)
    }

    /// Stable identifier for audit storage: BLAKE3 of the payload, hex.
    pub fn id(&self) -> String {
        hex::encode(&hash(&self.signing_payload())[..16])
    }

    /// Whether the proof references the DID.
    pub fn links(&self, did: &str) -> bool {
        self.did_a == did || self.did_b == did
    }

    /// The other DID of the pair, if the given one is referenced.
    pub fn counterpart(&self, did: &str) -> Option<&str> {
        if self.did_a == did {
            Some(&self.did_b)
        } else if self.did_b == did {
            Some(&self.did_a)
        } else {
            None
        }
    }

    /// Verify both signatures against the given public keys.
    ///
    /// A predicate, never an error: any malformed structure, DID/key
    /// mismatch, or signature failure yields `false`. Pure in
    /// (proof, keys) and fully offline, so repeated verification always
    /// agrees.
    pub fn verify(&self, key_a: &PublicKey, key_b: &PublicKey) -> bool {
        // Normalized order doubles as the self-link rejection.
        if self.did_a >= self.did_b {
            return false;
        }
        if validate_did(&self.did_a).is_err() || validate_did(&self.did_b).is_err() {
            return false;
        }
        if !did_matches_key(&self.did_a, key_a) || !did_matches_key(&self.did_b, key_b) {
            return false;
        }
        let (sig_a, sig_b) = match (
            Signature::from_bytes(&self.signature_a),
            Signature::from_bytes(&self.signature_b),
        ) {
            (Ok(a), Ok(b)) => (a, b),
            _ => return false,
        };
        let payload = self.signing_payload();
        verify(&payload, &sig_a, key_a).is_ok() && verify(&payload, &sig_b, key_b).is_ok()
    }
}

/// Deterministic byte encoding of the signed fields: domain tag, both DIDs
/// length-prefixed (u32 BE), 16 nonce bytes, u64 BE timestamp.
fn signing_payload(did_a: &str, did_b: &str, nonce: &Uuid, timestamp_ms: u64) -> Vec<u8> {
    let mut payload = Vec::new();

    payload.extend_from_slice(PAYLOAD_DOMAIN);

    let a = did_a.as_bytes();
    payload.extend_from_slice(&(a.len() as u32).to_be_bytes());
    payload.extend_from_slice(a);

    let b = did_b.as_bytes();
    payload.extend_from_slice(&(b.len() as u32).to_be_bytes());
    payload.extend_from_slice(b);

    payload.extend_from_slice(nonce.as_bytes());
    payload.extend_from_slice(&timestamp_ms.to_be_bytes());

    payload
}
