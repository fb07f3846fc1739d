use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use valence_crypto::PublicKey;

use crate::error::IdentityError;

/// Lifecycle status of a DID node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DidStatus {
    /// The node participates in resolution and linking.
    Active,
    /// The node's key is compromised or retired. Terminal.
    Revoked,
    /// The node is administratively paused and may be reinstated.
    Suspended,
}

impl std::fmt::Display for DidStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Revoked => write!(f, "revoked"),
            Self::Suspended => write!(f, "suspended"),
        }
    }
}

/// A single node identity: one device/context with its own Ed25519 keypair.
///
/// The DID is immutable once created; only the status (and its revocation
/// metadata) changes over the node's life. Every node belongs to exactly one
/// cluster, tracked by `cluster_id`. Private keys are never part of this
/// record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DidNode {
    /// The node's DID (`did:valence:<fingerprint>`).
    pub did: String,
    /// Base58-encoded Ed25519 public key (32 bytes).
    pub public_key_bs58: String,
    /// Optional human-readable label (e.g., "laptop").
    pub label: Option<String>,
    /// Current lifecycle status.
    pub status: DidStatus,
    /// Identifier of the cluster this node belongs to.
    pub cluster_id: String,
    /// When the node was created.
    pub created_at: DateTime<Utc>,
    /// When the node was revoked, if it was.
    pub revoked_at: Option<DateTime<Utc>>,
    /// Why the node was revoked, if a reason was given.
    pub revocation_reason: Option<String>,
}

impl DidNode {
    /// Create a new ACTIVE node record.
    pub fn new(did: String, public_key: &PublicKey, label: Option<&str>, cluster_id: String) -> Self {
        Self {
            did,
            public_key_bs58: public_key.to_bs58(),
            label: label.map(str::to_string),
            status: DidStatus::Active,
            cluster_id,
            created_at: Utc::now(),
            revoked_at: None,
            revocation_reason: None,
        }
    }

    /// Decode the recorded public key.
    pub fn public_key(&self) -> Result<PublicKey, IdentityError> {
        Ok(PublicKey::from_bs58(&self.public_key_bs58)?)
    }

    /// Whether the node is ACTIVE.
    pub fn is_active(&self) -> bool {
        self.status == DidStatus::Active
    }
}
