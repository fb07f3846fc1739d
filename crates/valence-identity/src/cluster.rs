use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::node::DidNode;

/// A set of DID nodes recognized as one conceptual user.
///
/// Clusters partition the universe of known DIDs: every DID belongs to
/// exactly one cluster at any time. The cluster identifier is stable once
/// assigned and survives membership changes. Membership is only ever grown
/// (merges); revocation keeps the member listed for audit, so a cluster
/// whose members are all revoked goes dormant rather than being deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityCluster {
    /// Stable cluster identifier (UUID v7).
    pub cluster_id: String,
    /// Optional human-readable label.
    pub label: Option<String>,
    /// Member DIDs, insertion-ordered, no duplicates.
    pub member_dids: Vec<String>,
    /// When the cluster was created. Drives merge-survivor selection.
    pub created_at: DateTime<Utc>,
}

impl IdentityCluster {
    /// Create a fresh singleton cluster for a newly created DID.
    pub fn singleton(did: &str) -> Self {
        Self {
            cluster_id: Uuid::now_v7().to_string(),
            label: None,
            member_dids: vec![did.to_string()],
            created_at: Utc::now(),
        }
    }

    /// Whether the DID is a member of this cluster.
    pub fn contains(&self, did: &str) -> bool {
        self.member_dids.iter().any(|d| d == did)
    }

    /// Add a member DID. Adding an existing member is a no-op.
    pub fn add_member(&mut self, did: &str) {
        if !self.contains(did) {
            self.member_dids.push(did.to_string());
        }
    }

    /// Take over every member of another cluster.
    pub fn absorb(&mut self, other: &IdentityCluster) {
        for did in &other.member_dids {
            self.add_member(did);
        }
    }

    /// Number of members, regardless of status.
    pub fn member_count(&self) -> usize {
        self.member_dids.len()
    }
}

/// Decide which of two clusters survives a merge.
///
/// Returns `(survivor, absorbed)`. The earlier-created cluster wins; equal
/// timestamps fall back to the lexicographically smaller cluster_id. The
/// ordering depends only on the clusters themselves, never on argument
/// order, which keeps merges commutative and associative.
pub fn merge_order(a: IdentityCluster, b: IdentityCluster) -> (IdentityCluster, IdentityCluster) {
    let a_wins = (a.created_at, a.cluster_id.as_str()) <= (b.created_at, b.cluster_id.as_str());
    if a_wins {
        (a, b)
    } else {
        (b, a)
    }
}

/// Which members a resolution reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolvePolicy {
    /// Only ACTIVE members (the default usage contract).
    #[default]
    ActiveOnly,
    /// Every member, including revoked and suspended ones.
    All,
}

/// Resolution result: a cluster plus its member records under a policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterView {
    /// The cluster's stable identifier.
    pub cluster_id: String,
    /// The cluster's label, if any.
    pub label: Option<String>,
    /// When the cluster was created.
    pub created_at: DateTime<Utc>,
    /// Member records that passed the policy filter.
    pub members: Vec<DidNode>,
    /// Total membership count before filtering.
    pub total_members: usize,
}

impl ClusterView {
    /// Whether the filtered view includes the DID.
    pub fn contains(&self, did: &str) -> bool {
        self.members.iter().any(|n| n.did == did)
    }
}
