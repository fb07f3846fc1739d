use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use valence_crypto::KeyPair;

use crate::cluster::{merge_order, ClusterView, IdentityCluster, ResolvePolicy};
use crate::config::IdentityConfig;
use crate::did::derive_did;
use crate::error::IdentityError;
use crate::node::{DidNode, DidStatus};
use crate::proof::LinkProof;
use crate::store::{DidStore, InMemoryDidStore, JsonFileStore};

/// Service layer for creating, linking, revoking, and resolving DIDs.
///
/// Thin orchestration over a pluggable [`DidStore`]: the deriver produces
/// DID + key, the proof engine binds two DIDs, and the cluster partition is
/// maintained union-find style (each node carries its cluster id, clusters
/// are an arena keyed by id). Mutating operations hold a manager-wide lock
/// for their whole read-modify-write span, so partial updates are never
/// observable through this instance; reads take no lock.
pub struct DidManager {
    store: Arc<dyn DidStore>,
    default_policy: ResolvePolicy,
    write_lock: Mutex<()>,
}

impl DidManager {
    /// Create a manager over an injected store.
    pub fn new(store: Arc<dyn DidStore>) -> Self {
        Self {
            store,
            default_policy: ResolvePolicy::ActiveOnly,
            write_lock: Mutex::new(()),
        }
    }

    /// Create a manager over a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryDidStore::new()))
    }

    /// Create a manager from configuration: a store path selects the
    /// JSON-file store, otherwise the store stays in memory.
    pub fn from_config(config: &IdentityConfig) -> Result<Self, IdentityError> {
        let store: Arc<dyn DidStore> = match &config.store.path {
            Some(path) => Arc::new(JsonFileStore::open(path)?),
            None => Arc::new(InMemoryDidStore::new()),
        };
        Ok(Self {
            store,
            default_policy: config.resolve.policy,
            write_lock: Mutex::new(()),
        })
    }

    /// Generate a fresh keypair, derive its DID, and register the node in
    /// its own singleton cluster.
    ///
    /// Returns the node record and the private key. The key is handed to
    /// the caller and never persisted; the caller is its sole owner.
    pub async fn create_node(
        &self,
        label: Option<&str>,
    ) -> Result<(DidNode, KeyPair), IdentityError> {
        let keypair = KeyPair::generate()?;
        let public_key = keypair.public_key();
        let did = derive_did(&public_key);

        let _guard = self.write_lock.lock().await;
        if self.store.get_node(&did).await?.is_some() {
            return Err(IdentityError::DuplicateDid(did));
        }

        let cluster = IdentityCluster::singleton(&did);
        let node = DidNode::new(did, &public_key, label, cluster.cluster_id.clone());
        self.store.put_cluster(cluster).await?;
        self.store.put_node(node.clone()).await?;

        tracing::info!(did = %node.did, cluster = %node.cluster_id, "DID created");
        Ok((node, keypair))
    }

    /// Link two DIDs: build the bilateral proof (both private keys
    /// required) and apply it.
    pub async fn link_dids(
        &self,
        did_a: &str,
        key_a: &KeyPair,
        did_b: &str,
        key_b: &KeyPair,
    ) -> Result<LinkProof, IdentityError> {
        let proof = LinkProof::create(did_a, key_a, did_b, key_b)?;
        self.apply_link_proof(&proof).await?;
        Ok(proof)
    }

    /// Apply an existing link proof (e.g., one received from another
    /// device) and return the resulting cluster.
    ///
    /// Verifies the proof against the recorded public keys first
    /// (`InvalidProof` on failure). If both DIDs already share a cluster
    /// the call is a no-op apart from recording the proof; otherwise the
    /// two clusters are merged, the earlier-created one surviving.
    /// Replaying a proof is always idempotent.
    pub async fn apply_link_proof(
        &self,
        proof: &LinkProof,
    ) -> Result<IdentityCluster, IdentityError> {
        let _guard = self.write_lock.lock().await;

        let node_a = self
            .store
            .get_node(&proof.did_a)
            .await?
            .ok_or_else(|| IdentityError::DidNotFound(proof.did_a.clone()))?;
        let node_b = self
            .store
            .get_node(&proof.did_b)
            .await?
            .ok_or_else(|| IdentityError::DidNotFound(proof.did_b.clone()))?;

        if !proof.verify(&node_a.public_key()?, &node_b.public_key()?) {
            return Err(IdentityError::InvalidProof(
                "proof does not verify against the recorded keys".into(),
            ));
        }

        if node_a.status == DidStatus::Revoked {
            return Err(IdentityError::DidRevoked(node_a.did));
        }
        if node_b.status == DidStatus::Revoked {
            return Err(IdentityError::DidRevoked(node_b.did));
        }

        let cluster_a = self
            .store
            .get_cluster(&node_a.cluster_id)
            .await?
            .ok_or_else(|| IdentityError::ClusterNotFound(node_a.cluster_id.clone()))?;

        if node_a.cluster_id == node_b.cluster_id {
            // Link already implied; keep the proof for audit.
            self.store.put_proof(proof.clone()).await?;
            tracing::debug!(
                did_a = %proof.did_a,
                did_b = %proof.did_b,
                cluster = %cluster_a.cluster_id,
                "link replayed, DIDs already share a cluster"
            );
            return Ok(cluster_a);
        }

        let cluster_b = self
            .store
            .get_cluster(&node_b.cluster_id)
            .await?
            .ok_or_else(|| IdentityError::ClusterNotFound(node_b.cluster_id.clone()))?;

        let (mut survivor, absorbed) = merge_order(cluster_a, cluster_b);
        survivor.absorb(&absorbed);

        for did in &absorbed.member_dids {
            let mut member = self
                .store
                .get_node(did)
                .await?
                .ok_or_else(|| IdentityError::DidNotFound(did.clone()))?;
            member.cluster_id = survivor.cluster_id.clone();
            self.store.put_node(member).await?;
        }
        self.store.put_cluster(survivor.clone()).await?;
        self.store.delete_cluster(&absorbed.cluster_id).await?;
        self.store.put_proof(proof.clone()).await?;

        tracing::info!(
            did_a = %proof.did_a,
            did_b = %proof.did_b,
            survivor = %survivor.cluster_id,
            absorbed = %absorbed.cluster_id,
            "clusters merged"
        );
        Ok(survivor)
    }

    /// Verify a link proof against the public keys on record.
    ///
    /// A predicate: unknown DIDs, store failures, undecodable keys, and
    /// semantic proof failures all yield `false`, never an error.
    pub async fn verify_link_proof(&self, proof: &LinkProof) -> bool {
        let node_a = match self.store.get_node(&proof.did_a).await {
            Ok(Some(node)) => node,
            _ => return false,
        };
        let node_b = match self.store.get_node(&proof.did_b).await {
            Ok(Some(node)) => node,
            _ => return false,
        };
        let (key_a, key_b) = match (node_a.public_key(), node_b.public_key()) {
            (Ok(a), Ok(b)) => (a, b),
            _ => return false,
        };
        proof.verify(&key_a, &key_b)
    }

    /// Revoke a DID, recording the reason and timestamp.
    ///
    /// Membership in its cluster is retained for audit; no other DID's
    /// status, membership, or resolvability changes. Revoking an already
    /// revoked DID is a no-op returning the stored record.
    pub async fn revoke_did(
        &self,
        did: &str,
        reason: Option<&str>,
    ) -> Result<DidNode, IdentityError> {
        let _guard = self.write_lock.lock().await;
        let mut node = self
            .store
            .get_node(did)
            .await?
            .ok_or_else(|| IdentityError::DidNotFound(did.to_string()))?;

        if node.status == DidStatus::Revoked {
            return Ok(node);
        }

        node.status = DidStatus::Revoked;
        node.revoked_at = Some(Utc::now());
        node.revocation_reason = reason.map(str::to_string);
        self.store.put_node(node.clone()).await?;

        tracing::warn!(
            did = %node.did,
            reason = node.revocation_reason.as_deref().unwrap_or(""),
            "DID revoked"
        );
        Ok(node)
    }

    /// Suspend an ACTIVE DID. An explicit administrative action with the
    /// same isolation guarantees as revocation; idempotent.
    pub async fn suspend_did(&self, did: &str) -> Result<DidNode, IdentityError> {
        let _guard = self.write_lock.lock().await;
        let mut node = self
            .store
            .get_node(did)
            .await?
            .ok_or_else(|| IdentityError::DidNotFound(did.to_string()))?;

        match node.status {
            DidStatus::Revoked => Err(IdentityError::DidRevoked(node.did)),
            DidStatus::Suspended => Ok(node),
            DidStatus::Active => {
                node.status = DidStatus::Suspended;
                self.store.put_node(node.clone()).await?;
                tracing::info!(did = %node.did, "DID suspended");
                Ok(node)
            }
        }
    }

    /// Reinstate a SUSPENDED DID to ACTIVE. Revoked DIDs stay revoked;
    /// idempotent for already active nodes.
    pub async fn reinstate_did(&self, did: &str) -> Result<DidNode, IdentityError> {
        let _guard = self.write_lock.lock().await;
        let mut node = self
            .store
            .get_node(did)
            .await?
            .ok_or_else(|| IdentityError::DidNotFound(did.to_string()))?;

        match node.status {
            DidStatus::Revoked => Err(IdentityError::DidRevoked(node.did)),
            DidStatus::Active => Ok(node),
            DidStatus::Suspended => {
                node.status = DidStatus::Active;
                self.store.put_node(node.clone()).await?;
                tracing::info!(did = %node.did, "DID reinstated");
                Ok(node)
            }
        }
    }

    /// Resolve a DID to its cluster under the manager's default policy.
    ///
    /// Revoked DIDs remain resolvable by their own identifier; under the
    /// default active-only policy they simply no longer appear among the
    /// reported members.
    pub async fn resolve_identity(&self, did: &str) -> Result<ClusterView, IdentityError> {
        self.resolve_identity_with(did, self.default_policy).await
    }

    /// Resolve a DID to its cluster under an explicit policy.
    pub async fn resolve_identity_with(
        &self,
        did: &str,
        policy: ResolvePolicy,
    ) -> Result<ClusterView, IdentityError> {
        let node = self
            .store
            .get_node(did)
            .await?
            .ok_or_else(|| IdentityError::DidNotFound(did.to_string()))?;
        let cluster = self
            .store
            .get_cluster(&node.cluster_id)
            .await?
            .ok_or_else(|| IdentityError::ClusterNotFound(node.cluster_id.clone()))?;

        let total_members = cluster.member_count();
        let mut members = Vec::with_capacity(total_members);
        for member_did in &cluster.member_dids {
            let member = self
                .store
                .get_node(member_did)
                .await?
                .ok_or_else(|| IdentityError::DidNotFound(member_did.clone()))?;
            if policy == ResolvePolicy::All || member.is_active() {
                members.push(member);
            }
        }

        Ok(ClusterView {
            cluster_id: cluster.cluster_id,
            label: cluster.label,
            created_at: cluster.created_at,
            members,
            total_members,
        })
    }

    /// Fetch a single node record.
    pub async fn get_node(&self, did: &str) -> Result<DidNode, IdentityError> {
        self.store
            .get_node(did)
            .await?
            .ok_or_else(|| IdentityError::DidNotFound(did.to_string()))
    }

    /// Every known node.
    pub async fn list_nodes(&self) -> Result<Vec<DidNode>, IdentityError> {
        Ok(self.store.list_nodes().await?)
    }

    /// Every known cluster.
    pub async fn list_clusters(&self) -> Result<Vec<IdentityCluster>, IdentityError> {
        Ok(self.store.list_clusters().await?)
    }

    /// Audit trail: every recorded proof referencing the DID.
    pub async fn proofs_for(&self, did: &str) -> Result<Vec<LinkProof>, IdentityError> {
        Ok(self.store.proofs_for(did).await?)
    }
}
