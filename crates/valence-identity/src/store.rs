use std::path::PathBuf;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::cluster::IdentityCluster;
use crate::node::DidNode;
use crate::proof::LinkProof;

/// Storage backend errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),

    #[error("store serialization error: {0}")]
    Serialization(String),

    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Persistence contract for nodes, clusters, and proof records.
///
/// Implementations must apply each call atomically. Cross-call atomicity of
/// a link/merge is the service's job: `DidManager` serializes its mutating
/// operations, so a single-process store needs nothing beyond per-call
/// consistency. Stores shared between processes must add their own
/// transaction boundary.
#[async_trait]
pub trait DidStore: Send + Sync {
    /// Fetch a node by DID.
    async fn get_node(&self, did: &str) -> Result<Option<DidNode>, StoreError>;

    /// Insert or update a node record.
    async fn put_node(&self, node: DidNode) -> Result<(), StoreError>;

    /// Fetch a cluster by identifier.
    async fn get_cluster(&self, cluster_id: &str) -> Result<Option<IdentityCluster>, StoreError>;

    /// Insert or update a cluster record.
    async fn put_cluster(&self, cluster: IdentityCluster) -> Result<(), StoreError>;

    /// Remove a cluster record (a merge deletes the absorbed cluster).
    async fn delete_cluster(&self, cluster_id: &str) -> Result<(), StoreError>;

    /// Record a link proof for audit. Keyed by `LinkProof::id()`, so
    /// re-recording the same proof is a no-op.
    async fn put_proof(&self, proof: LinkProof) -> Result<(), StoreError>;

    /// All recorded proofs referencing the DID.
    async fn proofs_for(&self, did: &str) -> Result<Vec<LinkProof>, StoreError>;

    /// Every node record.
    async fn list_nodes(&self) -> Result<Vec<DidNode>, StoreError>;

    /// Every cluster record.
    async fn list_clusters(&self) -> Result<Vec<IdentityCluster>, StoreError>;
}

/// In-memory store backed by `DashMap`.
///
/// Per-instance, not a process-wide singleton: each manager gets its own,
/// which keeps tests isolated.
#[derive(Default)]
pub struct InMemoryDidStore {
    nodes: DashMap<String, DidNode>,
    clusters: DashMap<String, IdentityCluster>,
    proofs: DashMap<String, LinkProof>,
}

impl InMemoryDidStore {
    /// Create a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DidStore for InMemoryDidStore {
    async fn get_node(&self, did: &str) -> Result<Option<DidNode>, StoreError> {
        Ok(self.nodes.get(did).map(|entry| entry.clone()))
    }

    async fn put_node(&self, node: DidNode) -> Result<(), StoreError> {
        self.nodes.insert(node.did.clone(), node);
        Ok(())
    }

    async fn get_cluster(&self, cluster_id: &str) -> Result<Option<IdentityCluster>, StoreError> {
        Ok(self.clusters.get(cluster_id).map(|entry| entry.clone()))
    }

    async fn put_cluster(&self, cluster: IdentityCluster) -> Result<(), StoreError> {
        self.clusters.insert(cluster.cluster_id.clone(), cluster);
        Ok(())
    }

    async fn delete_cluster(&self, cluster_id: &str) -> Result<(), StoreError> {
        self.clusters.remove(cluster_id);
        Ok(())
    }

    async fn put_proof(&self, proof: LinkProof) -> Result<(), StoreError> {
        self.proofs.insert(proof.id(), proof);
        Ok(())
    }

    async fn proofs_for(&self, did: &str) -> Result<Vec<LinkProof>, StoreError> {
        Ok(self
            .proofs
            .iter()
            .filter(|entry| entry.value().links(did))
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn list_nodes(&self) -> Result<Vec<DidNode>, StoreError> {
        Ok(self.nodes.iter().map(|entry| entry.value().clone()).collect())
    }

    async fn list_clusters(&self) -> Result<Vec<IdentityCluster>, StoreError> {
        Ok(self
            .clusters
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }
}

/// On-disk snapshot format of `JsonFileStore`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreSnapshot {
    #[serde(default)]
    nodes: Vec<DidNode>,
    #[serde(default)]
    clusters: Vec<IdentityCluster>,
    #[serde(default)]
    proofs: Vec<LinkProof>,
}

/// File-backed store: in-memory maps persisted as a single JSON snapshot
/// (`{nodes, clusters, proofs}`) after every mutation.
pub struct JsonFileStore {
    path: PathBuf,
    inner: InMemoryDidStore,
}

impl JsonFileStore {
    /// Open a store at the given path, loading an existing snapshot if one
    /// is present.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let inner = InMemoryDidStore::new();

        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            let snapshot: StoreSnapshot = serde_json::from_str(&contents)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            for node in snapshot.nodes {
                inner.nodes.insert(node.did.clone(), node);
            }
            for cluster in snapshot.clusters {
                inner.clusters.insert(cluster.cluster_id.clone(), cluster);
            }
            for proof in snapshot.proofs {
                inner.proofs.insert(proof.id(), proof);
            }
        }

        Ok(Self { path, inner })
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn persist(&self) -> Result<(), StoreError> {
        let snapshot = StoreSnapshot {
            nodes: self
                .inner
                .nodes
                .iter()
                .map(|entry| entry.value().clone())
                .collect(),
            clusters: self
                .inner
                .clusters
                .iter()
                .map(|entry| entry.value().clone())
                .collect(),
            proofs: self
                .inner
                .proofs
                .iter()
                .map(|entry| entry.value().clone())
                .collect(),
        };
        let contents = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

#[async_trait]
impl DidStore for JsonFileStore {
    async fn get_node(&self, did: &str) -> Result<Option<DidNode>, StoreError> {
        self.inner.get_node(did).await
    }

    async fn put_node(&self, node: DidNode) -> Result<(), StoreError> {
        self.inner.put_node(node).await?;
        self.persist()
    }

    async fn get_cluster(&self, cluster_id: &str) -> Result<Option<IdentityCluster>, StoreError> {
        self.inner.get_cluster(cluster_id).await
    }

    async fn put_cluster(&self, cluster: IdentityCluster) -> Result<(), StoreError> {
        self.inner.put_cluster(cluster).await?;
        self.persist()
    }

    async fn delete_cluster(&self, cluster_id: &str) -> Result<(), StoreError> {
        self.inner.delete_cluster(cluster_id).await?;
        self.persist()
    }

    async fn put_proof(&self, proof: LinkProof) -> Result<(), StoreError> {
        self.inner.put_proof(proof).await?;
        self.persist()
    }

    async fn proofs_for(&self, did: &str) -> Result<Vec<LinkProof>, StoreError> {
        self.inner.proofs_for(did).await
    }

    async fn list_nodes(&self) -> Result<Vec<DidNode>, StoreError> {
        self.inner.list_nodes().await
    }

    async fn list_clusters(&self) -> Result<Vec<IdentityCluster>, StoreError> {
        self.inner.list_clusters().await
    }
}
