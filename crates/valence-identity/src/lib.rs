//! Valence Identity Layer
//!
//! Multi-DID identity management with Ed25519 cryptography. Each node in
//! the network has its own DID; a user may operate multiple nodes, grouped
//! into an [`IdentityCluster`]. DIDs are linked via bilateral cryptographic
//! proofs so that compromise of one node does not endanger the others.
//!
//! Key concepts:
//! - [`DidNode`]: a single node identity with its own Ed25519 keypair.
//! - [`IdentityCluster`]: groups multiple nodes under one conceptual identity.
//! - [`LinkProof`]: cryptographic proof that two DIDs belong to the same
//!   cluster. Both nodes sign, so neither can forge the link alone.
//! - [`DidManager`]: service layer for creating, linking, revoking, and
//!   resolving DIDs over a pluggable [`DidStore`].
//!
//! Security properties:
//! - No master key, no single point of failure.
//! - Revoking one DID never affects the others in its cluster.
//! - Link proofs are bilateral and re-verifiable offline.

pub mod error;
pub mod did;
pub mod node;
pub mod cluster;
pub mod proof;
pub mod store;
pub mod manager;
pub mod config;

pub use error::IdentityError;
pub use did::{derive_did, did_matches_key, validate_did, DID_PREFIX};
pub use node::{DidNode, DidStatus};
pub use cluster::{ClusterView, IdentityCluster, ResolvePolicy};
pub use proof::LinkProof;
pub use store::{DidStore, InMemoryDidStore, JsonFileStore, StoreError};
pub use manager::DidManager;
pub use config::{ConfigError, IdentityConfig, ResolveConfig, StoreConfig};
