use crate::store::StoreError;

/// Identity-layer errors.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("DID not found: {0}")]
    DidNotFound(String),

    #[error("invalid DID format: {0}")]
    InvalidDid(String),

    #[error("duplicate DID: {0}")]
    DuplicateDid(String),

    #[error("DID is revoked: {0}")]
    DidRevoked(String),

    #[error("cluster not found: {0}")]
    ClusterNotFound(String),

    #[error("invalid link proof: {0}")]
    InvalidProof(String),

    #[error("crypto error: {0}")]
    Crypto(#[from] valence_crypto::CryptoError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
