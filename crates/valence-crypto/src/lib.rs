//! Valence Cryptographic Primitives
//!
//! Wraps established libraries for the Valence identity layer:
//! - Ed25519 key generation and signing (ed25519-dalek)
//! - BLAKE3 public-key fingerprints
//!
//! No custom cryptography. Private key material is zeroized on drop and
//! never serialized by this crate.

pub mod error;
pub mod fingerprint;
pub mod keys;
pub mod signing;

pub use error::CryptoError;
pub use fingerprint::{fingerprint, hash, Hash, FINGERPRINT_LEN};
pub use keys::{KeyPair, PublicKey};
pub use signing::{sign, verify, Signature};
