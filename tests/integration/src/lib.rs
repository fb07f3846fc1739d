//! Integration test crate for the Valence workspace. Tests live in tests/.
