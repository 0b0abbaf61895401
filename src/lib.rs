//! Ephemeral SSH key pairs.
//!
//! [`keys::KeyGenerator`] drives `ssh-keygen` (Ed25519 first, RSA as a
//! fallback), locks the private key down to its owner, and arms a
//! [`keys::LifecycleTimer`] that deletes the pair once its time-to-live has
//! passed. The returned [`keys::KeyPairHandle`] can be deleted earlier by
//! hand; deletion is idempotent, so the two paths never conflict.

pub mod config;
pub mod error;
pub mod keys;

pub use error::{GhostKeyError, Result};
