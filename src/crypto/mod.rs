//! Cryptographic primitives used by the key layer
//!
//! This module provides:
//! - PBKDF2 for password-based key derivation
//! - AES-GCM for the password-protected export envelope
//! - AES-CTR and HMAC for session ciphers
//! - Ephemeral ECDH over P-256 / P-384 / P-521
//! - The injectable [`KeyBackend`] used for key generation
//! - Secure memory handling with automatic zeroing

pub mod aes;
pub mod aes_gcm;
mod backend;
pub mod ecdh;
mod hash;
pub mod hmac;
mod pbkdf2;
mod random;
mod secure_bytes;

pub use backend::{KeyBackend, OsBackend, ED25519_SEED_LEN};
pub use hash::HashType;
pub use self::pbkdf2::{pbkdf2, pbkdf2_named};
pub use random::random_bytes;
pub use secure_bytes::SecureBytes;
