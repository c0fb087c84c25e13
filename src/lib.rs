//! Peer Keys - algorithm-agnostic identity keys for peer-to-peer networks
//!
//! This crate provides:
//! - RSA, Ed25519 and secp256k1 key pairs behind one `PrivateKey`/`PublicKey` API
//! - The protobuf key envelope shared with other libp2p implementations
//! - Password-protected export and import of private keys
//! - Session key stretching for secure-channel handshakes
//! - The primitives those build on: AES-CTR, AES-GCM, HMAC, PBKDF2, ECDH

pub mod config;
pub mod crypto;
pub mod error;
pub mod keys;

pub use config::Config;
pub use error::{CryptoError, Result};
pub use keys::{
    marshal_private_key, marshal_public_key, stretch_key, stretch_key_named,
    unmarshal_private_key, unmarshal_public_key, CipherType, ExportFormat, ExportParams,
    KeyRegistry, KeyType, PrivateKey, PublicKey, SessionKeys, StretchedKeys,
};
