//! Ed25519 keys
//!
//! The private wire payload is the 64-byte `seed || public` concatenation that
//! libp2p has always used. A legacy 96-byte form with the public key repeated
//! is still accepted on input.

use ed25519_dalek::{
    Signature, Signer, SigningKey, Verifier, VerifyingKey, KEYPAIR_LENGTH, PUBLIC_KEY_LENGTH,
    SECRET_KEY_LENGTH,
};
use zeroize::Zeroize;

use super::{ensure_len, KeyType};
use crate::crypto::SecureBytes;
use crate::error::{CryptoError, Result};

/// Length of the legacy private payload with a redundant public key
const LEGACY_PRIVATE_LENGTH: usize = KEYPAIR_LENGTH + PUBLIC_KEY_LENGTH;

#[derive(Clone, PartialEq, Eq)]
pub struct Ed25519PublicKey(VerifyingKey);

impl Ed25519PublicKey {
    /// Parse a 32-byte compressed Edwards point
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ensure_len(KeyType::Ed25519, bytes, PUBLIC_KEY_LENGTH)?;

        let mut key = [0u8; PUBLIC_KEY_LENGTH];
        key.copy_from_slice(bytes);
        VerifyingKey::from_bytes(&key)
            .map(Self)
            .map_err(|e| CryptoError::malformed(KeyType::Ed25519, e))
    }

    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.0.to_bytes()
    }

    pub fn verify(&self, data: &[u8], sig: &[u8]) -> bool {
        let Ok(signature) = Signature::from_slice(sig) else {
            return false;
        };
        self.0.verify(data, &signature).is_ok()
    }
}

impl std::fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519PublicKey({})", hex::encode(self.to_bytes()))
    }
}

#[derive(Clone)]
pub struct Ed25519PrivateKey(SigningKey);

impl Ed25519PrivateKey {
    /// Derive a key pair from a 32-byte seed
    ///
    /// # Errors
    /// InvalidParameter unless the seed is exactly 32 bytes. Short seeds are never padded.
    pub fn from_seed(seed: &[u8]) -> Result<Self> {
        if seed.len() != SECRET_KEY_LENGTH {
            return Err(CryptoError::InvalidParameter(format!(
                "seed must be {SECRET_KEY_LENGTH} bytes, got {}",
                seed.len()
            )));
        }

        let mut bytes = [0u8; SECRET_KEY_LENGTH];
        bytes.copy_from_slice(seed);
        let key = SigningKey::from_bytes(&bytes);
        bytes.zeroize();

        Ok(Self(key))
    }

    /// Parse the 64-byte `seed || public` payload (or the legacy 96-byte form)
    ///
    /// The embedded public key must match the one derived from the seed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let keypair = match bytes.len() {
            KEYPAIR_LENGTH => bytes,
            LEGACY_PRIVATE_LENGTH => {
                let (keypair, redundant) = bytes.split_at(KEYPAIR_LENGTH);
                if redundant != &keypair[SECRET_KEY_LENGTH..] {
                    return Err(CryptoError::malformed(
                        KeyType::Ed25519,
                        "redundant public key does not match",
                    ));
                }
                keypair
            }
            n => {
                return Err(CryptoError::malformed(
                    KeyType::Ed25519,
                    format!("key must be of length {KEYPAIR_LENGTH}, got {n}"),
                ))
            }
        };

        let mut buf = [0u8; KEYPAIR_LENGTH];
        buf.copy_from_slice(keypair);
        let key = SigningKey::from_keypair_bytes(&buf);
        buf.zeroize();

        key.map(Self)
            .map_err(|e| CryptoError::malformed(KeyType::Ed25519, e))
    }

    /// The 64-byte `seed || public` wire payload
    pub fn to_bytes(&self) -> SecureBytes {
        SecureBytes::new(self.0.to_keypair_bytes().to_vec())
    }

    pub fn public(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.0.verifying_key())
    }

    pub fn sign(&self, data: &[u8]) -> Vec<u8> {
        self.0.sign(data).to_bytes().to_vec()
    }
}

impl std::fmt::Debug for Ed25519PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519PrivateKey")
            .field("public", &self.public())
            .finish()
    }
}
