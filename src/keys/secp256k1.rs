//! secp256k1 keys
//!
//! Signatures are DER-encoded ECDSA over the SHA-256 digest of the message,
//! with deterministic nonces (RFC 6979) and low-S normalization.

use k256::ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};

use super::{ensure_len, KeyType};
use crate::crypto::SecureBytes;
use crate::error::{CryptoError, Result};

/// Length of a private scalar
pub const PRIVATE_KEY_LENGTH: usize = 32;

#[derive(Clone, PartialEq, Eq)]
pub struct Secp256k1PublicKey(VerifyingKey);

impl Secp256k1PublicKey {
    /// Parse a compressed (33-byte) or uncompressed (65-byte) SEC1 point.
    /// Compact and hybrid encodings are refused.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        match (bytes.len(), bytes.first()) {
            (33, Some(0x02 | 0x03)) | (65, Some(0x04)) => {}
            _ => {
                return Err(CryptoError::malformed(
                    KeyType::Secp256k1,
                    "invalid SEC1 point encoding",
                ))
            }
        }
        VerifyingKey::from_sec1_bytes(bytes)
            .map(Self)
            .map_err(|_| CryptoError::malformed(KeyType::Secp256k1, "not a valid curve point"))
    }

    /// Compressed SEC1 encoding
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_encoded_point(true).as_bytes().to_vec()
    }

    /// Uncompressed SEC1 encoding
    pub fn to_uncompressed_bytes(&self) -> Vec<u8> {
        self.0.to_encoded_point(false).as_bytes().to_vec()
    }

    /// Verify a DER signature. High-S signatures from other signers are accepted.
    pub fn verify(&self, data: &[u8], sig: &[u8]) -> bool {
        let Ok(signature) = Signature::from_der(sig) else {
            return false;
        };
        let signature = signature.normalize_s().unwrap_or(signature);
        self.0.verify(data, &signature).is_ok()
    }
}

impl std::fmt::Debug for Secp256k1PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Secp256k1PublicKey({})", hex::encode(self.to_bytes()))
    }
}

#[derive(Clone)]
pub struct Secp256k1PrivateKey(SigningKey);

impl Secp256k1PrivateKey {
    /// Parse a 32-byte big-endian scalar in `[1, n)`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ensure_len(KeyType::Secp256k1, bytes, PRIVATE_KEY_LENGTH)?;
        SigningKey::from_slice(bytes)
            .map(Self)
            .map_err(|_| CryptoError::malformed(KeyType::Secp256k1, "scalar out of range"))
    }

    pub fn to_bytes(&self) -> SecureBytes {
        SecureBytes::new(self.0.to_bytes().to_vec())
    }

    pub fn public(&self) -> Secp256k1PublicKey {
        Secp256k1PublicKey(VerifyingKey::from(&self.0))
    }

    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        let signature: Signature = self
            .0
            .try_sign(data)
            .map_err(|e| CryptoError::backend("sign", KeyType::Secp256k1, e))?;
        Ok(signature.to_der().as_bytes().to_vec())
    }
}

impl std::fmt::Debug for Secp256k1PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secp256k1PrivateKey")
            .field("public", &self.public())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> Secp256k1PrivateKey {
        Secp256k1PrivateKey::from_bytes(&[0x11u8; 32]).unwrap()
    }

    #[test]
    fn test_public_key_is_compressed() {
        let public = key().public().to_bytes();

        assert_eq!(public.len(), 33);
        assert!(public[0] == 0x02 || public[0] == 0x03);
    }

    #[test]
    fn test_uncompressed_input_accepted() {
        let public = key().public();
        let parsed = Secp256k1PublicKey::from_bytes(&public.to_uncompressed_bytes()).unwrap();

        assert_eq!(parsed, public);
        assert_eq!(parsed.to_bytes(), public.to_bytes());
    }

    #[test]
    fn test_invalid_point_rejected() {
        let mut bogus = key().public().to_bytes();
        bogus[0] = 0x05;

        assert!(matches!(
            Secp256k1PublicKey::from_bytes(&bogus),
            Err(CryptoError::MalformedKey(_))
        ));
    }

    #[test]
    fn test_tag_must_match_length() {
        let compressed = key().public().to_bytes();
        let uncompressed = key().public().to_uncompressed_bytes();

        let mut long_compressed = uncompressed.clone();
        long_compressed[0] = 0x02;
        let mut short_uncompressed = compressed.clone();
        short_uncompressed[0] = 0x04;
        let mut hybrid = uncompressed.clone();
        hybrid[0] = 0x06;

        for bytes in [long_compressed, short_uncompressed, hybrid, vec![], vec![0x00]] {
            assert!(matches!(
                Secp256k1PublicKey::from_bytes(&bytes),
                Err(CryptoError::MalformedKey(_))
            ));
        }
    }

    #[test]
    fn test_invalid_scalars_rejected() {
        for bytes in [vec![0u8; 32], vec![0xFFu8; 32], vec![1u8; 31], vec![1u8; 33]] {
            assert!(matches!(
                Secp256k1PrivateKey::from_bytes(&bytes),
                Err(CryptoError::MalformedKey(_))
            ));
        }
    }

    #[test]
    fn test_signatures_are_deterministic() {
        let a = key().sign(b"hello world").unwrap();
        let b = key().sign(b"hello world").unwrap();

        assert_eq!(a, b);
        assert!(key().public().verify(b"hello world", &a));
        assert!(!key().public().verify(b"hello", &a));
    }

    #[test]
    fn test_garbage_signature_is_false() {
        assert!(!key().public().verify(b"hello world", b"not a signature"));
    }
}
