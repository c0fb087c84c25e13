use thiserror::Error;

use crate::keys::KeyType;

pub type Result<T> = std::result::Result<T, CryptoError>;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid or unsupported key type {0}. Must be RSA / Ed25519 / secp256k1")]
    UnsupportedKeyType(String),

    #[error("seed key derivation is unimplemented for {0}")]
    UnsupportedDerivation(KeyType),

    #[error("{operation} is not supported by {key_type} keys")]
    UnsupportedOperation {
        operation: &'static str,
        key_type: KeyType,
    },

    #[error("cipher '{0}' is unknown or not supported. Must be AES-128 / AES-256 / Blowfish")]
    UnsupportedCipher(String),

    #[error("hash '{0}' is unknown or not supported. Must be SHA1 / SHA256 / SHA512")]
    UnsupportedHash(String),

    #[error("unknown curve: {0}. Must be P-256 / P-384 / P-521")]
    UnsupportedCurve(String),

    #[error("export format '{0}' is not supported")]
    UnsupportedFormat(String),

    #[error("malformed key: {0}")]
    MalformedKey(String),

    /// Wrong password and tampered data are indistinguishable.
    #[error("decryption failed: data is corrupted or the password is wrong")]
    DecryptionFailed,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("{operation} failed for {key_type} key: {source}")]
    Backend {
        operation: &'static str,
        key_type: KeyType,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CryptoError {
    pub(crate) fn malformed(key_type: KeyType, reason: impl std::fmt::Display) -> Self {
        Self::MalformedKey(format!("{key_type}: {reason}"))
    }

    pub(crate) fn unsupported(operation: &'static str, key_type: KeyType) -> Self {
        Self::UnsupportedOperation {
            operation,
            key_type,
        }
    }

    pub(crate) fn backend(
        operation: &'static str,
        key_type: KeyType,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Backend {
            operation,
            key_type,
            source: source.into(),
        }
    }
}
