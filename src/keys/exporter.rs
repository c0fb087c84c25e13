//! Password-protected export envelope
//!
//! ```text
//! salt (salt_len) ‖ nonce (12) ‖ ciphertext ‖ tag (16)
//! ```
//!
//! The AES-GCM key is PBKDF2(password, salt) with the configured iteration
//! count and digest. The text form is the blob armored as multibase base64.

use std::fmt;
use std::str::FromStr;

use multibase::Base;
use serde::{Deserialize, Serialize};

use crate::crypto::aes_gcm::{self, NONCE_LEN, TAG_LEN};
use crate::crypto::{self, HashType, SecureBytes};
use crate::error::{CryptoError, Result};

/// On-disk format for exported private keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExportFormat {
    /// PBKDF2 + AES-GCM envelope, any key type
    #[default]
    #[serde(rename = "libp2p-key")]
    Libp2pKey,
    /// PKCS#8 encrypted PEM, RSA only
    #[serde(rename = "pkcs-8", alias = "pkcs8")]
    Pkcs8,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Libp2pKey => f.write_str("libp2p-key"),
            ExportFormat::Pkcs8 => f.write_str("pkcs-8"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "libp2p-key" => Ok(ExportFormat::Libp2pKey),
            "pkcs-8" | "pkcs8" => Ok(ExportFormat::Pkcs8),
            _ => Err(CryptoError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Parameters of the envelope's key derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportParams {
    pub iterations: u32,
    pub salt_len: usize,
    /// AES-GCM key length: 16 or 32
    pub key_len: usize,
    pub digest: HashType,
}

impl Default for ExportParams {
    fn default() -> Self {
        Self {
            iterations: 32767,
            salt_len: 16,
            key_len: 16,
            digest: HashType::Sha256,
        }
    }
}

impl ExportParams {
    /// Smallest blob that can hold an (empty) ciphertext
    pub fn min_blob_len(&self) -> usize {
        self.salt_len + NONCE_LEN + TAG_LEN
    }

    fn derive(&self, password: &str, salt: &[u8]) -> Result<SecureBytes> {
        crypto::pbkdf2(
            password.as_bytes(),
            salt,
            self.iterations,
            self.key_len,
            self.digest,
        )
    }
}

/// Encrypt `plaintext` under `password` with the given salt and nonce
pub(crate) fn seal_envelope(
    plaintext: &[u8],
    password: &str,
    params: &ExportParams,
    salt: &[u8],
    nonce: &[u8; NONCE_LEN],
) -> Result<Vec<u8>> {
    if salt.len() != params.salt_len {
        return Err(CryptoError::InvalidParameter(format!(
            "salt must be {} bytes, got {}",
            params.salt_len,
            salt.len()
        )));
    }
    let key = params.derive(password, salt)?;
    let ciphertext = aes_gcm::encrypt_with_nonce(&key, nonce, plaintext)?;

    let mut blob = Vec::with_capacity(salt.len() + NONCE_LEN + ciphertext.len());
    blob.extend_from_slice(salt);
    blob.extend_from_slice(nonce);
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

/// Reverse [`seal_envelope`]. A short, tampered or wrongly keyed blob is `DecryptionFailed`.
pub(crate) fn open_envelope(
    blob: &[u8],
    password: &str,
    params: &ExportParams,
) -> Result<SecureBytes> {
    if blob.len() < params.min_blob_len() {
        return Err(CryptoError::DecryptionFailed);
    }
    let (salt, rest) = blob.split_at(params.salt_len);
    let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

    let key = params.derive(password, salt)?;
    aes_gcm::decrypt_with_nonce(&key, nonce, ciphertext)
}

/// Multibase base64 text form of a blob
pub(crate) fn armor(blob: &[u8]) -> String {
    multibase::encode(Base::Base64, blob)
}

/// Inverse of [`armor`]. `None` when `text` is not multibase base64.
pub(crate) fn dearmor(text: &str) -> Option<Vec<u8>> {
    match multibase::decode(text.trim()) {
        Ok((Base::Base64, blob)) => Some(blob),
        _ => None,
    }
}
