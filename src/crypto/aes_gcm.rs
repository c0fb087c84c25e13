//! AES-GCM authenticated encryption
//!
//! The key length picks the variant: 16 bytes for AES-128-GCM, 32 bytes for
//! AES-256-GCM. Nonces are 96 bits and the 128-bit tag is appended to the
//! ciphertext.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes128Gcm, Aes256Gcm, Nonce,
};
use rand::rngs::OsRng;
use rand::RngCore;

use super::SecureBytes;
use crate::error::{CryptoError, Result};

/// Nonce length for AES-GCM (96 bits)
pub const NONCE_LEN: usize = 12;

/// Authentication tag length (128 bits)
pub const TAG_LEN: usize = 16;

/// Encrypt `plaintext` under `key` with an explicit nonce
///
/// Returns `ciphertext || tag`.
pub fn encrypt_with_nonce(key: &[u8], nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
    let nonce = Nonce::from_slice(nonce);
    let sealed = match key.len() {
        16 => Aes128Gcm::new_from_slice(key)
            .map_err(|e| CryptoError::InvalidParameter(e.to_string()))?
            .encrypt(nonce, plaintext),
        32 => Aes256Gcm::new_from_slice(key)
            .map_err(|e| CryptoError::InvalidParameter(e.to_string()))?
            .encrypt(nonce, plaintext),
        n => {
            return Err(CryptoError::InvalidParameter(format!(
                "invalid AES-GCM key length {n} bytes. Must be 16 or 32"
            )))
        }
    };

    sealed.map_err(|_| CryptoError::InvalidParameter("AES-GCM encryption failed".into()))
}

/// Decrypt `ciphertext || tag` under `key`
///
/// # Errors
/// Returns DecryptionFailed if the tag does not verify, whatever the cause.
pub fn decrypt_with_nonce(key: &[u8], nonce: &[u8], ciphertext: &[u8]) -> Result<SecureBytes> {
    if nonce.len() != NONCE_LEN || ciphertext.len() < TAG_LEN {
        return Err(CryptoError::DecryptionFailed);
    }
    let nonce = Nonce::from_slice(nonce);

    let opened = match key.len() {
        16 => Aes128Gcm::new_from_slice(key)
            .map_err(|_| CryptoError::DecryptionFailed)?
            .decrypt(nonce, ciphertext),
        32 => Aes256Gcm::new_from_slice(key)
            .map_err(|_| CryptoError::DecryptionFailed)?
            .decrypt(nonce, ciphertext),
        _ => return Err(CryptoError::DecryptionFailed),
    };

    opened
        .map(SecureBytes::new)
        .map_err(|_| CryptoError::DecryptionFailed)
}

/// Encrypt with a fresh random nonce, returning `nonce || ciphertext || tag`
pub fn seal(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    let ciphertext = encrypt_with_nonce(key, &nonce, plaintext)?;
    let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Reverse of [`seal`]
pub fn open(key: &[u8], sealed: &[u8]) -> Result<SecureBytes> {
    if sealed.len() < NONCE_LEN + TAG_LEN {
        return Err(CryptoError::DecryptionFailed);
    }
    let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
    decrypt_with_nonce(key, nonce, ciphertext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_open_both_key_sizes() {
        for key in [vec![0x42u8; 16], vec![0x42u8; 32]] {
            let sealed = seal(&key, b"Hello, World! This is secret data.").unwrap();
            let opened = open(&key, &sealed).unwrap();
            assert_eq!(&*opened, b"Hello, World! This is secret data.");
        }
    }

    #[test]
    fn test_wrong_key_fails() {
        let sealed = seal(&[0x42u8; 16], b"Secret message").unwrap();
        let result = open(&[0x43u8; 16], &sealed);

        assert!(matches!(result, Err(CryptoError::DecryptionFailed)));
    }

    #[test]
    fn test_tampered_tag_fails() {
        let key = [0x42u8; 32];
        let mut sealed = seal(&key, b"Secret message").unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 0x01;

        assert!(matches!(open(&key, &sealed), Err(CryptoError::DecryptionFailed)));
    }

    #[test]
    fn test_invalid_key_length() {
        let result = encrypt_with_nonce(&[0u8; 24], &[0u8; NONCE_LEN], b"data");
        assert!(matches!(result, Err(CryptoError::InvalidParameter(_))));
    }

    #[test]
    fn test_truncated_input_fails() {
        assert!(matches!(
            open(&[0u8; 16], &[0u8; NONCE_LEN + TAG_LEN - 1]),
            Err(CryptoError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_fresh_nonce_per_seal() {
        let key = [0x42u8; 16];
        let a = seal(&key, b"Same message").unwrap();
        let b = seal(&key, b"Same message").unwrap();

        assert_ne!(a[..NONCE_LEN], b[..NONCE_LEN]);
        assert_ne!(a, b);
    }
}
