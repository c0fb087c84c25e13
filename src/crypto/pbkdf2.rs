//! PBKDF2 password-based key derivation (RFC 8018)
//!
//! Used by the password exporter to turn a passphrase into an AES-GCM key.
//! The salt is stored next to the ciphertext, the iteration count and digest
//! come from the exporter configuration.

use pbkdf2::pbkdf2_hmac;
use sha1::Sha1;
use sha2::{Sha256, Sha512};
use super::{HashType, SecureBytes};
use crate::error::{CryptoError, Result};

/// Compute PBKDF2 over `password` and `salt`, producing `key_len` bytes
pub fn pbkdf2(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    key_len: usize,
    hash: HashType,
) -> Result<SecureBytes> {
    if iterations == 0 {
        return Err(CryptoError::InvalidParameter(
            "PBKDF2 needs at least one iteration".into(),
        ));
    }
    if key_len == 0 {
        return Err(CryptoError::InvalidParameter(
            "PBKDF2 key length must be bigger than 0".into(),
        ));
    }

    let mut out = SecureBytes::zeroed(key_len);
    match hash {
        HashType::Sha1 => pbkdf2_hmac::<Sha1>(password, salt, iterations, out.as_mut_slice()),
        HashType::Sha256 => pbkdf2_hmac::<Sha256>(password, salt, iterations, out.as_mut_slice()),
        HashType::Sha512 => pbkdf2_hmac::<Sha512>(password, salt, iterations, out.as_mut_slice()),
    }
    Ok(out)
}

/// Like [`pbkdf2`], with the hash given by name (`sha1`, `sha2-256`, `sha2-512`)
pub fn pbkdf2_named(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    key_len: usize,
    hash: &str,
) -> Result<SecureBytes> {
    pbkdf2(password, salt, iterations, key_len, hash.parse()?)
}
