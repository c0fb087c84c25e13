//! Session key stretching
//!
//! Expands an ECDH shared secret into two directional `{iv, cipher key, mac key}`
//! sets with an HMAC chain:
//!
//! ```text
//! a = HMAC(secret, seed)
//! loop: out ‖= HMAC(secret, a ‖ seed); a = HMAC(secret, a)
//! ```
//!
//! The output is truncated to `2 * (iv + key + mac)` bytes. The first half is
//! `k1`, the second `k2`; each half splits in order into iv, cipher key and
//! mac key.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::crypto::aes::AesCtr;
use crate::crypto::hmac::Hmac;
use crate::crypto::{HashType, SecureBytes};
use crate::error::{CryptoError, Result};

const SEED: &[u8] = b"key expansion";
const MAC_KEY_LEN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherType {
    Aes128,
    Aes256,
    Blowfish,
}

impl CipherType {
    pub const ALL: [CipherType; 3] = [CipherType::Aes128, CipherType::Aes256, CipherType::Blowfish];

    pub fn iv_len(self) -> usize {
        match self {
            CipherType::Aes128 | CipherType::Aes256 => 16,
            CipherType::Blowfish => 8,
        }
    }

    pub fn key_len(self) -> usize {
        match self {
            CipherType::Aes128 => 16,
            CipherType::Aes256 | CipherType::Blowfish => 32,
        }
    }

    fn half_len(self) -> usize {
        self.iv_len() + self.key_len() + MAC_KEY_LEN
    }
}

impl fmt::Display for CipherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CipherType::Aes128 => "AES-128",
            CipherType::Aes256 => "AES-256",
            CipherType::Blowfish => "Blowfish",
        };
        f.write_str(name)
    }
}

impl FromStr for CipherType {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "aes-128" => Ok(CipherType::Aes128),
            "aes-256" => Ok(CipherType::Aes256),
            "blowfish" => Ok(CipherType::Blowfish),
            _ => Err(CryptoError::UnsupportedCipher(s.to_string())),
        }
    }
}

/// Keys for one direction of a channel
#[derive(Clone, PartialEq, Eq)]
pub struct DirectionalKeys {
    pub cipher: CipherType,
    pub hash: HashType,
    pub iv: Vec<u8>,
    pub cipher_key: SecureBytes,
    pub mac_key: SecureBytes,
}

impl DirectionalKeys {
    fn split(cipher: CipherType, hash: HashType, half: &[u8]) -> Self {
        let (iv, rest) = half.split_at(cipher.iv_len());
        let (cipher_key, mac_key) = rest.split_at(cipher.key_len());
        Self {
            cipher,
            hash,
            iv: iv.to_vec(),
            cipher_key: SecureBytes::from(cipher_key),
            mac_key: SecureBytes::from(mac_key),
        }
    }

    /// AES-CTR stream keyed for this direction. Blowfish has no stream
    /// implementation here and fails with `UnsupportedCipher`.
    pub fn stream_cipher(&self) -> Result<AesCtr> {
        match self.cipher {
            CipherType::Aes128 | CipherType::Aes256 => AesCtr::new(&self.cipher_key, &self.iv),
            CipherType::Blowfish => Err(CryptoError::UnsupportedCipher(self.cipher.to_string())),
        }
    }

    /// HMAC keyed with this direction's mac key
    pub fn mac(&self) -> Hmac {
        Hmac::new(self.hash, &self.mac_key)
    }
}

impl fmt::Debug for DirectionalKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectionalKeys")
            .field("cipher", &self.cipher)
            .field("hash", &self.hash)
            .field("iv", &hex::encode(&self.iv))
            .finish_non_exhaustive()
    }
}

/// Both halves of the stretched output, in derivation order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StretchedKeys {
    pub k1: DirectionalKeys,
    pub k2: DirectionalKeys,
}

/// Stretched keys assigned to directions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionKeys {
    pub local: DirectionalKeys,
    pub remote: DirectionalKeys,
}

impl StretchedKeys {
    /// The initiator sends with `k1`; the responder sends with `k2`
    pub fn into_session(self, initiator: bool) -> SessionKeys {
        if initiator {
            SessionKeys {
                local: self.k1,
                remote: self.k2,
            }
        } else {
            SessionKeys {
                local: self.k2,
                remote: self.k1,
            }
        }
    }
}

/// Stretch `secret` for the given cipher and hash
pub fn stretch_key(cipher: CipherType, hash: HashType, secret: &[u8]) -> Result<StretchedKeys> {
    let half = cipher.half_len();
    let total = 2 * half;
    debug!(%cipher, %hash, total, "stretching shared secret");

    let mac = Hmac::new(hash, secret);
    let mut a = SecureBytes::new(mac.digest(SEED)?);

    let mut buf = Vec::with_capacity(total + mac.length());
    while buf.len() < total {
        let b = SecureBytes::new(mac.digest_parts(&[&a[..], SEED])?);
        buf.extend_from_slice(&b);
        a = SecureBytes::new(mac.digest(&a)?);
    }
    buf.truncate(total);
    let out = SecureBytes::new(buf);

    let (k1, k2) = out.split_at(half);
    Ok(StretchedKeys {
        k1: DirectionalKeys::split(cipher, hash, k1),
        k2: DirectionalKeys::split(cipher, hash, k2),
    })
}

/// Like [`stretch_key`], with cipher and hash given by name
///
/// The cipher name is checked before the hash name.
pub fn stretch_key_named(cipher: &str, hash: &str, secret: &[u8]) -> Result<StretchedKeys> {
    let cipher: CipherType = cipher.parse()?;
    let hash: HashType = hash.parse()?;
    stretch_key(cipher, hash, secret)
}
