//! AES in counter mode
//!
//! A 16-byte key selects AES-128-CTR, a 32-byte key AES-256-CTR. The cipher is
//! a stream: successive `encrypt` calls continue the keystream, so a session
//! layer can feed frames one at a time.

use aes::{Aes128, Aes256};
use ctr::cipher::{KeyIvInit, StreamCipher};
use ctr::Ctr128BE;

use crate::error::{CryptoError, Result};

/// AES block size, which is also the required IV length
pub const IV_LEN: usize = 16;

enum Keystream {
    Aes128(Ctr128BE<Aes128>),
    Aes256(Ctr128BE<Aes256>),
}

impl Keystream {
    fn new(key: &[u8], iv: &[u8]) -> Result<Self> {
        let invalid = |e: ctr::cipher::InvalidLength| CryptoError::InvalidParameter(e.to_string());
        match key.len() {
            16 => Ok(Self::Aes128(
                Ctr128BE::<Aes128>::new_from_slices(key, iv).map_err(invalid)?,
            )),
            32 => Ok(Self::Aes256(
                Ctr128BE::<Aes256>::new_from_slices(key, iv).map_err(invalid)?,
            )),
            n => Err(CryptoError::InvalidParameter(format!(
                "invalid key length {n} bytes. Must be 16 (aes-128-ctr) / 32 (aes-256-ctr)"
            ))),
        }
    }

    fn apply(&mut self, data: &[u8]) -> Vec<u8> {
        let mut buf = data.to_vec();
        match self {
            Self::Aes128(c) => c.apply_keystream(&mut buf),
            Self::Aes256(c) => c.apply_keystream(&mut buf),
        }
        buf
    }
}

/// A bidirectional AES-CTR cipher with independent encrypt and decrypt streams
pub struct AesCtr {
    encryptor: Keystream,
    decryptor: Keystream,
}

impl AesCtr {
    pub fn new(key: &[u8], iv: &[u8]) -> Result<Self> {
        if iv.len() != IV_LEN {
            return Err(CryptoError::InvalidParameter(format!(
                "invalid IV length {} bytes. Must be {IV_LEN}",
                iv.len()
            )));
        }

        Ok(Self {
            encryptor: Keystream::new(key, iv)?,
            decryptor: Keystream::new(key, iv)?,
        })
    }

    pub fn encrypt(&mut self, data: &[u8]) -> Vec<u8> {
        self.encryptor.apply(data)
    }

    pub fn decrypt(&mut self, data: &[u8]) -> Vec<u8> {
        self.decryptor.apply(data)
    }
}

impl std::fmt::Debug for AesCtr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match self.encryptor {
            Keystream::Aes128(_) => "aes-128-ctr",
            Keystream::Aes256(_) => "aes-256-ctr",
        };
        f.debug_struct("AesCtr").field("mode", &mode).finish()
    }
}
