//! Keyed-hash message authentication (FIPS 198)

use hmac::digest::KeyInit;
use hmac::{Mac, SimpleHmac};
use sha1::Sha1;
use sha2::{Sha256, Sha512};

use super::{HashType, SecureBytes};
use crate::error::{CryptoError, Result};

/// An HMAC instance bound to one secret, reusable for many digests
#[derive(Clone)]
pub struct Hmac {
    hash: HashType,
    secret: SecureBytes,
}

impl Hmac {
    pub fn new(hash: HashType, secret: &[u8]) -> Self {
        Self {
            hash,
            secret: SecureBytes::from(secret),
        }
    }

    pub fn hash_type(&self) -> HashType {
        self.hash
    }

    /// Length of every digest this instance produces
    pub fn length(&self) -> usize {
        self.hash.digest_len()
    }

    pub fn digest(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.digest_parts(&[data])
    }

    /// MAC over the concatenation of `parts` without building the joined buffer
    pub fn digest_parts(&self, parts: &[&[u8]]) -> Result<Vec<u8>> {
        match self.hash {
            HashType::Sha1 => mac_parts::<SimpleHmac<Sha1>>(&self.secret, parts),
            HashType::Sha256 => mac_parts::<SimpleHmac<Sha256>>(&self.secret, parts),
            HashType::Sha512 => mac_parts::<SimpleHmac<Sha512>>(&self.secret, parts),
        }
    }
}

impl std::fmt::Debug for Hmac {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hmac").field("hash", &self.hash).finish()
    }
}

fn mac_parts<M: Mac + KeyInit>(secret: &[u8], parts: &[&[u8]]) -> Result<Vec<u8>> {
    let mut mac = <M as KeyInit>::new_from_slice(secret)
        .map_err(|e| CryptoError::InvalidParameter(format!("HMAC key: {e}")))?;
    for part in parts {
        mac.update(part);
    }
    Ok(mac.finalize().into_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_lengths() {
        for hash in HashType::ALL {
            let hmac = Hmac::new(hash, b"secret");
            let sig = hmac.digest(b"hello world").unwrap();
            assert_eq!(sig.len(), hmac.length());
        }
    }

    #[test]
    fn test_known_sha256_vector() {
        let hmac = Hmac::new(HashType::Sha256, b"secret");
        assert_eq!(
            hex::encode(hmac.digest(b"hello world").unwrap()),
            "734cc62f32841568f45715aeb9f4d7891324e6d948e4c6c60c0621cdac48623a"
        );
    }

    #[test]
    fn test_digest_parts_matches_concatenation() {
        let hmac = Hmac::new(HashType::Sha512, b"k");
        assert_eq!(
            hmac.digest_parts(&[b"hello ", b"world"]).unwrap(),
            hmac.digest(b"hello world").unwrap()
        );
    }
}
