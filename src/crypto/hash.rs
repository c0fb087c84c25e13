//! Hash algorithm selection shared by HMAC, PBKDF2 and the key stretcher

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CryptoError;

/// Digest algorithms accepted wherever a hash is chosen by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashType {
    #[serde(rename = "sha1", alias = "SHA1")]
    Sha1,
    #[serde(rename = "sha2-256", alias = "SHA256")]
    Sha256,
    #[serde(rename = "sha2-512", alias = "SHA512")]
    Sha512,
}

impl HashType {
    pub const ALL: [HashType; 3] = [HashType::Sha1, HashType::Sha256, HashType::Sha512];

    /// Output length of the digest in bytes
    pub fn digest_len(self) -> usize {
        match self {
            HashType::Sha1 => 20,
            HashType::Sha256 => 32,
            HashType::Sha512 => 64,
        }
    }
}

impl fmt::Display for HashType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HashType::Sha1 => "SHA1",
            HashType::Sha256 => "SHA256",
            HashType::Sha512 => "SHA512",
        };
        f.write_str(name)
    }
}

/// Accepts both the HMAC spelling (`SHA256`) and the multihash spelling (`sha2-256`).
impl FromStr for HashType {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha1" => Ok(HashType::Sha1),
            "sha256" | "sha2-256" => Ok(HashType::Sha256),
            "sha512" | "sha2-512" => Ok(HashType::Sha512),
            _ => Err(CryptoError::UnsupportedHash(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_both_spellings() {
        assert_eq!("SHA256".parse::<HashType>().unwrap(), HashType::Sha256);
        assert_eq!("sha2-256".parse::<HashType>().unwrap(), HashType::Sha256);
        assert_eq!("sha1".parse::<HashType>().unwrap(), HashType::Sha1);
        assert_eq!("SHA2-512".parse::<HashType>().unwrap(), HashType::Sha512);
    }

    #[test]
    fn test_unknown_hash_rejected() {
        let err = "md5".parse::<HashType>().unwrap_err();
        assert!(matches!(err, CryptoError::UnsupportedHash(name) if name == "md5"));
    }

    #[test]
    fn test_serde_uses_multihash_names() {
        let json = serde_json::to_string(&HashType::Sha256).unwrap();
        assert_eq!(json, "\"sha2-256\"");

        let parsed: HashType = serde_json::from_str("\"SHA512\"").unwrap();
        assert_eq!(parsed, HashType::Sha512);
    }
}
