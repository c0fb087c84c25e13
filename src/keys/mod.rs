//! Asymmetric identity keys
//!
//! [`PublicKey`] and [`PrivateKey`] are closed sums over the supported
//! algorithms, and every operation dispatches with an exhaustive `match`.
//!
//! Equality, hashing and key ids are defined over the marshaled wire envelope,
//! never over the raw payload.

mod codec;
mod ed25519;
mod exporter;
mod jwk;
mod pkcs8;
mod registry;
mod rsa;
mod secp256k1;
mod stretcher;

use std::fmt;
use std::str::FromStr;

use multihash::Multihash;
use sha2::{Digest, Sha256};

use crate::crypto::SecureBytes;
use crate::error::{CryptoError, Result};

pub use self::codec::{
    marshal_private_key, marshal_public_key, unmarshal_private_key, unmarshal_public_key,
};
pub use self::ed25519::{Ed25519PrivateKey, Ed25519PublicKey};
pub use self::exporter::{ExportFormat, ExportParams};
pub use self::jwk::RsaJwk;
pub use self::registry::KeyRegistry;
pub use self::rsa::{RsaPrivateKey, RsaPublicKey, MAX_RSA_BITS};
pub use self::secp256k1::{Secp256k1PrivateKey, Secp256k1PublicKey};
pub use self::stretcher::{
    stretch_key, stretch_key_named, CipherType, DirectionalKeys, SessionKeys, StretchedKeys,
};

/// Multihash code for SHA2-256
const SHA2_256: u64 = 0x12;
/// Multihash code for the identity "hash"
const IDENTITY: u64 = 0x00;

/// Supported key algorithms, with their wire discriminants
///
/// The discriminants are shared with every other libp2p implementation and
/// must never change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum KeyType {
    Rsa = 0,
    Ed25519 = 1,
    Secp256k1 = 2,
}

impl KeyType {
    pub const ALL: [KeyType; 3] = [KeyType::Rsa, KeyType::Ed25519, KeyType::Secp256k1];

    /// Wire discriminant
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Look up a wire discriminant
    pub fn from_code(code: i32) -> Result<Self> {
        KeyType::try_from(code).map_err(|_| CryptoError::UnsupportedKeyType(code.to_string()))
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyType::Rsa => "RSA",
            KeyType::Ed25519 => "Ed25519",
            KeyType::Secp256k1 => "secp256k1",
        };
        f.write_str(name)
    }
}

/// Case-insensitive, so `"rsa"`, `"RSA"` and `"Rsa"` all resolve.
impl FromStr for KeyType {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "rsa" => Ok(KeyType::Rsa),
            "ed25519" => Ok(KeyType::Ed25519),
            "secp256k1" => Ok(KeyType::Secp256k1),
            _ => Err(CryptoError::UnsupportedKeyType(s.to_string())),
        }
    }
}

/// A public key of any supported algorithm
#[derive(Clone)]
pub enum PublicKey {
    Rsa(RsaPublicKey),
    Ed25519(Ed25519PublicKey),
    Secp256k1(Secp256k1PublicKey),
}

impl PublicKey {
    pub fn key_type(&self) -> KeyType {
        match self {
            PublicKey::Rsa(_) => KeyType::Rsa,
            PublicKey::Ed25519(_) => KeyType::Ed25519,
            PublicKey::Secp256k1(_) => KeyType::Secp256k1,
        }
    }

    /// Verify `sig` over `data`. Malformed signatures verify as false.
    pub fn verify(&self, data: &[u8], sig: &[u8]) -> bool {
        match self {
            PublicKey::Rsa(key) => key.verify(data, sig),
            PublicKey::Ed25519(key) => key.verify(data, sig),
            PublicKey::Secp256k1(key) => key.verify(data, sig),
        }
    }

    /// Encrypt with PKCS#1 v1.5. Only RSA keys support this.
    pub fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            PublicKey::Rsa(key) => key.encrypt(data),
            other => Err(CryptoError::unsupported("encrypt", other.key_type())),
        }
    }

    /// Algorithm-specific payload: PKIX DER, a 32-byte point or a compressed SEC1 point
    pub fn raw(&self) -> Vec<u8> {
        match self {
            PublicKey::Rsa(key) => key.to_bytes().to_vec(),
            PublicKey::Ed25519(key) => key.to_bytes().to_vec(),
            PublicKey::Secp256k1(key) => key.to_bytes(),
        }
    }

    /// The wire envelope
    pub fn marshal(&self) -> Vec<u8> {
        marshal_public_key(self)
    }

    /// SHA2-256 multihash of the wire envelope
    pub fn hash(&self) -> Result<Vec<u8>> {
        sha256_multihash(&self.marshal(), self.key_type())
    }

    /// Base58btc key id
    ///
    /// Ed25519 envelopes are short enough to be inlined with the identity
    /// multihash. The other algorithms use SHA2-256.
    pub fn id(&self) -> Result<String> {
        let envelope = self.marshal();
        let multihash = match self {
            PublicKey::Ed25519(_) => Multihash::<64>::wrap(IDENTITY, &envelope)
                .map_err(|e| CryptoError::backend("id", self.key_type(), e))?
                .to_bytes(),
            _ => sha256_multihash(&envelope, self.key_type())?,
        };
        Ok(bs58::encode(multihash).into_string())
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.marshal() == other.marshal()
    }
}

impl Eq for PublicKey {}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey::{}({})", self.key_type(), hex::encode(self.raw()))
    }
}

impl From<RsaPublicKey> for PublicKey {
    fn from(key: RsaPublicKey) -> Self {
        PublicKey::Rsa(key)
    }
}

impl From<Ed25519PublicKey> for PublicKey {
    fn from(key: Ed25519PublicKey) -> Self {
        PublicKey::Ed25519(key)
    }
}

impl From<Secp256k1PublicKey> for PublicKey {
    fn from(key: Secp256k1PublicKey) -> Self {
        PublicKey::Secp256k1(key)
    }
}

/// A private key of any supported algorithm, owning its public half
#[derive(Clone)]
pub enum PrivateKey {
    Rsa(RsaPrivateKey),
    Ed25519(Ed25519PrivateKey),
    Secp256k1(Secp256k1PrivateKey),
}

impl PrivateKey {
    pub fn key_type(&self) -> KeyType {
        match self {
            PrivateKey::Rsa(_) => KeyType::Rsa,
            PrivateKey::Ed25519(_) => KeyType::Ed25519,
            PrivateKey::Secp256k1(_) => KeyType::Secp256k1,
        }
    }

    /// Sign `data`. RSA uses PKCS#1 v1.5 over SHA-256, secp256k1 a DER ECDSA
    /// signature over SHA-256, Ed25519 signs the message directly.
    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            PrivateKey::Rsa(key) => key.sign(data),
            PrivateKey::Ed25519(key) => Ok(key.sign(data)),
            PrivateKey::Secp256k1(key) => key.sign(data),
        }
    }

    pub fn public(&self) -> PublicKey {
        match self {
            PrivateKey::Rsa(key) => PublicKey::Rsa(key.public().clone()),
            PrivateKey::Ed25519(key) => PublicKey::Ed25519(key.public()),
            PrivateKey::Secp256k1(key) => PublicKey::Secp256k1(key.public()),
        }
    }

    /// Decrypt PKCS#1 v1.5 ciphertext. Only RSA keys support this.
    pub fn decrypt(&self, data: &[u8]) -> Result<SecureBytes> {
        match self {
            PrivateKey::Rsa(key) => key.decrypt(data),
            other => Err(CryptoError::unsupported("decrypt", other.key_type())),
        }
    }

    /// Algorithm-specific payload: PKCS#1 DER, 64-byte seed‖public, or a 32-byte scalar
    pub fn raw(&self) -> SecureBytes {
        match self {
            PrivateKey::Rsa(key) => key.to_bytes().clone(),
            PrivateKey::Ed25519(key) => key.to_bytes(),
            PrivateKey::Secp256k1(key) => key.to_bytes(),
        }
    }

    /// The wire envelope
    pub fn marshal(&self) -> SecureBytes {
        marshal_private_key(self)
    }

    /// SHA2-256 multihash of the private wire envelope
    pub fn hash(&self) -> Result<Vec<u8>> {
        sha256_multihash(&self.marshal(), self.key_type())
    }

    /// The id of the public half
    pub fn id(&self) -> Result<String> {
        self.public().id()
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.marshal() == other.marshal()
    }
}

impl Eq for PrivateKey {}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("type", &self.key_type())
            .field("public", &self.public())
            .finish()
    }
}

impl From<RsaPrivateKey> for PrivateKey {
    fn from(key: RsaPrivateKey) -> Self {
        PrivateKey::Rsa(key)
    }
}

impl From<Ed25519PrivateKey> for PrivateKey {
    fn from(key: Ed25519PrivateKey) -> Self {
        PrivateKey::Ed25519(key)
    }
}

impl From<Secp256k1PrivateKey> for PrivateKey {
    fn from(key: Secp256k1PrivateKey) -> Self {
        PrivateKey::Secp256k1(key)
    }
}

fn sha256_multihash(data: &[u8], key_type: KeyType) -> Result<Vec<u8>> {
    let digest = Sha256::digest(data);
    let multihash = Multihash::<64>::wrap(SHA2_256, &digest)
        .map_err(|e| CryptoError::backend("hash", key_type, e))?;
    Ok(multihash.to_bytes())
}

/// Fail with `MalformedKey` unless `bytes` is exactly `len` long
pub(crate) fn ensure_len(key_type: KeyType, bytes: &[u8], len: usize) -> Result<()> {
    if bytes.len() != len {
        return Err(CryptoError::malformed(
            key_type,
            format!("key must be of length {len}, got {}", bytes.len()),
        ));
    }
    Ok(())
}
