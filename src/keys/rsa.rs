//! RSA keys
//!
//! Public keys travel as PKIX (SubjectPublicKeyInfo) DER, private keys as
//! PKCS#1 DER. Signatures are PKCS#1 v1.5 over SHA-256 and encryption is
//! PKCS#1 v1.5. The canonical DER is computed once at construction so that
//! marshaling never fails. Moduli above [`MAX_RSA_BITS`] are refused in
//! both directions.

use rand::rngs::OsRng;
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey};
use rsa::pkcs8::{EncodePublicKey, SubjectPublicKeyInfoRef};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, Pkcs1v15Encrypt, Pkcs1v15Sign};
use sha2::{Digest, Sha256};

use super::KeyType;
use crate::crypto::{random_bytes, SecureBytes};
use crate::error::{CryptoError, Result};

/// Largest accepted modulus, for parsing and for generation
pub const MAX_RSA_BITS: usize = 8192;

#[derive(Clone)]
pub struct RsaPublicKey {
    key: rsa::RsaPublicKey,
    der: Vec<u8>,
}

impl RsaPublicKey {
    /// Parse PKIX DER
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let malformed = |e| CryptoError::malformed(KeyType::Rsa, e);

        let spki = SubjectPublicKeyInfoRef::try_from(bytes).map_err(malformed)?;
        spki.algorithm
            .assert_algorithm_oid(rsa::pkcs1::ALGORITHM_OID)
            .map_err(malformed)?;
        let raw = spki
            .subject_public_key
            .as_bytes()
            .ok_or_else(|| CryptoError::malformed(KeyType::Rsa, "unaligned key bits"))?;
        let parts = rsa::pkcs1::RsaPublicKey::try_from(raw)
            .map_err(|e| CryptoError::malformed(KeyType::Rsa, e))?;

        let n = BigUint::from_bytes_be(parts.modulus.as_bytes());
        let e = BigUint::from_bytes_be(parts.public_exponent.as_bytes());
        let key = rsa::RsaPublicKey::new_with_max_size(n, e, MAX_RSA_BITS)
            .map_err(|e| CryptoError::malformed(KeyType::Rsa, e))?;
        Self::from_key(key)
    }

    pub(crate) fn from_key(key: rsa::RsaPublicKey) -> Result<Self> {
        let der = key
            .to_public_key_der()
            .map_err(|e| CryptoError::backend("marshal", KeyType::Rsa, e))?
            .into_vec();
        Ok(Self { key, der })
    }

    /// PKIX DER
    pub fn to_bytes(&self) -> &[u8] {
        &self.der
    }

    /// Modulus size in bits
    pub fn bits(&self) -> usize {
        self.key.size() * 8
    }

    pub fn verify(&self, data: &[u8], sig: &[u8]) -> bool {
        let digest = Sha256::digest(data);
        self.key
            .verify(Pkcs1v15Sign::new::<Sha256>(), &digest, sig)
            .is_ok()
    }

    pub fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.key
            .encrypt(&mut OsRng, Pkcs1v15Encrypt, data)
            .map_err(|e| CryptoError::backend("encrypt", KeyType::Rsa, e))
    }

    pub(crate) fn inner(&self) -> &rsa::RsaPublicKey {
        &self.key
    }
}

impl PartialEq for RsaPublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

impl Eq for RsaPublicKey {}

impl std::fmt::Debug for RsaPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaPublicKey")
            .field("bits", &self.bits())
            .finish()
    }
}

#[derive(Clone)]
pub struct RsaPrivateKey {
    key: rsa::RsaPrivateKey,
    der: SecureBytes,
    public: RsaPublicKey,
}

impl RsaPrivateKey {
    /// Parse PKCS#1 DER and check the key's internal consistency
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let key = rsa::RsaPrivateKey::from_pkcs1_der(bytes)
            .map_err(|e| CryptoError::malformed(KeyType::Rsa, e))?;
        Self::from_key(key)
    }

    pub(crate) fn from_key(key: rsa::RsaPrivateKey) -> Result<Self> {
        if key.n().bits() > MAX_RSA_BITS {
            return Err(CryptoError::malformed(KeyType::Rsa, "modulus too large"));
        }
        key.validate()
            .map_err(|e| CryptoError::malformed(KeyType::Rsa, e))?;

        let der = key
            .to_pkcs1_der()
            .map_err(|e| CryptoError::backend("marshal", KeyType::Rsa, e))?;
        let public = RsaPublicKey::from_key(key.to_public_key())?;

        Ok(Self {
            der: SecureBytes::from(der.as_bytes()),
            key,
            public,
        })
    }

    /// PKCS#1 DER
    pub fn to_bytes(&self) -> &SecureBytes {
        &self.der
    }

    pub fn public(&self) -> &RsaPublicKey {
        &self.public
    }

    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        let digest = Sha256::digest(data);
        self.key
            .sign(Pkcs1v15Sign::new::<Sha256>(), &digest)
            .map_err(|e| CryptoError::backend("sign", KeyType::Rsa, e))
    }

    /// Decrypt PKCS#1 v1.5 ciphertext
    pub fn decrypt(&self, data: &[u8]) -> Result<SecureBytes> {
        self.key
            .decrypt(Pkcs1v15Encrypt, data)
            .map(SecureBytes::new)
            .map_err(|_| CryptoError::DecryptionFailed)
    }

    /// 16 random bytes, sized for a symmetric session secret
    pub fn gen_secret(&self) -> Result<Vec<u8>> {
        random_bytes(16)
    }

    pub(crate) fn inner(&self) -> &rsa::RsaPrivateKey {
        &self.key
    }
}

impl std::fmt::Debug for RsaPrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaPrivateKey")
            .field("public", &self.public)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{KeyBackend, OsBackend};

    fn generate(bits: usize) -> RsaPrivateKey {
        let der = OsBackend.generate_rsa(bits).unwrap();
        RsaPrivateKey::from_bytes(&der).unwrap()
    }

    #[test]
    fn test_marshal_round_trip() {
        let key = generate(512);
        let parsed = RsaPrivateKey::from_bytes(key.to_bytes()).unwrap();
        let public = RsaPublicKey::from_bytes(key.public().to_bytes()).unwrap();

        assert_eq!(parsed.to_bytes(), key.to_bytes());
        assert_eq!(&public, key.public());
        assert_eq!(public.bits(), 512);
    }

    #[test]
    fn test_sign_and_verify() {
        let key = generate(512);
        let sig = key.sign(b"hello world").unwrap();

        assert_eq!(sig.len(), 64);
        assert!(key.public().verify(b"hello world", &sig));
        assert!(!key.public().verify(b"hello", &sig));
    }

    #[test]
    fn test_encrypt_decrypt() {
        let key = generate(512);
        let secret = key.gen_secret().unwrap();
        let ciphertext = key.public().encrypt(&secret).unwrap();

        assert_ne!(ciphertext, secret);
        assert_eq!(&*key.decrypt(&ciphertext).unwrap(), &secret[..]);
    }

    #[test]
    fn test_decrypt_with_other_key_fails() {
        let a = generate(512);
        let b = generate(512);
        let ciphertext = a.public().encrypt(b"for a only").unwrap();

        assert!(matches!(
            b.decrypt(&ciphertext),
            Err(CryptoError::DecryptionFailed)
        ));
    }

    fn public_with_modulus(bytes: usize) -> RsaPublicKey {
        let n = BigUint::from_bytes_be(&vec![0xff; bytes]);
        let key = rsa::RsaPublicKey::new_with_max_size(n, BigUint::from(65537u32), 2 * MAX_RSA_BITS)
            .unwrap();
        RsaPublicKey::from_key(key).unwrap()
    }

    #[test]
    fn test_large_public_key_accepted() {
        let key = public_with_modulus(MAX_RSA_BITS / 8);
        let parsed = RsaPublicKey::from_bytes(key.to_bytes()).unwrap();

        assert_eq!(parsed.bits(), 8192);
        assert_eq!(parsed, key);
    }

    #[test]
    fn test_oversized_public_key_rejected() {
        let key = public_with_modulus(MAX_RSA_BITS / 8 + 1);

        assert!(matches!(
            RsaPublicKey::from_bytes(key.to_bytes()),
            Err(CryptoError::MalformedKey(_))
        ));
    }

    #[test]
    fn test_non_rsa_spki_rejected() {
        // Ed25519 SubjectPublicKeyInfo
        let mut der = hex::decode("302a300506032b6570032100").unwrap();
        der.extend_from_slice(&[0x11; 32]);

        assert!(matches!(
            RsaPublicKey::from_bytes(&der),
            Err(CryptoError::MalformedKey(_))
        ));
    }

    #[test]
    fn test_garbage_der_rejected() {
        assert!(matches!(
            RsaPrivateKey::from_bytes(b"not DER at all"),
            Err(CryptoError::MalformedKey(_))
        ));
        assert!(matches!(
            RsaPublicKey::from_bytes(&[0x30, 0x03, 0x02, 0x01]),
            Err(CryptoError::MalformedKey(_))
        ));
    }
}
