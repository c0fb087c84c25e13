//! Pluggable source of key material
//!
//! The registry never reaches for an RNG or a key generator on its own. It
//! asks the [`KeyBackend`] it was constructed with, so tests and embedders can
//! swap the source without touching global state. Whatever a backend returns
//! is validated exactly like unmarshaled bytes, so a broken backend surfaces as
//! `MalformedKey` and never as an invalid key object.

use anyhow::Context;
use rand::rngs::OsRng;
use rand::RngCore;
use rsa::pkcs1::EncodeRsaPrivateKey;

use super::SecureBytes;

/// Ed25519 seed length
pub const ED25519_SEED_LEN: usize = 32;

pub trait KeyBackend: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Fill `dest` from a cryptographically secure source
    fn fill_random(&self, dest: &mut [u8]) -> anyhow::Result<()>;

    /// Generate an RSA key of `bits`, returned as PKCS#1 DER
    fn generate_rsa(&self, bits: usize) -> anyhow::Result<SecureBytes>;

    /// Generate a 32-byte secp256k1 scalar
    fn generate_secp256k1(&self) -> anyhow::Result<SecureBytes>;

    /// Generate a 32-byte Ed25519 seed
    fn generate_ed25519_seed(&self) -> anyhow::Result<SecureBytes> {
        let mut seed = SecureBytes::zeroed(ED25519_SEED_LEN);
        self.fill_random(seed.as_mut_slice())?;
        Ok(seed)
    }
}

/// The default backend: RustCrypto implementations fed by the OS RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct OsBackend;

impl KeyBackend for OsBackend {
    fn name(&self) -> &'static str {
        "os"
    }

    fn fill_random(&self, dest: &mut [u8]) -> anyhow::Result<()> {
        OsRng.try_fill_bytes(dest).context("OS RNG unavailable")?;
        Ok(())
    }

    fn generate_rsa(&self, bits: usize) -> anyhow::Result<SecureBytes> {
        let key = rsa::RsaPrivateKey::new(&mut OsRng, bits)
            .with_context(|| format!("generating {bits}-bit RSA key"))?;
        let der = key.to_pkcs1_der().context("encoding RSA key as PKCS#1")?;
        Ok(SecureBytes::from(der.as_bytes()))
    }

    fn generate_secp256k1(&self) -> anyhow::Result<SecureBytes> {
        let key = k256::SecretKey::random(&mut OsRng);
        Ok(SecureBytes::new(key.to_bytes().to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_backend_seed_length() {
        let seed = OsBackend.generate_ed25519_seed().unwrap();
        assert_eq!(seed.len(), ED25519_SEED_LEN);
    }

    #[test]
    fn test_os_backend_secp256k1_length() {
        let a = OsBackend.generate_secp256k1().unwrap();
        let b = OsBackend.generate_secp256k1().unwrap();

        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }

    #[test]
    fn test_os_backend_rsa_is_pkcs1() {
        use rsa::pkcs1::DecodeRsaPrivateKey;

        let der = OsBackend.generate_rsa(512).unwrap();
        assert!(rsa::RsaPrivateKey::from_pkcs1_der(&der).is_ok());
    }
}
