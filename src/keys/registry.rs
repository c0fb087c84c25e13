//! Key registry
//!
//! The single entry point for generating, (un)marshaling, exporting and
//! importing keys. It owns the configuration and the [`KeyBackend`] that
//! supplies randomness and fresh key material.

use std::sync::Arc;

use tracing::{debug, warn};

use super::exporter::{self, ExportFormat};
use super::{
    codec, pkcs8, Ed25519PrivateKey, KeyType, PrivateKey, PublicKey, RsaPrivateKey,
    Secp256k1PrivateKey, MAX_RSA_BITS,
};
use crate::config::Config;
use crate::crypto::aes_gcm::NONCE_LEN;
use crate::crypto::{KeyBackend, OsBackend, SecureBytes, ED25519_SEED_LEN};
use crate::error::{CryptoError, Result};

#[derive(Clone)]
pub struct KeyRegistry {
    backend: Arc<dyn KeyBackend>,
    config: Config,
}

impl Default for KeyRegistry {
    fn default() -> Self {
        Self {
            backend: Arc::new(OsBackend),
            config: Config::default(),
        }
    }
}

impl std::fmt::Debug for KeyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRegistry")
            .field("backend", &self.backend.name())
            .field("config", &self.config)
            .finish()
    }
}

impl KeyRegistry {
    /// Registry on the OS backend
    pub fn new(config: Config) -> Result<Self> {
        Self::with_backend(config, Arc::new(OsBackend))
    }

    pub fn with_backend(config: Config, backend: Arc<dyn KeyBackend>) -> Result<Self> {
        config.validate()?;
        debug!(backend = backend.name(), "key registry ready");
        Ok(Self { backend, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Generate a fresh key pair
    ///
    /// `bits` is required for RSA and must reach the configured minimum. It
    /// is ignored for Ed25519 and secp256k1.
    pub fn generate_key_pair(&self, key_type: KeyType, bits: Option<usize>) -> Result<PrivateKey> {
        debug!(%key_type, ?bits, backend = self.backend.name(), "generating key pair");
        let key = match key_type {
            KeyType::Rsa => {
                let bits = self.check_rsa_bits(bits)?;
                let der = self
                    .backend
                    .generate_rsa(bits)
                    .map_err(|e| CryptoError::backend("generate", key_type, e))?;
                PrivateKey::Rsa(RsaPrivateKey::from_bytes(&der)?)
            }
            KeyType::Ed25519 => {
                let seed = self
                    .backend
                    .generate_ed25519_seed()
                    .map_err(|e| CryptoError::backend("generate", key_type, e))?;
                PrivateKey::Ed25519(Ed25519PrivateKey::from_seed(&seed).map_err(|_| {
                    CryptoError::malformed(key_type, "backend returned a bad seed")
                })?)
            }
            KeyType::Secp256k1 => {
                let scalar = self
                    .backend
                    .generate_secp256k1()
                    .map_err(|e| CryptoError::backend("generate", key_type, e))?;
                PrivateKey::Secp256k1(Secp256k1PrivateKey::from_bytes(&scalar)?)
            }
        };
        Ok(key)
    }

    /// Like [`generate_key_pair`](Self::generate_key_pair), with the type given by name
    pub fn generate_key_pair_named(&self, key_type: &str, bits: Option<usize>) -> Result<PrivateKey> {
        self.generate_key_pair(key_type.parse()?, bits)
    }

    /// Derive a key pair from a 32-byte seed. Only Ed25519 supports this.
    pub fn generate_key_pair_from_seed(&self, key_type: KeyType, seed: &[u8]) -> Result<PrivateKey> {
        match key_type {
            KeyType::Ed25519 => {
                if seed.len() != ED25519_SEED_LEN {
                    return Err(CryptoError::InvalidParameter(format!(
                        "seed must be {ED25519_SEED_LEN} bytes, got {}",
                        seed.len()
                    )));
                }
                debug!(%key_type, "deriving key pair from seed");
                Ok(PrivateKey::Ed25519(Ed25519PrivateKey::from_seed(seed)?))
            }
            KeyType::Rsa | KeyType::Secp256k1 => Err(CryptoError::UnsupportedDerivation(key_type)),
        }
    }

    pub fn marshal_public_key(&self, key: &PublicKey) -> Vec<u8> {
        codec::marshal_public_key(key)
    }

    pub fn marshal_private_key(&self, key: &PrivateKey) -> SecureBytes {
        codec::marshal_private_key(key)
    }

    pub fn unmarshal_public_key(&self, bytes: &[u8]) -> Result<PublicKey> {
        codec::unmarshal_public_key(bytes)
    }

    pub fn unmarshal_private_key(&self, bytes: &[u8]) -> Result<PrivateKey> {
        codec::unmarshal_private_key(bytes)
    }

    /// Export `key` under `password`. RSA keys use the configured default
    /// format; the other key types always use the libp2p-key envelope.
    pub fn export_key(&self, key: &PrivateKey, password: &str) -> Result<String> {
        let format = match key {
            PrivateKey::Rsa(_) => self.config.default_export_format,
            PrivateKey::Ed25519(_) | PrivateKey::Secp256k1(_) => ExportFormat::Libp2pKey,
        };
        self.export_key_as(key, password, format)
    }

    pub fn export_key_as(
        &self,
        key: &PrivateKey,
        password: &str,
        format: ExportFormat,
    ) -> Result<String> {
        debug!(key_type = %key.key_type(), %format, "exporting key");
        match (format, key) {
            (ExportFormat::Libp2pKey, _) => Ok(exporter::armor(&self.export_bytes(key, password)?)),
            (ExportFormat::Pkcs8, PrivateKey::Rsa(rsa)) => {
                let salt = self.random(pkcs8::SALT_LEN, key.key_type())?;
                let mut iv = [0u8; pkcs8::IV_LEN];
                self.fill(&mut iv, key.key_type())?;
                pkcs8::encrypt_pem(rsa, password, &salt, &iv)
            }
            (ExportFormat::Pkcs8, other) => Err(CryptoError::UnsupportedFormat(format!(
                "{format} cannot hold {} keys",
                other.key_type()
            ))),
        }
    }

    /// The raw password envelope: `salt ‖ nonce ‖ ciphertext ‖ tag`
    pub fn export_bytes(&self, key: &PrivateKey, password: &str) -> Result<Vec<u8>> {
        let params = &self.config.export;
        let salt = self.random(params.salt_len, key.key_type())?;
        let mut nonce = [0u8; NONCE_LEN];
        self.fill(&mut nonce, key.key_type())?;

        exporter::seal_envelope(&key.marshal(), password, params, &salt, &nonce)
    }

    /// Open a raw password envelope
    ///
    /// A wrong password or a modified blob is `DecryptionFailed`. A blob that
    /// decrypts to something other than a key envelope is `MalformedKey`.
    pub fn import_bytes(&self, blob: &[u8], password: &str) -> Result<PrivateKey> {
        let plaintext = exporter::open_envelope(blob, password, &self.config.export)?;
        let key = codec::unmarshal_private_key(&plaintext)?;
        debug!(key_type = %key.key_type(), "imported key");
        Ok(key)
    }

    /// Import an exported key
    ///
    /// Multibase envelopes are tried first. Anything else is read as a
    /// PKCS#8 encrypted PEM, which only carries RSA keys.
    pub fn import_key(&self, text: &str, password: &str) -> Result<PrivateKey> {
        if let Some(blob) = exporter::dearmor(text) {
            return self.import_bytes(&blob, password);
        }

        warn!("input is not a multibase key envelope, trying PKCS#8 PEM");
        let key = pkcs8::decrypt_pem(text, password)?;
        debug!(key_type = %KeyType::Rsa, "imported key from PEM");
        Ok(PrivateKey::Rsa(key))
    }

    fn check_rsa_bits(&self, bits: Option<usize>) -> Result<usize> {
        let bits = bits.ok_or_else(|| {
            CryptoError::InvalidParameter("RSA key generation needs a size in bits".into())
        })?;
        if bits < self.config.rsa_min_bits {
            return Err(CryptoError::InvalidParameter(format!(
                "RSA keys must be at least {} bits, got {bits}",
                self.config.rsa_min_bits
            )));
        }
        if bits > MAX_RSA_BITS {
            return Err(CryptoError::InvalidParameter(format!(
                "RSA keys must be at most {MAX_RSA_BITS} bits, got {bits}"
            )));
        }
        Ok(bits)
    }

    fn fill(&self, dest: &mut [u8], key_type: KeyType) -> Result<()> {
        self.backend
            .fill_random(dest)
            .map_err(|e| CryptoError::backend("export", key_type, e))
    }

    fn random(&self, len: usize, key_type: KeyType) -> Result<Vec<u8>> {
        let mut out = vec![0u8; len];
        self.fill(&mut out, key_type)?;
        Ok(out)
    }
}
