//! Registry settings

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CryptoError, Result};
use crate::keys::{ExportFormat, ExportParams, MAX_RSA_BITS};

/// Smallest salt accepted for the export envelope
const MIN_SALT_LEN: usize = 8;
/// Smallest RSA modulus the registry will generate
const RSA_MIN_BITS: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Key derivation for the password envelope
    pub export: ExportParams,
    /// Reject RSA generation below this size
    pub rsa_min_bits: usize,
    /// Format used by `KeyRegistry::export_key` for RSA keys. Ed25519 and
    /// secp256k1 keys have no PKCS#8 form and always use the libp2p-key envelope.
    pub default_export_format: ExportFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            export: ExportParams::default(),
            rsa_min_bits: RSA_MIN_BITS,
            default_export_format: ExportFormat::default(),
        }
    }
}

impl Config {
    /// Parse and validate JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading config");
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.export.iterations == 0 {
            return Err(CryptoError::InvalidConfig(
                "export.iterations must be at least 1".into(),
            ));
        }
        if self.export.salt_len < MIN_SALT_LEN {
            return Err(CryptoError::InvalidConfig(format!(
                "export.salt_len must be at least {MIN_SALT_LEN}, got {}",
                self.export.salt_len
            )));
        }
        if !matches!(self.export.key_len, 16 | 32) {
            return Err(CryptoError::InvalidConfig(format!(
                "export.key_len must be 16 or 32, got {}",
                self.export.key_len
            )));
        }
        if self.rsa_min_bits < RSA_MIN_BITS {
            return Err(CryptoError::InvalidConfig(format!(
                "rsa_min_bits must be at least {RSA_MIN_BITS}, got {}",
                self.rsa_min_bits
            )));
        }
        if self.rsa_min_bits > MAX_RSA_BITS {
            return Err(CryptoError::InvalidConfig(format!(
                "rsa_min_bits must be at most {MAX_RSA_BITS}, got {}",
                self.rsa_min_bits
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::HashType;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.rsa_min_bits, 512);
        assert_eq!(config.default_export_format, ExportFormat::Libp2pKey);
    }

    #[test]
    fn test_partial_json() {
        let config = Config::from_json(
            r#"{ "export": { "iterations": 1000, "digest": "sha2-512" }, "default_export_format": "pkcs-8" }"#,
        )
        .unwrap();

        assert_eq!(config.export.iterations, 1000);
        assert_eq!(config.export.digest, HashType::Sha512);
        assert_eq!(config.export.salt_len, 16);
        assert_eq!(config.default_export_format, ExportFormat::Pkcs8);
    }

    #[test]
    fn test_json_round_trip() {
        let config = Config {
            rsa_min_bits: 2048,
            ..Config::default()
        };
        let json = config.to_json().unwrap();

        assert_eq!(Config::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_values() {
        for json in [
            r#"{ "export": { "iterations": 0 } }"#,
            r#"{ "export": { "salt_len": 4 } }"#,
            r#"{ "export": { "key_len": 24 } }"#,
            r#"{ "rsa_min_bits": 256 }"#,
            r#"{ "rsa_min_bits": 16384 }"#,
        ] {
            assert!(matches!(
                Config::from_json(json),
                Err(CryptoError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            Config::from_json("{ not json"),
            Err(CryptoError::Json(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            Config::load("/nonexistent/peer-keys.json"),
            Err(CryptoError::Io(_))
        ));
    }
}
