//! Ephemeral ECDH key pairs over the NIST curves
//!
//! A handshake generates one pair per side, swaps the public points and feeds
//! the shared secret to the key stretcher.

use std::fmt;
use std::str::FromStr;

use elliptic_curve::ecdh::EphemeralSecret;
use elliptic_curve::sec1::ToEncodedPoint;
use p256::NistP256;
use p384::NistP384;
use p521::NistP521;
use rand::rngs::OsRng;

use super::SecureBytes;
use crate::error::{CryptoError, Result};

/// Curves available for ephemeral key exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Curve {
    P256,
    P384,
    P521,
}

impl Curve {
    pub const ALL: [Curve; 3] = [Curve::P256, Curve::P384, Curve::P521];

    /// Length in bytes of the shared secret this curve produces
    pub fn secret_len(self) -> usize {
        match self {
            Curve::P256 => 32,
            Curve::P384 => 48,
            Curve::P521 => 66,
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Curve::P256 => "P-256",
            Curve::P384 => "P-384",
            Curve::P521 => "P-521",
        };
        f.write_str(name)
    }
}

impl FromStr for Curve {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "P-256" => Ok(Curve::P256),
            "P-384" => Ok(Curve::P384),
            "P-521" => Ok(Curve::P521),
            other => Err(CryptoError::UnsupportedCurve(other.to_string())),
        }
    }
}

enum Secret {
    P256(EphemeralSecret<NistP256>),
    P384(EphemeralSecret<NistP384>),
    P521(EphemeralSecret<NistP521>),
}

/// One side of an ECDH exchange
///
/// `public_key` is the uncompressed SEC1 point to send to the peer.
pub struct EphemeralKeyPair {
    curve: Curve,
    public_key: Vec<u8>,
    secret: Secret,
}

/// Generate a fresh ephemeral key pair on `curve`
pub fn generate_ephemeral_key_pair(curve: Curve) -> EphemeralKeyPair {
    let (secret, public_key) = match curve {
        Curve::P256 => {
            let secret = EphemeralSecret::<NistP256>::random(&mut OsRng);
            let point = secret.public_key().to_encoded_point(false);
            (Secret::P256(secret), point.as_bytes().to_vec())
        }
        Curve::P384 => {
            let secret = EphemeralSecret::<NistP384>::random(&mut OsRng);
            let point = secret.public_key().to_encoded_point(false);
            (Secret::P384(secret), point.as_bytes().to_vec())
        }
        Curve::P521 => {
            let secret = EphemeralSecret::<NistP521>::random(&mut OsRng);
            let point = secret.public_key().to_encoded_point(false);
            (Secret::P521(secret), point.as_bytes().to_vec())
        }
    };

    tracing::debug!(%curve, "generated ephemeral key pair");
    EphemeralKeyPair {
        curve,
        public_key,
        secret,
    }
}

impl EphemeralKeyPair {
    pub fn curve(&self) -> Curve {
        self.curve
    }

    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Compute the shared secret with the peer's SEC1-encoded public point
    ///
    /// # Errors
    /// InvalidParameter if `their_public` is not a valid point on this curve.
    pub fn shared_secret(&self, their_public: &[u8]) -> Result<SecureBytes> {
        let invalid = |e: elliptic_curve::Error| {
            CryptoError::InvalidParameter(format!("invalid {} public key: {e}", self.curve))
        };

        let shared = match &self.secret {
            Secret::P256(secret) => {
                let theirs = elliptic_curve::PublicKey::<NistP256>::from_sec1_bytes(their_public)
                    .map_err(invalid)?;
                secret.diffie_hellman(&theirs).raw_secret_bytes().to_vec()
            }
            Secret::P384(secret) => {
                let theirs = elliptic_curve::PublicKey::<NistP384>::from_sec1_bytes(their_public)
                    .map_err(invalid)?;
                secret.diffie_hellman(&theirs).raw_secret_bytes().to_vec()
            }
            Secret::P521(secret) => {
                let theirs = elliptic_curve::PublicKey::<NistP521>::from_sec1_bytes(their_public)
                    .map_err(invalid)?;
                secret.diffie_hellman(&theirs).raw_secret_bytes().to_vec()
            }
        };
        Ok(SecureBytes::new(shared))
    }
}

impl fmt::Debug for EphemeralKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EphemeralKeyPair")
            .field("curve", &self.curve)
            .field("public_key", &hex::encode(&self.public_key))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_sides_agree() {
        for curve in Curve::ALL {
            let alice = generate_ephemeral_key_pair(curve);
            let bob = generate_ephemeral_key_pair(curve);

            let a = alice.shared_secret(bob.public_key()).unwrap();
            let b = bob.shared_secret(alice.public_key()).unwrap();

            assert_eq!(a, b);
            assert_eq!(a.len(), curve.secret_len());
        }
    }

    #[test]
    fn test_public_key_is_uncompressed() {
        let pair = generate_ephemeral_key_pair(Curve::P256);
        assert_eq!(pair.public_key().len(), 65);
        assert_eq!(pair.public_key()[0], 0x04);
    }

    #[test]
    fn test_unknown_curve() {
        let err = "P-192".parse::<Curve>().unwrap_err();
        assert!(matches!(err, CryptoError::UnsupportedCurve(_)));
    }

    #[test]
    fn test_rejects_point_from_other_curve() {
        let alice = generate_ephemeral_key_pair(Curve::P256);
        let bob = generate_ephemeral_key_pair(Curve::P384);

        assert!(matches!(
            alice.shared_secret(bob.public_key()),
            Err(CryptoError::InvalidParameter(_))
        ));
    }
}
