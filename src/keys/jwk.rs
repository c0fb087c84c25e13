//! RSA JSON Web Key conversion (RFC 7517, RFC 7518 section 6.3)
//!
//! Integers are big-endian, base64url encoded without padding. On import the
//! CRT parameters (`dp`, `dq`, `qi`) are recomputed from `d`, `p` and `q`
//! rather than trusted.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::BigUint;
use serde::{Deserialize, Serialize};

use super::rsa::MAX_RSA_BITS;
use super::{KeyType, RsaPrivateKey, RsaPublicKey};
use crate::error::{CryptoError, Result};

const KTY_RSA: &str = "RSA";
const ALG_RS256: &str = "RS256";

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsaJwk {
    pub kty: String,
    pub n: String,
    pub e: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dq: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
}

impl RsaJwk {
    pub fn is_private(&self) -> bool {
        self.d.is_some()
    }

    fn ensure_rsa(&self) -> Result<()> {
        if self.kty != KTY_RSA {
            return Err(CryptoError::malformed(
                KeyType::Rsa,
                format!("JWK kty must be {KTY_RSA}, got {}", self.kty),
            ));
        }
        Ok(())
    }
}

// Private exponents stay out of logs
impl std::fmt::Debug for RsaJwk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaJwk")
            .field("kty", &self.kty)
            .field("n", &self.n)
            .field("e", &self.e)
            .field("private", &self.is_private())
            .finish()
    }
}

fn encode_uint(value: &BigUint) -> String {
    URL_SAFE_NO_PAD.encode(value.to_bytes_be())
}

fn decode_uint(name: &str, value: Option<&str>) -> Result<BigUint> {
    let value = value.ok_or_else(|| {
        CryptoError::malformed(KeyType::Rsa, format!("JWK is missing `{name}`"))
    })?;
    let bytes = URL_SAFE_NO_PAD
        .decode(value.trim_end_matches('='))
        .map_err(|e| CryptoError::malformed(KeyType::Rsa, format!("JWK `{name}`: {e}")))?;
    Ok(BigUint::from_bytes_be(&bytes))
}

impl RsaPublicKey {
    pub fn from_jwk(jwk: &RsaJwk) -> Result<Self> {
        jwk.ensure_rsa()?;
        let n = decode_uint("n", Some(&jwk.n))?;
        let e = decode_uint("e", Some(&jwk.e))?;
        let key = rsa::RsaPublicKey::new_with_max_size(n, e, MAX_RSA_BITS)
            .map_err(|e| CryptoError::malformed(KeyType::Rsa, e))?;
        Self::from_key(key)
    }

    pub fn to_jwk(&self) -> RsaJwk {
        let key = self.inner();
        RsaJwk {
            kty: KTY_RSA.to_string(),
            n: encode_uint(key.n()),
            e: encode_uint(key.e()),
            d: None,
            p: None,
            q: None,
            dp: None,
            dq: None,
            qi: None,
            alg: Some(ALG_RS256.to_string()),
        }
    }
}

impl RsaPrivateKey {
    pub fn from_jwk(jwk: &RsaJwk) -> Result<Self> {
        jwk.ensure_rsa()?;
        let n = decode_uint("n", Some(&jwk.n))?;
        let e = decode_uint("e", Some(&jwk.e))?;
        let d = decode_uint("d", jwk.d.as_deref())?;
        let p = decode_uint("p", jwk.p.as_deref())?;
        let q = decode_uint("q", jwk.q.as_deref())?;

        let key = rsa::RsaPrivateKey::from_components(n, e, d, vec![p, q])
            .map_err(|e| CryptoError::malformed(KeyType::Rsa, e))?;
        Self::from_key(key)
    }

    pub fn to_jwk(&self) -> Result<RsaJwk> {
        let key = self.inner();
        let [p, q] = key.primes() else {
            return Err(CryptoError::malformed(
                KeyType::Rsa,
                "JWK export needs a two-prime key",
            ));
        };

        let one = BigUint::from(1u32);
        let two = BigUint::from(2u32);
        let dp = key.d() % &(p - &one);
        let dq = key.d() % &(q - &one);
        // p is prime, so q^(p-2) is the inverse of q mod p
        let qi = q.modpow(&(p - &two), p);

        Ok(RsaJwk {
            d: Some(encode_uint(key.d())),
            p: Some(encode_uint(p)),
            q: Some(encode_uint(q)),
            dp: Some(encode_uint(&dp)),
            dq: Some(encode_uint(&dq)),
            qi: Some(encode_uint(&qi)),
            ..self.public().to_jwk()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{KeyBackend, OsBackend};

    fn generate() -> RsaPrivateKey {
        RsaPrivateKey::from_bytes(&OsBackend.generate_rsa(512).unwrap()).unwrap()
    }

    #[test]
    fn test_private_jwk_round_trip() {
        let key = generate();
        let jwk = key.to_jwk().unwrap();

        assert!(jwk.is_private());
        assert_eq!(jwk.e, "AQAB");

        let restored = RsaPrivateKey::from_jwk(&jwk).unwrap();
        assert_eq!(restored.to_bytes(), key.to_bytes());
    }

    #[test]
    fn test_public_jwk_round_trip() {
        let key = generate();
        let jwk = key.public().to_jwk();

        assert!(!jwk.is_private());
        assert_eq!(&RsaPublicKey::from_jwk(&jwk).unwrap(), key.public());
    }

    #[test]
    fn test_json_shape() {
        let jwk = generate().public().to_jwk();
        let json = serde_json::to_value(&jwk).unwrap();

        assert_eq!(json["kty"], "RSA");
        assert_eq!(json["alg"], "RS256");
        assert!(json.get("d").is_none());
        assert!(!jwk.n.contains('='));
    }

    #[test]
    fn test_public_jwk_is_not_a_private_key() {
        let jwk = generate().public().to_jwk();

        assert!(matches!(
            RsaPrivateKey::from_jwk(&jwk),
            Err(CryptoError::MalformedKey(_))
        ));
    }

    #[test]
    fn test_wrong_kty_rejected() {
        let mut jwk = generate().public().to_jwk();
        jwk.kty = "EC".to_string();

        assert!(matches!(
            RsaPublicKey::from_jwk(&jwk),
            Err(CryptoError::MalformedKey(_))
        ));
    }

    #[test]
    fn test_debug_hides_private_exponent() {
        let jwk = generate().to_jwk().unwrap();
        let printed = format!("{:?}", jwk);

        assert!(!printed.contains(jwk.d.as_deref().unwrap()));
    }
}
