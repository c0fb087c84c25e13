//! Wire envelope codec
//!
//! Keys travel as a two-field protobuf message:
//!
//! ```text
//! message PublicKey  { required KeyType Type = 1; required bytes Data = 2; }
//! message PrivateKey { required KeyType Type = 1; required bytes Data = 2; }
//! ```
//!
//! Both fields are `required`, so the RSA discriminant (0) is always written
//! and envelopes are byte-identical to other libp2p implementations.

use prost::Message;
use tracing::debug;
use zeroize::Zeroize;

use super::{
    Ed25519PrivateKey, Ed25519PublicKey, KeyType, PrivateKey, PublicKey, RsaPrivateKey,
    RsaPublicKey, Secp256k1PrivateKey, Secp256k1PublicKey,
};
use crate::crypto::SecureBytes;
use crate::error::{CryptoError, Result};

#[derive(Clone, PartialEq, Message)]
struct PublicKeyProto {
    #[prost(enumeration = "KeyType", required, tag = "1")]
    key_type: i32,
    #[prost(bytes = "vec", required, tag = "2")]
    data: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
struct PrivateKeyProto {
    #[prost(enumeration = "KeyType", required, tag = "1")]
    key_type: i32,
    #[prost(bytes = "vec", required, tag = "2")]
    data: Vec<u8>,
}

impl Drop for PrivateKeyProto {
    fn drop(&mut self) {
        self.data.zeroize();
    }
}

/// Serialize a public key into its wire envelope
pub fn marshal_public_key(key: &PublicKey) -> Vec<u8> {
    PublicKeyProto {
        key_type: key.key_type().code(),
        data: key.raw(),
    }
    .encode_to_vec()
}

/// Serialize a private key into its wire envelope
pub fn marshal_private_key(key: &PrivateKey) -> SecureBytes {
    let proto = PrivateKeyProto {
        key_type: key.key_type().code(),
        data: key.raw().to_vec(),
    };
    SecureBytes::new(proto.encode_to_vec())
}

/// Parse a public key envelope
///
/// Fails with `UnsupportedKeyType` for an unknown discriminant and with
/// `MalformedKey` when the envelope or its payload does not parse.
pub fn unmarshal_public_key(bytes: &[u8]) -> Result<PublicKey> {
    let proto = PublicKeyProto::decode(bytes)
        .map_err(|e| CryptoError::MalformedKey(format!("public key envelope: {e}")))?;
    let key_type = KeyType::from_code(proto.key_type)?;
    debug!(%key_type, len = proto.data.len(), "unmarshaling public key");

    let key = match key_type {
        KeyType::Rsa => PublicKey::Rsa(RsaPublicKey::from_bytes(&proto.data)?),
        KeyType::Ed25519 => PublicKey::Ed25519(Ed25519PublicKey::from_bytes(&proto.data)?),
        KeyType::Secp256k1 => PublicKey::Secp256k1(Secp256k1PublicKey::from_bytes(&proto.data)?),
    };
    Ok(key)
}

/// Parse a private key envelope
pub fn unmarshal_private_key(bytes: &[u8]) -> Result<PrivateKey> {
    let proto = PrivateKeyProto::decode(bytes)
        .map_err(|e| CryptoError::MalformedKey(format!("private key envelope: {e}")))?;
    let key_type = KeyType::from_code(proto.key_type)?;
    debug!(%key_type, "unmarshaling private key");

    let key = match key_type {
        KeyType::Rsa => PrivateKey::Rsa(RsaPrivateKey::from_bytes(&proto.data)?),
        KeyType::Ed25519 => PrivateKey::Ed25519(Ed25519PrivateKey::from_bytes(&proto.data)?),
        KeyType::Secp256k1 => {
            PrivateKey::Secp256k1(Secp256k1PrivateKey::from_bytes(&proto.data)?)
        }
    };
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secp256k1_key() -> PrivateKey {
        PrivateKey::Secp256k1(Secp256k1PrivateKey::from_bytes(&[0x42u8; 32]).unwrap())
    }

    #[test]
    fn test_envelope_layout() {
        let key = secp256k1_key();
        let envelope = key.marshal();

        assert_eq!(&envelope[..4], &[0x08, 0x02, 0x12, 0x20]);
        assert_eq!(&envelope[4..], &[0x42u8; 32]);

        let public = key.public().marshal();
        assert_eq!(&public[..4], &[0x08, 0x02, 0x12, 0x21]);
    }

    #[test]
    fn test_rsa_discriminant_is_written() {
        let proto = PublicKeyProto {
            key_type: KeyType::Rsa.code(),
            data: vec![1, 2, 3],
        };

        assert_eq!(proto.encode_to_vec(), vec![0x08, 0x00, 0x12, 0x03, 1, 2, 3]);
    }

    #[test]
    fn test_unmarshal_round_trip() {
        let key = secp256k1_key();

        assert_eq!(unmarshal_private_key(&key.marshal()).unwrap(), key);
        assert_eq!(
            unmarshal_public_key(&key.public().marshal()).unwrap(),
            key.public()
        );
    }

    #[test]
    fn test_unknown_key_type() {
        let envelope = [0x08, 0x07, 0x12, 0x01, 0x00];

        assert!(matches!(
            unmarshal_public_key(&envelope),
            Err(CryptoError::UnsupportedKeyType(code)) if code == "7"
        ));
        assert!(matches!(
            unmarshal_private_key(&envelope),
            Err(CryptoError::UnsupportedKeyType(_))
        ));
    }

    #[test]
    fn test_truncated_envelope() {
        let envelope = secp256k1_key().public().marshal();

        assert!(matches!(
            unmarshal_public_key(&envelope[..envelope.len() - 5]),
            Err(CryptoError::MalformedKey(_))
        ));
    }

    #[test]
    fn test_compact_point_tag_rejected() {
        let mut envelope = secp256k1_key().public().marshal();
        // Payload starts right after the 4-byte header
        envelope[4] = 0x05;

        assert!(matches!(
            unmarshal_public_key(&envelope),
            Err(CryptoError::MalformedKey(_))
        ));
    }

    #[test]
    fn test_bad_payload_length() {
        // Ed25519 public key with a 31-byte payload
        let mut envelope = vec![0x08, 0x01, 0x12, 0x1f];
        envelope.extend_from_slice(&[0u8; 31]);

        assert!(matches!(
            unmarshal_public_key(&envelope),
            Err(CryptoError::MalformedKey(_))
        ));
    }
}
