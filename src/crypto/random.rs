//! Cryptographically secure random bytes

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{CryptoError, Result};

/// Generate `length` random bytes from the operating system RNG
///
/// A zero length is a caller bug and is rejected rather than returning an empty buffer.
pub fn random_bytes(length: usize) -> Result<Vec<u8>> {
    if length == 0 {
        return Err(CryptoError::InvalidParameter(
            "random bytes length must be bigger than 0".into(),
        ));
    }

    let mut buf = vec![0u8; length];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| CryptoError::InvalidParameter(format!("OS RNG unavailable: {e}")))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_bytes_length() {
        assert_eq!(random_bytes(32).unwrap().len(), 32);
    }

    #[test]
    fn test_random_bytes_differ() {
        assert_ne!(random_bytes(16).unwrap(), random_bytes(16).unwrap());
    }

    #[test]
    fn test_zero_length_rejected() {
        assert!(matches!(
            random_bytes(0),
            Err(CryptoError::InvalidParameter(_))
        ));
    }
}
