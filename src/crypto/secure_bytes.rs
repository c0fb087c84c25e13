//! Byte container for key material with zeroing on drop
//!
//! Private key payloads, derived symmetric keys and shared secrets all pass
//! through this type so that they are:
//! 1. Zeroed when dropped
//! 2. Never printed through `Debug`
//! 3. Locked in memory where the platform allows it

use std::ops::Deref;
use zeroize::Zeroize;

/// A container for sensitive bytes that zeroes itself on drop
pub struct SecureBytes {
    data: Vec<u8>,
    locked: bool,
}

impl SecureBytes {
    /// Take ownership of `data` and manage it as secret memory
    pub fn new(data: Vec<u8>) -> Self {
        let mut secure = Self {
            data,
            locked: false,
        };
        secure.lock_memory();
        secure
    }

    /// Create a zeroed buffer of `len` bytes, typically filled by a KDF
    pub fn zeroed(len: usize) -> Self {
        Self::new(vec![0u8; len])
    }

    /// Lock memory to prevent swapping (best effort, may fail without privileges)
    #[cfg(unix)]
    fn lock_memory(&mut self) {
        if self.data.is_empty() {
            return;
        }
        let rc = unsafe { libc::mlock(self.data.as_ptr() as *const libc::c_void, self.data.len()) };
        self.locked = rc == 0;
    }

    #[cfg(not(unix))]
    fn lock_memory(&mut self) {}

    #[cfg(unix)]
    fn unlock_memory(&mut self) {
        if !self.locked {
            return;
        }
        unsafe {
            libc::munlock(self.data.as_ptr() as *const libc::c_void, self.data.len());
        }
        self.locked = false;
    }

    #[cfg(not(unix))]
    fn unlock_memory(&mut self) {}

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Mutable view for in-place fills (KDF output, RNG output)
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

// The pages must be unlocked while the allocation still exists, so the
// buffer is released only after munlock.
impl Zeroize for SecureBytes {
    fn zeroize(&mut self) {
        self.unlock_memory();
        self.data.zeroize();
    }
}

impl Drop for SecureBytes {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl Deref for SecureBytes {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl AsRef<[u8]> for SecureBytes {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl Clone for SecureBytes {
    fn clone(&self) -> Self {
        Self::new(self.data.clone())
    }
}

impl PartialEq for SecureBytes {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for SecureBytes {}

impl From<Vec<u8>> for SecureBytes {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<&[u8]> for SecureBytes {
    fn from(data: &[u8]) -> Self {
        Self::new(data.to_vec())
    }
}

impl Default for SecureBytes {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            locked: false,
        }
    }
}

// Never print secrets
impl std::fmt::Debug for SecureBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureBytes")
            .field("len", &self.data.len())
            .field("data", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_bytes_deref() {
        let secure = SecureBytes::new(vec![1, 2, 3, 4]);
        assert_eq!(secure.len(), 4);
        assert_eq!(&*secure, &[1, 2, 3, 4]);
    }

    #[test]
    fn test_debug_is_redacted() {
        let secure = SecureBytes::new(vec![0xDE, 0xAD, 0xBE, 0xEF]);
        let printed = format!("{:?}", secure);

        assert!(printed.contains("REDACTED"));
        assert!(!printed.contains("222"));
    }

    #[test]
    fn test_zeroize_clears_contents() {
        let mut secure = SecureBytes::new(vec![7u8; 16]);
        secure.zeroize();
        assert!(secure.is_empty());
    }

    #[test]
    fn test_explicit_zeroize_releases_lock() {
        let mut secure = SecureBytes::zeroed(32);
        secure.as_mut_slice().copy_from_slice(&[0x5a; 32]);

        secure.zeroize();
        assert!(!secure.locked);
        assert!(secure.is_empty());

        // A second pass and the drop after it must not touch the released pages
        secure.zeroize();
        drop(secure);
    }

    #[test]
    fn test_empty_buffer_is_never_locked() {
        let secure = SecureBytes::default();
        assert!(!secure.locked);
        assert!(!SecureBytes::new(Vec::new()).locked);
    }

    #[test]
    fn test_clone_is_independent() {
        let original = SecureBytes::new(vec![9u8; 8]);
        let mut copy = original.clone();
        copy.as_mut_slice()[0] = 0;

        assert_eq!(original[0], 9);
        assert_ne!(original, copy);
    }
}
