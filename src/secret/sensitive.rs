// src/secret/sensitive.rs

//! Wrappers for key material and credentials that are zeroized on drop and
//! never printed.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::aead::KEY_LEN;

/// A 256-bit AES-GCM key.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial([u8; KEY_LEN]);

impl KeyMaterial {
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Returns `None` unless `slice` is exactly `KEY_LEN` bytes.
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.len() != KEY_LEN {
            return None;
        }
        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(slice);
        Some(Self(bytes))
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyMaterial([REDACTED])")
    }
}

/// The bearer token for the completion service.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The plaintext token. Only the completion transport should call this.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_material_from_slice() {
        assert!(KeyMaterial::from_slice(&[0u8; 32]).is_some());
        assert!(KeyMaterial::from_slice(&[0u8; 16]).is_none());
        assert!(KeyMaterial::from_slice(&[0u8; 44]).is_none());
    }

    #[test]
    fn test_debug_redacts() {
        let key = KeyMaterial::new([0xAA; 32]);
        let credential = Credential::new("sk-live-very-secret");
        assert_eq!(format!("{:?}", key), "KeyMaterial([REDACTED])");
        assert!(!format!("{:?}", credential).contains("sk-live"));
    }

    #[test]
    fn test_blank_credential_is_empty() {
        assert!(Credential::new("   ").is_empty());
        assert!(!Credential::new("sk-test").is_empty());
    }
}
