// src/secret/mod.rs

//! Local storage for the completion credential.
//!
//! Two files live under the cache directory:
//! - `encryption.key`: 32 raw bytes, generated on first use and never rotated
//! - `encrypted_api_key.bin`: `nonce(12) || ciphertext || tag(16)` (AES-256-GCM)
//!
//! The key is loaded once by the caller and passed by reference into
//! `encrypt_credential` / `decrypt_credential`; there is no process-wide
//! cipher state.

pub mod aead;
mod sensitive;

pub use aead::{decrypt_credential, encrypt_credential, generate_key, generate_nonce, KEY_LEN, NONCE_LEN, TAG_LEN};
pub use sensitive::{Credential, KeyMaterial};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const KEY_FILE_NAME: &str = "encryption.key";
pub const CREDENTIAL_FILE_NAME: &str = "encrypted_api_key.bin";

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("credential unavailable: cannot read {}: {source}", .path.display())]
    CredentialUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("credential failed authentication (tampered data or wrong key)")]
    Authentication,

    #[error("credential blob is {len} bytes, shorter than the 12-byte nonce")]
    Format { len: usize },

    #[error("key material is {len} bytes, expected 32")]
    InvalidKey { len: usize },

    #[error("encryption failed")]
    Encryption,

    #[error("decrypted credential is not valid UTF-8")]
    Utf8,

    #[error("credential is empty")]
    Empty,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Paths of the key file and the encrypted credential.
#[derive(Debug, Clone)]
pub struct SecretStore {
    key_path: PathBuf,
    credential_path: PathBuf,
}

impl SecretStore {
    pub fn new(key_path: impl Into<PathBuf>, credential_path: impl Into<PathBuf>) -> Self {
        Self {
            key_path: key_path.into(),
            credential_path: credential_path.into(),
        }
    }

    /// Both files under `dir` with their default names.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(dir.join(KEY_FILE_NAME), dir.join(CREDENTIAL_FILE_NAME))
    }

    pub fn key_path(&self) -> &Path {
        &self.key_path
    }

    pub fn credential_path(&self) -> &Path {
        &self.credential_path
    }

    /// Load the key, generating and persisting one first if none exists.
    ///
    /// Not safe against two processes generating concurrently; the second
    /// writer wins and the first one's blob becomes undecryptable.
    pub fn ensure_key(&self) -> Result<KeyMaterial, SecretError> {
        if self.key_path.exists() {
            return self.load_key();
        }

        let key = generate_key();
        write_creating_parents(&self.key_path, key.as_bytes())?;
        info!(path = %self.key_path.display(), "generated new encryption key");
        Ok(key)
    }

    /// Load an existing key. A missing or unreadable file is `CredentialUnavailable`.
    pub fn load_key(&self) -> Result<KeyMaterial, SecretError> {
        let bytes = read_file(&self.key_path)?;
        KeyMaterial::from_slice(&bytes).ok_or(SecretError::InvalidKey { len: bytes.len() })
    }

    /// Encrypt `credential` under the (possibly new) key and write the blob.
    pub fn save_credential(&self, credential: &Credential) -> Result<(), SecretError> {
        if credential.is_empty() {
            return Err(SecretError::Empty);
        }
        let key = self.ensure_key()?;
        let blob = encrypt_credential(credential.expose(), &key)?;
        write_creating_parents(&self.credential_path, &blob)?;
        info!(path = %self.credential_path.display(), "stored encrypted credential");
        Ok(())
    }

    /// Read and decrypt the stored credential.
    pub fn load_credential(&self) -> Result<Credential, SecretError> {
        let key = self.load_key()?;
        let blob = read_file(&self.credential_path)?;
        debug!(len = blob.len(), "read credential blob");
        decrypt_credential(&blob, &key)
    }

    /// Whether a credential blob has been written.
    pub fn has_credential(&self) -> bool {
        self.credential_path.is_file()
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, SecretError> {
    fs::read(path).map_err(|source| SecretError::CredentialUnavailable {
        path: path.to_path_buf(),
        source,
    })
}

fn write_creating_parents(path: &Path, bytes: &[u8]) -> Result<(), SecretError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_key_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SecretStore::in_dir(dir.path().join("nested").join("cache"));

        let first = store.ensure_key().unwrap();
        let second = store.ensure_key().unwrap();
        assert_eq!(first.as_bytes(), second.as_bytes());
        assert_eq!(fs::read(store.key_path()).unwrap().len(), KEY_LEN);
    }

    #[test]
    fn test_existing_key_loaded_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let store = SecretStore::in_dir(dir.path());
        fs::write(store.key_path(), [7u8; KEY_LEN]).unwrap();
        assert_eq!(store.ensure_key().unwrap().as_bytes(), &[7u8; KEY_LEN]);
    }

    #[test]
    fn test_wrong_length_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = SecretStore::in_dir(dir.path());
        // A urlsafe-base64 key from an older install is 44 bytes.
        fs::write(store.key_path(), [b'A'; 44]).unwrap();
        assert!(matches!(store.ensure_key(), Err(SecretError::InvalidKey { len: 44 })));
    }

    #[test]
    fn test_missing_files_are_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let store = SecretStore::in_dir(dir.path());
        assert!(matches!(store.load_credential(), Err(SecretError::CredentialUnavailable { .. })));

        store.ensure_key().unwrap();
        match store.load_credential() {
            Err(SecretError::CredentialUnavailable { path, .. }) => assert_eq!(path, store.credential_path()),
            other => panic!("expected CredentialUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_credential_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let store = SecretStore::in_dir(dir.path());
        assert!(matches!(store.save_credential(&Credential::new("")), Err(SecretError::Empty)));
        assert!(!store.has_credential());
    }
}
