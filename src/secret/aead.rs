// src/secret/aead.rs

//! AES-256-GCM protection for the stored credential.
//!
//! Blob layout: `nonce(12) || ciphertext || tag(16)`. Every encryption draws
//! a fresh random 96-bit nonce.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};

use super::sensitive::{Credential, KeyMaterial};
use super::SecretError;

pub const NONCE_LEN: usize = 12;
pub const KEY_LEN: usize = 32;
pub const TAG_LEN: usize = 16;

/// Generate a random 256-bit key.
pub fn generate_key() -> KeyMaterial {
    KeyMaterial::new(rand::random::<[u8; KEY_LEN]>())
}

/// Generate a random 96-bit nonce.
pub fn generate_nonce() -> [u8; NONCE_LEN] {
    rand::random::<[u8; NONCE_LEN]>()
}

fn cipher(key: &KeyMaterial) -> Result<Aes256Gcm, SecretError> {
    Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| SecretError::InvalidKey { len: key.as_bytes().len() })
}

/// Encrypt `plaintext`, returning `nonce || ciphertext_with_tag`.
pub fn encrypt_credential(plaintext: &str, key: &KeyMaterial) -> Result<Vec<u8>, SecretError> {
    let cipher = cipher(key)?;
    let nonce_bytes = generate_nonce();

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
        .map_err(|_| SecretError::Encryption)?;

    let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

/// Split off the nonce, then decrypt and authenticate the remainder.
pub fn decrypt_credential(blob: &[u8], key: &KeyMaterial) -> Result<Credential, SecretError> {
    if blob.len() < NONCE_LEN {
        return Err(SecretError::Format { len: blob.len() });
    }
    let cipher = cipher(key)?;
    let (nonce, ciphertext) = blob.split_at(NONCE_LEN);

    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| SecretError::Authentication)?;

    let text = String::from_utf8(plaintext).map_err(|_| SecretError::Utf8)?;
    Ok(Credential::new(text))
}
