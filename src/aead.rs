//! Authenticated symmetric encryption.
//!
//! Cipher id 1 is XChaCha20-Poly1305 (24-byte nonce, 32-byte key, no
//! associated data — the MAC covers ciphertext only).
//!
//! The on-disk/in-transit form of a ciphertext is `nonce || ciphertext_with_tag`.
//! Callers must never reuse a nonce under the same key; `encrypt` always
//! draws a fresh one from the OS CSPRNG.

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use rand::RngCore;
use rand::rngs::OsRng;
use thiserror::Error;

pub const KEY_LEN: usize = 32;
pub const NONCE_LEN: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherId {
    XChaCha20Poly1305,
}

impl CipherId {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::XChaCha20Poly1305),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::XChaCha20Poly1305 => 1,
        }
    }
}

#[derive(Debug, Error)]
pub enum AeadError {
    #[error("authentication failed (wrong passphrase or tampered data)")]
    AuthFailure,

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("ciphertext too short to contain a nonce")]
    Truncated,
}

/// Encrypt `plaintext` under `key`, returning `nonce || ciphertext_with_tag`.
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, AeadError> {
    let cipher = cipher_from_key(key)?;
    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = XNonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| AeadError::AuthFailure)?;

    let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypt `nonce || ciphertext_with_tag` under `key`.
pub fn decrypt(key: &[u8], sealed: &[u8]) -> Result<Vec<u8>, AeadError> {
    if sealed.len() < NONCE_LEN {
        return Err(AeadError::Truncated);
    }
    let cipher = cipher_from_key(key)?;
    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
    let nonce = XNonce::from_slice(nonce_bytes);

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| AeadError::AuthFailure)
}

fn cipher_from_key(key: &[u8]) -> Result<XChaCha20Poly1305, AeadError> {
    if key.len() != KEY_LEN {
        return Err(AeadError::InvalidKeyLength {
            expected: KEY_LEN,
            actual: key.len(),
        });
    }
    Ok(XChaCha20Poly1305::new_from_slice(key).expect("key length checked above"))
}
