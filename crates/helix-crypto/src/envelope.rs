//! AES-256-GCM envelope encryption/decryption
//!
//! Envelope format (binary):
//! ```text
//! [12 bytes: random IV][N bytes: ciphertext][16 bytes: GCM tag]
//! ```
//!
//! The ciphertext is exactly as long as the plaintext. No AAD is bound, so the
//! layout is identical to WebCrypto's `AES-GCM` output with the IV prepended.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use helix_core::{CryptoError, HelixResult};
use rand::RngCore;

use crate::keys::EncryptionKey;
use crate::{IV_LENGTH, MIN_ENVELOPE_LENGTH};

/// Encrypt `plaintext` under `key` with a fresh random IV.
///
/// Returns: `[12-byte IV][ciphertext][16-byte tag]`
pub fn encrypt(plaintext: &[u8], key: &EncryptionKey) -> HelixResult<Vec<u8>> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    let mut iv = [0u8; IV_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut iv);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|e| anyhow::anyhow!("AES-256-GCM encryption failed: {e}"))?;

    let mut envelope = Vec::with_capacity(IV_LENGTH + ciphertext.len());
    envelope.extend_from_slice(&iv);
    envelope.extend_from_slice(&ciphertext);
    Ok(envelope)
}

/// Decrypt an envelope produced by `encrypt` (or any compatible client).
///
/// Fails with `EnvelopeTooShort` before touching the cipher when the input
/// cannot hold an IV and a tag, and with `AuthenticationFailed` on a wrong key
/// or any modification of the envelope.
pub fn decrypt(envelope: &[u8], key: &EncryptionKey) -> HelixResult<Vec<u8>> {
    if envelope.len() < MIN_ENVELOPE_LENGTH {
        return Err(CryptoError::EnvelopeTooShort {
            minimum: MIN_ENVELOPE_LENGTH,
            actual: envelope.len(),
        }
        .into());
    }

    let (iv, ciphertext) = envelope.split_at(IV_LENGTH);
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    cipher
        .decrypt(Nonce::from_slice(iv), ciphertext)
        .map_err(|_| CryptoError::AuthenticationFailed.into())
}

/// `encrypt` for callers holding a key of unchecked length.
pub fn encrypt_with_raw_key(plaintext: &[u8], key: &[u8]) -> HelixResult<Vec<u8>> {
    let key = EncryptionKey::from_slice(key)?;
    encrypt(plaintext, &key)
}

/// `decrypt` for callers holding a key of unchecked length. The key is
/// checked before the envelope.
pub fn decrypt_with_raw_key(envelope: &[u8], key: &[u8]) -> HelixResult<Vec<u8>> {
    let key = EncryptionKey::from_slice(key)?;
    decrypt(envelope, &key)
}
