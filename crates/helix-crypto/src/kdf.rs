//! Key derivation: password → 256-bit key via PBKDF2-HMAC-SHA256

use helix_core::{HelixResult, ValidationError};
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use crate::keys::EncryptionKey;
use crate::KEY_LENGTH;

/// Iteration count shared by every Helix client
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 100_000;

pub const DEFAULT_SALT_LENGTH: usize = 16;

/// Derive a 256-bit key from a password and salt using PBKDF2-HMAC-SHA256.
///
/// The salt does not need to be secret, but it must be stored alongside the
/// encrypted data: without it the key cannot be derived again.
pub fn derive_key_from_password(
    password: &SecretString,
    salt: &[u8],
    iterations: u32,
) -> HelixResult<EncryptionKey> {
    if iterations == 0 {
        return Err(
            ValidationError::MalformedInput("PBKDF2 iterations must be at least 1".into()).into(),
        );
    }

    let mut key = [0u8; KEY_LENGTH];
    pbkdf2::pbkdf2_hmac::<Sha256>(
        password.expose_secret().as_bytes(),
        salt,
        iterations,
        &mut key,
    );
    Ok(EncryptionKey::from_bytes(key))
}

/// Generate a random salt for `derive_key_from_password`.
pub fn generate_salt(length: usize) -> Vec<u8> {
    let mut salt = vec![0u8; length];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}
