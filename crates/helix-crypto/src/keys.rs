//! Encryption keys: generation and base64 export/import

use base64::{engine::general_purpose::STANDARD, Engine};
use helix_core::{CryptoError, HelixResult, ValidationError};
use rand::RngCore;
use zeroize::Zeroize;

use crate::KEY_LENGTH;

/// A 256-bit content key. Zeroized on drop, redacted in Debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionKey {
    bytes: [u8; KEY_LENGTH],
}

impl EncryptionKey {
    pub fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self { bytes }
    }

    /// Accept a key of unknown length, rejecting anything but `KEY_LENGTH` bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let bytes: [u8; KEY_LENGTH] =
            bytes
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: KEY_LENGTH,
                    actual: bytes.len(),
                })?;
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.bytes
    }
}

impl Drop for EncryptionKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Generate a random 256-bit encryption key from the OS CSPRNG.
pub fn generate_key() -> EncryptionKey {
    let mut bytes = [0u8; KEY_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    EncryptionKey::from_bytes(bytes)
}

/// Export a key as standard (padded) base64.
pub fn export_key(key: &EncryptionKey) -> String {
    STANDARD.encode(key.as_bytes())
}

/// Import a key from base64, re-validating the decoded length.
pub fn import_key(encoded: &str) -> HelixResult<EncryptionKey> {
    let mut decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|e| ValidationError::MalformedInput(format!("key is not valid base64: {e}")))?;
    let key = EncryptionKey::from_slice(&decoded);
    decoded.zeroize();
    Ok(key?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use helix_core::HelixError;

    #[test]
    fn test_key_generation() {
        let k1 = generate_key();
        let k2 = generate_key();
        assert_ne!(k1.as_bytes(), k2.as_bytes(), "random keys must differ");
    }

    #[test]
    fn test_export_import_roundtrip() {
        let key = generate_key();
        let exported = export_key(&key);

        // 32 bytes -> 44 base64 chars with one '=' of padding
        assert_eq!(exported.len(), 44);
        assert!(exported.ends_with('='));

        let imported = import_key(&exported).unwrap();
        assert_eq!(key, imported);
    }

    #[test]
    fn test_import_rejects_wrong_lengths() {
        for len in [0usize, 16, 31, 33, 64] {
            let encoded = STANDARD.encode(vec![7u8; len]);
            let result = import_key(&encoded);
            assert!(
                matches!(
                    result,
                    Err(HelixError::Crypto(CryptoError::InvalidKeyLength { actual, .. }))
                        if actual == len
                ),
                "length {len} must be rejected"
            );
        }
    }

    #[test]
    fn test_import_rejects_garbage() {
        let result = import_key("not base64!!");
        assert!(matches!(
            result,
            Err(HelixError::Validation(ValidationError::MalformedInput(_)))
        ));
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = EncryptionKey::from_bytes([0xAB; KEY_LENGTH]);
        let debug = format!("{key:?}");
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("171"), "raw bytes must not leak");
    }
}
