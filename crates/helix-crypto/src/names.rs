//! String encryption for file names and other short metadata
//!
//! A name is encrypted as its own envelope under the file's content key and
//! carried as standard base64. Envelopes are randomized, so the same name
//! encrypts differently on every call.
//!
//! The name is not bound to the content envelope: a registry entry could pair
//! one file's encrypted name with another file's content under the same key
//! without either decryption failing. Binding them would change the envelope
//! format shared with the other clients.

use base64::{engine::general_purpose::STANDARD, Engine};
use helix_core::{HelixResult, ValidationError};

use crate::envelope::{decrypt, encrypt};
use crate::keys::EncryptionKey;

/// Encrypt a UTF-8 string, returning the base64 envelope.
pub fn encrypt_string(text: &str, key: &EncryptionKey) -> HelixResult<String> {
    let envelope = encrypt(text.as_bytes(), key)?;
    Ok(STANDARD.encode(envelope))
}

/// Decrypt a base64 envelope produced by `encrypt_string`.
pub fn decrypt_string(encoded: &str, key: &EncryptionKey) -> HelixResult<String> {
    let envelope = STANDARD.decode(encoded.trim()).map_err(|e| {
        ValidationError::MalformedInput(format!("encrypted string is not valid base64: {e}"))
    })?;
    let plaintext = decrypt(&envelope, key)?;
    String::from_utf8(plaintext).map_err(|e| {
        ValidationError::MalformedInput(format!("decrypted string is not UTF-8: {e}")).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::generate_key;
    use helix_core::{CryptoError, HelixError};

    #[test]
    fn test_encrypt_decrypt_name_roundtrip() {
        let key = generate_key();
        let name = "my-photo.jpg";

        let encrypted = encrypt_string(name, &key).unwrap();
        let decrypted = decrypt_string(&encrypted, &key).unwrap();

        assert_eq!(decrypted, name);
    }

    #[test]
    fn test_randomized_encryption() {
        let key = generate_key();

        let enc1 = encrypt_string("report.pdf", &key).unwrap();
        let enc2 = encrypt_string("report.pdf", &key).unwrap();

        assert_ne!(enc1, enc2, "fresh IV per call");
    }

    #[test]
    fn test_decrypt_wrong_key() {
        let encrypted = encrypt_string("secret.txt", &generate_key()).unwrap();
        let result = decrypt_string(&encrypted, &generate_key());

        assert!(matches!(
            result,
            Err(HelixError::Crypto(CryptoError::AuthenticationFailed))
        ));
    }

    #[test]
    fn test_unicode_filename() {
        let key = generate_key();
        let name = "отчёт-2026 📄.pdf";

        let encrypted = encrypt_string(name, &key).unwrap();
        assert_eq!(decrypt_string(&encrypted, &key).unwrap(), name);
    }

    #[test]
    fn test_decrypt_non_utf8_plaintext() {
        let key = generate_key();
        let envelope = encrypt(&[0xFF, 0xFE, 0xFD], &key).unwrap();
        let encoded = STANDARD.encode(envelope);

        let result = decrypt_string(&encoded, &key);
        assert!(matches!(
            result,
            Err(HelixError::Validation(ValidationError::MalformedInput(_)))
        ));
    }

    #[test]
    fn test_decrypt_invalid_base64() {
        let result = decrypt_string("%%%", &generate_key());
        assert!(matches!(
            result,
            Err(HelixError::Validation(ValidationError::MalformedInput(_)))
        ));
    }
}
