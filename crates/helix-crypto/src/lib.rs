//! helix-crypto: client-side encryption for Helix storage
//!
//! Every Helix client, in any language, produces and accepts the same envelope:
//!
//! ```text
//! [12 bytes: random IV][N bytes: AES-256-GCM ciphertext][16 bytes: GCM tag]
//! ```
//!
//! No associated data is bound. File names are encrypted as their own
//! envelope under the file's key and carried as base64 text.
//!
//! Keys are 32 bytes, random (`generate_key`) or derived from a password with
//! PBKDF2-HMAC-SHA256 (`derive_key_from_password`). They leave the process
//! only as standard base64 (`export_key` / `import_key`), optionally kept in a
//! `KeyStore` keyed by artifact id.

pub mod envelope;
pub mod kdf;
pub mod keys;
pub mod keystore;
pub mod names;

pub use envelope::{decrypt, decrypt_with_raw_key, encrypt, encrypt_with_raw_key};
pub use kdf::{
    derive_key_from_password, generate_salt, DEFAULT_PBKDF2_ITERATIONS, DEFAULT_SALT_LENGTH,
};
pub use keys::{export_key, generate_key, import_key, EncryptionKey};
pub use keystore::KeyStore;
pub use names::{decrypt_string, encrypt_string};

/// Size of an AES-256 key in bytes
pub const KEY_LENGTH: usize = 32;

/// Size of an AES-GCM IV (96-bit)
pub const IV_LENGTH: usize = 12;

/// Size of a GCM authentication tag
pub const TAG_LENGTH: usize = 16;

/// Shortest valid envelope (empty plaintext)
pub const MIN_ENVELOPE_LENGTH: usize = IV_LENGTH + TAG_LENGTH;
