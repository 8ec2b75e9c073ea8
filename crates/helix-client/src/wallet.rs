//! Wallet signing for Helix sign-in
//!
//! A wallet is an Ed25519 keypair addressed by the base58 encoding of its
//! 32-byte public key (the Solana convention). Keypair files hold the 64-byte
//! `secret || public` form as a JSON array of integers.

use std::path::Path;

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use helix_core::config::expand_tilde;
use helix_core::{AuthError, HelixResult, ValidationError};
use rand::rngs::OsRng;

/// Prefix of the message a wallet signs to prove control of its address
pub const SIGN_IN_PREFIX: &str = "Sign in to Helix: ";

/// Length of a keypair in `secret || public` form
pub const KEYPAIR_LENGTH: usize = 64;

/// Something that can sign on behalf of a wallet address.
pub trait WalletSigner: Send + Sync {
    /// Base58 wallet address
    fn address(&self) -> String;

    /// Ed25519 signature over `message`
    fn sign_message(&self, message: &[u8]) -> [u8; 64];
}

/// An in-process Ed25519 wallet keypair.
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Build from 64 `secret || public` bytes. The public half must match the
    /// secret half.
    pub fn from_secret_key(bytes: &[u8]) -> HelixResult<Self> {
        let bytes: &[u8; KEYPAIR_LENGTH] = bytes.try_into().map_err(|_| {
            ValidationError::MalformedInput(format!(
                "keypair must be {KEYPAIR_LENGTH} bytes, got {}",
                bytes.len()
            ))
        })?;
        let signing_key = SigningKey::from_keypair_bytes(bytes).map_err(|e| {
            ValidationError::MalformedInput(format!("inconsistent keypair: {e}"))
        })?;
        Ok(Self { signing_key })
    }

    /// Load a keypair file (JSON array of 64 integers). `~` is expanded.
    pub fn from_keypair_file(path: &Path) -> HelixResult<Self> {
        let path = expand_tilde(path);
        let content = std::fs::read_to_string(&path)?;
        let bytes: Vec<u8> = serde_json::from_str(&content).map_err(|e| {
            ValidationError::MalformedInput(format!(
                "invalid keypair file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_secret_key(&bytes)
    }

    /// The 64-byte `secret || public` form, as written to keypair files
    pub fn to_bytes(&self) -> [u8; KEYPAIR_LENGTH] {
        self.signing_key.to_keypair_bytes()
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }
}

impl WalletSigner for Keypair {
    fn address(&self) -> String {
        bs58::encode(self.public_key()).into_string()
    }

    fn sign_message(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair")
            .field("address", &self.address())
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// The exact text signed during sign-in.
pub fn sign_in_message(nonce: &str) -> String {
    format!("{SIGN_IN_PREFIX}{nonce}")
}

/// Check a sign-in signature the way the Helix API does: the signature must be
/// a valid Ed25519 signature by `address` over `sign_in_message(nonce)`.
pub fn verify_sign_in(address: &str, nonce: &str, signature: &[u8]) -> Result<(), AuthError> {
    let public: [u8; 32] = bs58::decode(address)
        .into_vec()
        .ok()
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(|| {
            AuthError::VerificationFailed(format!("invalid wallet address: {address}"))
        })?;
    let verifying_key = VerifyingKey::from_bytes(&public)
        .map_err(|e| AuthError::VerificationFailed(format!("invalid wallet key: {e}")))?;
    let signature = Signature::from_slice(signature)
        .map_err(|e| AuthError::VerificationFailed(format!("malformed signature: {e}")))?;

    verifying_key
        .verify_strict(sign_in_message(nonce).as_bytes(), &signature)
        .map_err(|_| AuthError::VerificationFailed("signature does not match wallet".into()))
}
