use thiserror::Error;

use crate::types::UploadResult;

pub type HelixResult<T> = Result<T, HelixError>;

#[derive(Debug, Error)]
pub enum HelixError {
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("config error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HelixError {
    /// True when the backend rejected the bearer token (HTTP 401).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, HelixError::Network(NetworkError::HttpStatus { code: 401, .. }))
    }
}

/// Envelope and key failures. Validation variants are raised before any cipher call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("invalid key length: {actual} bytes (expected {expected})")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("envelope too short: {actual} bytes (minimum {minimum})")]
    EnvelopeTooShort { minimum: usize, actual: usize },

    /// Wrong key, or the envelope was tampered with.
    #[error("authentication failed: wrong key or corrupted data")]
    AuthenticationFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("not authenticated: call authenticate() first")]
    NotAuthenticated,

    #[error("signature verification failed: {0}")]
    VerificationFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("backend unreachable: {0}")]
    Unreachable(String),

    #[error("HTTP {code}: {message}")]
    HttpStatus { code: u16, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The content is stored and registered, so `upload` still carries the
    /// ids and the only copy of the encryption key.
    #[error("size mismatch: uploaded {uploaded} bytes, backend recorded {recorded}")]
    SizeMismatch {
        uploaded: u64,
        recorded: u64,
        upload: Box<UploadResult>,
    },

    #[error("invalid transaction id: {0:?}")]
    InvalidTransactionId(String),

    #[error("invalid MIME type: {0:?}")]
    InvalidMimeType(String),

    #[error("{field} exceeds maximum length of {max} bytes ({actual})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("file size must be greater than zero")]
    EmptyFile,

    #[error("max downloads must be greater than zero")]
    InvalidMaxDownloads,

    #[error("expiration timestamp must be in the future")]
    ExpirationInPast,
}
