//! Registry input rules
//!
//! The storage registry rejects malformed registrations; checking the same
//! rules client-side turns a failed round trip into an immediate error.

use chrono::{DateTime, Utc};

use crate::error::ValidationError;

/// Arweave transaction ids are 43 base64url characters; the registry stores
/// at most this many bytes per id.
pub const TRANSACTION_ID_LEN: usize = 43;

pub const MAX_ENCRYPTED_NAME_LEN: usize = 256;

pub const MAX_MIME_TYPE_LEN: usize = 128;

pub const MAX_ENCRYPTED_KEY_LEN: usize = 512;

/// Content ids are opaque to the client. Only the registry's storage bound
/// is checked: the id must be non-empty and fit in `TRANSACTION_ID_LEN` bytes.
pub fn validate_transaction_id(tx_id: &str) -> Result<(), ValidationError> {
    if tx_id.is_empty() || tx_id.len() > TRANSACTION_ID_LEN {
        return Err(ValidationError::InvalidTransactionId(tx_id.to_string()));
    }
    Ok(())
}

/// Basic `type/subtype` check
pub fn validate_mime_type(mime: &str) -> Result<(), ValidationError> {
    check_length("mime type", mime, MAX_MIME_TYPE_LEN)?;
    match mime.split_once('/') {
        Some((kind, subtype))
            if !kind.is_empty() && !subtype.is_empty() && !subtype.contains('/') =>
        {
            Ok(())
        }
        _ => Err(ValidationError::InvalidMimeType(mime.to_string())),
    }
}

pub fn validate_encrypted_name(name: Option<&str>) -> Result<(), ValidationError> {
    match name {
        Some(name) => check_length("encrypted name", name, MAX_ENCRYPTED_NAME_LEN),
        None => Ok(()),
    }
}

pub fn validate_size(size: u64) -> Result<(), ValidationError> {
    if size == 0 {
        return Err(ValidationError::EmptyFile);
    }
    Ok(())
}

/// Share options: positive download cap, future expiry, bounded key length
pub fn validate_share(
    expires_at: Option<DateTime<Utc>>,
    max_downloads: Option<u32>,
    encrypted_key: Option<&str>,
    now: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if max_downloads == Some(0) {
        return Err(ValidationError::InvalidMaxDownloads);
    }
    if expires_at.is_some_and(|t| t <= now) {
        return Err(ValidationError::ExpirationInPast);
    }
    if let Some(key) = encrypted_key {
        check_length("encrypted key", key, MAX_ENCRYPTED_KEY_LEN)?;
    }
    Ok(())
}

fn check_length(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.len() > max {
        return Err(ValidationError::TooLong {
            field,
            max,
            actual: value.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const TX: &str = "bNbA3TEQVL60xlgCcqdz4ZPHFZ711cZ3hmkpGttDt_U";

    #[test]
    fn test_transaction_id() {
        assert_eq!(TX.len(), TRANSACTION_ID_LEN);
        assert!(validate_transaction_id(TX).is_ok());
        assert!(validate_transaction_id("short").is_ok());
        assert!(validate_transaction_id("ipfs:QmShort+id/0").is_ok());
        assert!(validate_transaction_id("").is_err());
        let too_long = format!("{TX}x");
        assert_eq!(
            validate_transaction_id(&too_long),
            Err(ValidationError::InvalidTransactionId(too_long.clone()))
        );
    }

    #[test]
    fn test_mime_type() {
        assert!(validate_mime_type("text/plain").is_ok());
        assert!(validate_mime_type("application/vnd.api+json").is_ok());
        assert!(validate_mime_type("").is_err());
        assert!(validate_mime_type("text").is_err());
        assert!(validate_mime_type("/plain").is_err());
        assert!(validate_mime_type("text/").is_err());
        assert!(validate_mime_type("a/b/c").is_err());

        let long = format!("application/{}", "x".repeat(MAX_MIME_TYPE_LEN));
        assert!(matches!(
            validate_mime_type(&long),
            Err(ValidationError::TooLong { field: "mime type", .. })
        ));
    }

    #[test]
    fn test_encrypted_name() {
        assert!(validate_encrypted_name(None).is_ok());
        assert!(validate_encrypted_name(Some("abc")).is_ok());
        let long = "a".repeat(MAX_ENCRYPTED_NAME_LEN + 1);
        assert!(validate_encrypted_name(Some(&long)).is_err());
    }

    #[test]
    fn test_size() {
        assert_eq!(validate_size(0), Err(ValidationError::EmptyFile));
        assert!(validate_size(1).is_ok());
    }

    #[test]
    fn test_share_options() {
        let now = Utc::now();
        assert!(validate_share(None, None, None, now).is_ok());
        assert!(validate_share(Some(now + Duration::hours(1)), Some(5), Some("k"), now).is_ok());
        assert_eq!(
            validate_share(None, Some(0), None, now),
            Err(ValidationError::InvalidMaxDownloads)
        );
        assert_eq!(
            validate_share(Some(now - Duration::seconds(1)), None, None, now),
            Err(ValidationError::ExpirationInPast)
        );
        let long_key = "k".repeat(MAX_ENCRYPTED_KEY_LEN + 1);
        assert!(validate_share(None, None, Some(&long_key), now).is_err());
    }
}
