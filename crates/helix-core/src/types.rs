use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered file, as returned by the Helix API.
///
/// `encrypted_name` is the base64 envelope of the original file name, present
/// only for encrypted uploads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: String,
    pub transaction_id: String,
    pub mime_type: String,
    pub size: u64,
    pub is_encrypted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_name: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl FileRecord {
    /// Retrieval URL for this file's content on the given gateway
    pub fn content_url(&self, gateway_url: &str) -> String {
        content_url(gateway_url, &self.transaction_id)
    }
}

/// A share link for a registered file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLink {
    pub id: String,
    pub url: String,
    /// Server-authoritative; never decreases
    #[serde(default)]
    pub download_count: u32,
    pub created_at: DateTime<Utc>,
    /// None = never expires
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// None = unlimited
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_downloads: Option<u32>,
}

impl ShareLink {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now > expires_at)
    }

    pub fn is_exhausted(&self) -> bool {
        self.max_downloads
            .is_some_and(|max| self.download_count >= max)
    }

    /// Whether the link should still grant access at `now`
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired(now) && !self.is_exhausted()
    }
}

/// Result of an upload through the pipeline.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadResult {
    /// Content identifier assigned by the content store
    pub transaction_id: String,
    /// Gateway retrieval URL for the stored bytes
    pub url: String,
    /// Backend-assigned file record id
    pub file_id: String,
    /// Base64 key, present only for encrypted uploads. The caller must persist
    /// it: the content cannot be recovered without it.
    pub encryption_key: Option<String>,
}

impl fmt::Debug for UploadResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadResult")
            .field("transaction_id", &self.transaction_id)
            .field("url", &self.url)
            .field("file_id", &self.file_id)
            .field(
                "encryption_key",
                &self.encryption_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Options for creating a share link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShareOptions {
    pub expires_at: Option<DateTime<Utc>>,
    pub max_downloads: Option<u32>,
    /// Decryption key for the recipient, already protected by the caller
    pub encrypted_key: Option<String>,
}

pub fn content_url(gateway_url: &str, transaction_id: &str) -> String {
    format!("{}/{}", gateway_url.trim_end_matches('/'), transaction_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn share(
        download_count: u32,
        max: Option<u32>,
        expires_at: Option<DateTime<Utc>>,
    ) -> ShareLink {
        ShareLink {
            id: "share-1".into(),
            url: "https://helix.example/s/share-1".into(),
            download_count,
            created_at: Utc::now(),
            expires_at,
            max_downloads: max,
        }
    }

    #[test]
    fn test_file_record_wire_format() {
        let json = r#"{
            "id": "f1",
            "transactionId": "abc",
            "mimeType": "text/plain",
            "size": 39,
            "isEncrypted": true,
            "encryptedName": "",
            "createdAt": "2026-01-02T03:04:05.000Z"
        }"#;
        let record: FileRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.transaction_id, "abc");
        assert_eq!(record.size, 39);
        // Present-but-empty stays distinguishable from absent
        assert_eq!(record.encrypted_name.as_deref(), Some(""));
        assert!(record.updated_at.is_none());

        let out = serde_json::to_value(&record).unwrap();
        assert_eq!(out["transactionId"], "abc");
        assert!(out.get("updatedAt").is_none());
    }

    #[test]
    fn test_file_record_absent_name() {
        let json = r#"{"id":"f2","transactionId":"t","mimeType":"a/b","size":1,
            "isEncrypted":false,"createdAt":"2026-01-02T03:04:05Z","encryptedName":null}"#;
        let record: FileRecord = serde_json::from_str(json).unwrap();
        assert!(record.encrypted_name.is_none());
    }

    #[test]
    fn test_share_link_download_count_defaults_to_zero() {
        let json = r#"{"id":"s","url":"u","createdAt":"2026-01-02T03:04:05Z"}"#;
        let link: ShareLink = serde_json::from_str(json).unwrap();
        assert_eq!(link.download_count, 0);
        assert!(link.max_downloads.is_none());
    }

    #[test]
    fn test_share_link_validity() {
        let now = Utc::now();

        assert!(share(0, None, None).is_usable(now));
        assert!(share(2, Some(3), None).is_usable(now));
        assert!(share(3, Some(3), None).is_exhausted());
        assert!(!share(3, Some(3), None).is_usable(now));

        let past = share(0, None, Some(now - Duration::seconds(1)));
        assert!(past.is_expired(now));
        assert!(!past.is_usable(now));

        let future = share(0, None, Some(now + Duration::hours(1)));
        assert!(!future.is_expired(now));
    }

    #[test]
    fn test_content_url() {
        assert_eq!(content_url("https://arweave.net", "tx"), "https://arweave.net/tx");
        assert_eq!(content_url("https://arweave.net/", "tx"), "https://arweave.net/tx");
    }

    #[test]
    fn test_upload_result_debug_hides_key() {
        let upload = UploadResult {
            transaction_id: "tx".into(),
            url: "https://arweave.net/tx".into(),
            file_id: "file-1".into(),
            encryption_key: Some("c2VjcmV0LWtleS1tYXRlcmlhbA==".into()),
        };
        let debug = format!("{upload:?}");
        assert!(debug.contains("file-1"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("c2VjcmV0"));
    }
}
