//! Backend abstraction for the Helix API
//!
//! Every request that touches a wallet's records carries the bearer token
//! issued by `verify_signature`. Content retrieval goes through the public
//! gateway and needs no token.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use helix_core::types::{FileRecord, ShareLink};
use helix_core::HelixResult;
use serde::{Deserialize, Serialize};

/// Trait for Helix API backends.
///
/// Implementations map backend rejections of a sign-in onto
/// `AuthError::VerificationFailed` and any other non-success status onto
/// `NetworkError::HttpStatus`, so that a 401 on an authenticated call can be
/// told apart from a transport failure.
#[async_trait]
pub trait HelixApi: Send + Sync {
    /// Human-readable backend name for logs
    fn name(&self) -> &str;

    /// Fetch a single-use sign-in nonce for `wallet`.
    async fn request_nonce(&self, wallet: &str) -> HelixResult<String>;

    /// Submit a signed nonce. Returns the bearer token.
    async fn verify_signature(&self, request: &VerifyRequest) -> HelixResult<String>;

    /// Store raw bytes permanently. Returns the content (transaction) id.
    async fn upload_content(
        &self,
        token: &str,
        data: Vec<u8>,
        mime_type: &str,
    ) -> HelixResult<String>;

    async fn create_file_record(
        &self,
        token: &str,
        request: &CreateFileRequest,
    ) -> HelixResult<FileRecord>;

    /// List records, `page` is 1-indexed.
    async fn list_files(
        &self,
        token: &str,
        page: u32,
        page_size: u32,
    ) -> HelixResult<Vec<FileRecord>>;

    async fn get_file(&self, token: &str, file_id: &str) -> HelixResult<FileRecord>;

    /// Remove a record. The stored content is permanent and stays retrievable.
    async fn delete_file(&self, token: &str, file_id: &str) -> HelixResult<()>;

    async fn create_share_link(
        &self,
        token: &str,
        request: &ShareRequest,
    ) -> HelixResult<ShareLink>;

    /// Fetch stored bytes by content id from the gateway.
    async fn fetch_content(&self, transaction_id: &str) -> HelixResult<Vec<u8>>;

    /// Release pooled connections. Later calls reconnect.
    fn close(&self) {}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NonceResponse {
    pub nonce: String,
}

/// Body of `POST /api/auth/verify`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyRequest {
    /// Base58 wallet address
    pub wallet: String,
    /// Base64 Ed25519 signature over the sign-in message
    pub signature: String,
    pub nonce: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub transaction_id: String,
}

/// Body of `POST /api/files`. `encrypted_name` is sent as `null` when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFileRequest {
    pub transaction_id: String,
    pub encrypted_name: Option<String>,
    pub mime_type: String,
    /// Byte count of the stored (possibly encrypted) content
    pub size: u64,
    pub is_encrypted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileListResponse {
    pub files: Vec<FileRecord>,
}

/// Body of `POST /api/share`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    pub file_id: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_downloads: Option<u32>,
    pub encrypted_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareResponse {
    pub share_link: ShareLink,
}
