//! Upload pipeline: encrypt, store, register
//!
//! ```text
//! plaintext ─┬─ encrypt? ──> envelope ── upload_content ──> transaction id
//!            └─ file name ─> encrypted name ─┐                  │
//!                                            └── create_file_record ──> FileRecord
//! ```
//!
//! Storage is permanent and registration is a separate call, so the pair is
//! not atomic: if registration fails the content stays stored without a
//! record. The transaction id is logged at warn level so it can be recovered.

use std::path::Path;
use std::sync::Arc;

use helix_core::config::expand_tilde;
use helix_core::types::{content_url, FileRecord, UploadResult};
use helix_core::validate::{
    validate_encrypted_name, validate_mime_type, validate_size, validate_transaction_id,
};
use helix_core::{HelixResult, ValidationError};
use helix_crypto::{
    decrypt, decrypt_string, encrypt, encrypt_string, export_key, generate_key, EncryptionKey,
};
use tracing::{debug, info, warn};

use crate::api::{CreateFileRequest, HelixApi};

/// MIME type used when the caller does not supply one
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

pub struct UploadPipeline {
    api: Arc<dyn HelixApi>,
    gateway_url: String,
    offload_threshold: usize,
}

impl UploadPipeline {
    /// `offload_threshold`: payloads of at least this many bytes are
    /// encrypted and decrypted on tokio's blocking pool.
    pub fn new(
        api: Arc<dyn HelixApi>,
        gateway_url: impl Into<String>,
        offload_threshold: usize,
    ) -> Self {
        Self {
            api,
            gateway_url: gateway_url.into(),
            offload_threshold,
        }
    }

    /// Upload `data` under `token`, encrypting it first when `encrypt` is set.
    ///
    /// For encrypted uploads a fresh key is generated per file and returned
    /// base64-encoded in `UploadResult::encryption_key`; it is not kept
    /// anywhere else.
    ///
    /// The registry's limits are checked before anything is stored:
    /// - empty payloads fail with `EmptyFile`, the registry requires a
    ///   non-zero size;
    /// - the encrypted name is capped at 256 bytes, which leaves room for
    ///   file names of roughly 164 bytes. Longer names fail with `TooLong`.
    ///
    /// If the backend records a different size than was uploaded the call
    /// fails with `SizeMismatch`, which still carries the `UploadResult`.
    pub async fn upload_bytes(
        &self,
        token: &str,
        data: Vec<u8>,
        filename: &str,
        mime_type: &str,
        encrypt: bool,
    ) -> HelixResult<UploadResult> {
        validate_mime_type(mime_type)?;

        let (payload, key, encrypted_name) = if encrypt {
            let key = generate_key();
            let payload = self.seal(data, &key).await?;
            let encrypted_name = encrypt_string(filename, &key)?;
            validate_encrypted_name(Some(&encrypted_name))?;
            (payload, Some(key), Some(encrypted_name))
        } else {
            (data, None, None)
        };

        let size = payload.len() as u64;
        validate_size(size)?;
        debug!(size, encrypted = encrypt, mime_type, "uploading content");

        let transaction_id = self.api.upload_content(token, payload, mime_type).await?;

        let request = CreateFileRequest {
            transaction_id: transaction_id.clone(),
            encrypted_name,
            mime_type: mime_type.to_string(),
            size,
            is_encrypted: encrypt,
        };
        let record = match self.register(token, &request).await {
            Ok(record) => record,
            Err(e) => {
                warn!(
                    transaction_id = %transaction_id,
                    error = %e,
                    "content stored but file registration failed; content has no record"
                );
                return Err(e);
            }
        };

        let upload = UploadResult {
            url: content_url(&self.gateway_url, &transaction_id),
            transaction_id,
            file_id: record.id,
            encryption_key: key.as_ref().map(export_key),
        };

        if record.size != size {
            warn!(
                transaction_id = %upload.transaction_id,
                file_id = %upload.file_id,
                uploaded = size,
                recorded = record.size,
                "backend recorded a different size than was uploaded"
            );
            return Err(ValidationError::SizeMismatch {
                uploaded: size,
                recorded: record.size,
                upload: Box::new(upload),
            }
            .into());
        }

        info!(
            transaction_id = %upload.transaction_id,
            file_id = %upload.file_id,
            size,
            encrypted = encrypt,
            "upload complete"
        );

        Ok(upload)
    }

    /// Read `path` and upload it under its file name. Without an explicit MIME
    /// type the content is labelled `application/octet-stream`.
    pub async fn upload_file(
        &self,
        token: &str,
        path: &Path,
        encrypt: bool,
        mime_type: Option<&str>,
    ) -> HelixResult<UploadResult> {
        let path = expand_tilde(path);
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                ValidationError::MalformedInput(format!(
                    "path has no UTF-8 file name: {}",
                    path.display()
                ))
            })?
            .to_string();
        let data = tokio::fs::read(&path).await?;

        self.upload_bytes(
            token,
            data,
            &filename,
            mime_type.unwrap_or(DEFAULT_MIME_TYPE),
            encrypt,
        )
        .await
    }

    /// Fetch stored bytes, decrypting them when a key is given. A wrong key
    /// or altered content fails with `AuthenticationFailed`.
    pub async fn download(
        &self,
        transaction_id: &str,
        key: Option<&EncryptionKey>,
    ) -> HelixResult<Vec<u8>> {
        let data = self.api.fetch_content(transaction_id).await?;
        debug!(transaction_id, size = data.len(), "content fetched");

        match key {
            Some(key) => self.open(data, key).await,
            None => Ok(data),
        }
    }

    async fn register(
        &self,
        token: &str,
        request: &CreateFileRequest,
    ) -> HelixResult<FileRecord> {
        validate_transaction_id(&request.transaction_id)?;
        self.api.create_file_record(token, request).await
    }

    async fn seal(&self, data: Vec<u8>, key: &EncryptionKey) -> HelixResult<Vec<u8>> {
        if data.len() < self.offload_threshold {
            return encrypt(&data, key);
        }
        let key = key.clone();
        tokio::task::spawn_blocking(move || encrypt(&data, &key))
            .await
            .map_err(|e| anyhow::anyhow!("encryption task failed: {e}"))?
    }

    async fn open(&self, data: Vec<u8>, key: &EncryptionKey) -> HelixResult<Vec<u8>> {
        if data.len() < self.offload_threshold {
            return decrypt(&data, key);
        }
        let key = key.clone();
        tokio::task::spawn_blocking(move || decrypt(&data, &key))
            .await
            .map_err(|e| anyhow::anyhow!("decryption task failed: {e}"))?
    }
}

/// Recover the original file name of an encrypted upload. Returns `None` for
/// records stored without a name.
pub fn decrypt_file_name(record: &FileRecord, key: &EncryptionKey) -> HelixResult<Option<String>> {
    record
        .encrypted_name
        .as_deref()
        .map(|name| decrypt_string(name, key))
        .transpose()
}
