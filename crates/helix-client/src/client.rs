//! `HelixClient`: one wallet identity against one backend
//!
//! Record and share operations require a completed sign-in. When the backend
//! answers an authenticated call with 401 the session drops its token, and
//! the caller must `authenticate()` again.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use helix_core::config::HelixConfig;
use helix_core::types::{FileRecord, ShareLink, ShareOptions, UploadResult};
use helix_core::validate::validate_share;
use helix_core::HelixResult;
use helix_crypto::{derive_key_from_password, generate_salt, import_key, EncryptionKey};
use secrecy::SecretString;
use tracing::info;

use crate::api::{HelixApi, ShareRequest};
use crate::auth::AuthSession;
use crate::http::HttpApi;
use crate::pipeline::{self, UploadPipeline};
use crate::wallet::{Keypair, WalletSigner};

pub struct HelixClient {
    config: HelixConfig,
    api: Arc<dyn HelixApi>,
    auth: AuthSession,
    pipeline: UploadPipeline,
}

impl HelixClient {
    /// Client for the hosted API described by `config.api`.
    pub fn new(config: HelixConfig, signer: Arc<dyn WalletSigner>) -> HelixResult<Self> {
        let api = Arc::new(HttpApi::new(&config.api)?);
        Ok(Self::with_api(config, api, signer))
    }

    /// Client signing with the keypair file at `config.wallet.keypair_path`.
    pub fn from_keypair_file(config: HelixConfig) -> HelixResult<Self> {
        let keypair = Keypair::from_keypair_file(&config.wallet.keypair_path)?;
        Self::new(config, Arc::new(keypair))
    }

    /// Client over any backend.
    pub fn with_api(
        config: HelixConfig,
        api: Arc<dyn HelixApi>,
        signer: Arc<dyn WalletSigner>,
    ) -> Self {
        let auth = AuthSession::new(api.clone(), signer);
        let pipeline = UploadPipeline::new(
            api.clone(),
            config.api.gateway_url.clone(),
            config.crypto.offload_threshold_bytes,
        );
        Self {
            config,
            api,
            auth,
            pipeline,
        }
    }

    pub fn config(&self) -> &HelixConfig {
        &self.config
    }

    pub fn wallet_address(&self) -> String {
        self.auth.wallet_address()
    }

    pub fn session(&self) -> &AuthSession {
        &self.auth
    }

    pub async fn authenticate(&self) -> HelixResult<()> {
        self.auth.authenticate().await
    }

    pub async fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated().await
    }

    pub async fn logout(&self) {
        self.auth.logout().await;
    }

    /// Upload bytes. `encrypt: None` follows `crypto.encrypt_by_default`.
    pub async fn upload_bytes(
        &self,
        data: Vec<u8>,
        filename: &str,
        mime_type: &str,
        encrypt: Option<bool>,
    ) -> HelixResult<UploadResult> {
        let encrypt = encrypt.unwrap_or(self.config.crypto.encrypt_by_default);
        self.authorized(|token| async move {
            self.pipeline
                .upload_bytes(&token, data, filename, mime_type, encrypt)
                .await
        })
        .await
    }

    /// Upload a file from disk. `encrypt: None` follows
    /// `crypto.encrypt_by_default`; `mime_type: None` uploads as
    /// `application/octet-stream`.
    pub async fn upload_file(
        &self,
        path: &Path,
        encrypt: Option<bool>,
        mime_type: Option<&str>,
    ) -> HelixResult<UploadResult> {
        let encrypt = encrypt.unwrap_or(self.config.crypto.encrypt_by_default);
        self.authorized(|token| async move {
            self.pipeline
                .upload_file(&token, path, encrypt, mime_type)
                .await
        })
        .await
    }

    /// Download content by transaction id, decrypting with a base64 key when
    /// one is given. Needs no sign-in.
    pub async fn download_file(
        &self,
        transaction_id: &str,
        encryption_key: Option<&str>,
    ) -> HelixResult<Vec<u8>> {
        let key = encryption_key.map(import_key).transpose()?;
        self.pipeline.download(transaction_id, key.as_ref()).await
    }

    /// List this wallet's records. `page` is 1-indexed.
    pub async fn list_files(&self, page: u32, page_size: u32) -> HelixResult<Vec<FileRecord>> {
        self.authorized(|token| async move { self.api.list_files(&token, page, page_size).await })
            .await
    }

    pub async fn get_file(&self, file_id: &str) -> HelixResult<FileRecord> {
        self.authorized(|token| async move { self.api.get_file(&token, file_id).await })
            .await
    }

    /// Delete a record. The content itself is permanent and stays retrievable
    /// by transaction id.
    pub async fn delete_file(&self, file_id: &str) -> HelixResult<()> {
        self.authorized(|token| async move { self.api.delete_file(&token, file_id).await })
            .await?;
        info!(file_id, "file record deleted");
        Ok(())
    }

    /// Create a share link after checking the options locally.
    pub async fn create_share_link(
        &self,
        file_id: &str,
        options: ShareOptions,
    ) -> HelixResult<ShareLink> {
        validate_share(
            options.expires_at,
            options.max_downloads,
            options.encrypted_key.as_deref(),
            Utc::now(),
        )?;
        let request = ShareRequest {
            file_id: file_id.to_string(),
            expires_at: options.expires_at,
            max_downloads: options.max_downloads,
            encrypted_key: options.encrypted_key,
        };
        let link = self
            .authorized(|token| async move { self.api.create_share_link(&token, &request).await })
            .await?;
        info!(file_id, share_id = %link.id, "share link created");
        Ok(link)
    }

    /// Recover the original name of an encrypted upload from its base64 key.
    pub fn decrypt_file_name(
        &self,
        record: &FileRecord,
        encryption_key: &str,
    ) -> HelixResult<Option<String>> {
        let key = import_key(encryption_key)?;
        pipeline::decrypt_file_name(record, &key)
    }

    /// Derive a key from a password with the configured PBKDF2 iterations.
    pub fn derive_key(&self, password: &SecretString, salt: &[u8]) -> HelixResult<EncryptionKey> {
        derive_key_from_password(password, salt, self.config.crypto.pbkdf2_iterations)
    }

    /// Random salt of the configured length
    pub fn generate_salt(&self) -> Vec<u8> {
        generate_salt(self.config.crypto.salt_length)
    }

    /// Release the backend's connections. The client stays usable.
    pub fn close(&self) {
        self.api.close();
    }

    async fn authorized<T, F, Fut>(&self, operation: F) -> HelixResult<T>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = HelixResult<T>>,
    {
        let token = self.auth.token().await?;
        let result = operation(token.clone()).await;
        if let Err(e) = &result {
            if e.is_unauthorized() {
                self.auth.invalidate(&token).await;
            }
        }
        result
    }
}

impl Drop for HelixClient {
    fn drop(&mut self) {
        self.api.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryApi;
    use helix_core::{AuthError, HelixError, ValidationError};

    fn client() -> HelixClient {
        HelixClient::with_api(
            HelixConfig::default(),
            Arc::new(MemoryApi::new()),
            Arc::new(Keypair::generate()),
        )
    }

    #[tokio::test]
    async fn test_operations_require_authentication() {
        let client = client();

        assert!(matches!(
            client.list_files(1, 20).await,
            Err(HelixError::Auth(AuthError::NotAuthenticated))
        ));
        assert!(matches!(
            client.upload_bytes(b"x".to_vec(), "x.txt", "text/plain", None).await,
            Err(HelixError::Auth(AuthError::NotAuthenticated))
        ));
    }

    #[tokio::test]
    async fn test_share_validation_before_network() {
        let client = client();

        // Validation errors surface even without a session
        let result = client
            .create_share_link(
                "file-1",
                ShareOptions {
                    max_downloads: Some(0),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(
            result,
            Err(HelixError::Validation(ValidationError::InvalidMaxDownloads))
        ));
    }

    #[test]
    fn test_derive_key_uses_configured_iterations() {
        let mut config = HelixConfig::default();
        config.crypto.pbkdf2_iterations = 1;
        config.crypto.salt_length = 24;
        let client = HelixClient::with_api(
            config,
            Arc::new(MemoryApi::new()),
            Arc::new(Keypair::generate()),
        );

        let password = SecretString::from("pw");
        let salt = client.generate_salt();
        assert_eq!(salt.len(), 24);
        assert_eq!(
            client.derive_key(&password, &salt).unwrap(),
            derive_key_from_password(&password, &salt, 1).unwrap()
        );
    }
}
