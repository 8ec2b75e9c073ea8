//! reqwest backend for the hosted Helix API
//!
//! The underlying `reqwest::Client` is built on first use and shared by every
//! request until `close()` drops it.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use helix_core::config::ApiConfig;
use helix_core::types::{FileRecord, ShareLink};
use helix_core::{AuthError, HelixError, HelixResult, NetworkError};
use reqwest::{header, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::api::{
    CreateFileRequest, FileListResponse, HelixApi, NonceResponse, ShareRequest, ShareResponse,
    TokenResponse, UploadResponse, VerifyRequest,
};

pub struct HttpApi {
    base_url: String,
    gateway_url: String,
    timeout: Duration,
    client: Mutex<Option<Client>>,
}

impl HttpApi {
    /// Build a backend from `[api]` config.
    ///
    /// If `enforce_tls` is true and either endpoint uses HTTP, this returns an
    /// error. Otherwise, a warning is logged for non-HTTPS endpoints.
    pub fn new(config: &ApiConfig) -> HelixResult<Self> {
        for (label, url) in [("api", &config.base_url), ("gateway", &config.gateway_url)] {
            if url.starts_with("http://") {
                if config.enforce_tls {
                    return Err(HelixError::Config(format!(
                        "{label} endpoint uses plaintext HTTP ({url}), but enforce_tls is enabled. \
                         Use an HTTPS endpoint or set api.enforce_tls = false for local testing."
                    )));
                }
                tracing::warn!(
                    endpoint = %url,
                    "{label} endpoint uses plaintext HTTP: bearer tokens are sent unencrypted"
                );
            }
        }

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            gateway_url: config.gateway_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
            client: Mutex::new(None),
        })
    }

    /// Whether a connection pool is currently held
    pub fn is_open(&self) -> bool {
        self.client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn client(&self) -> HelixResult<Client> {
        let mut guard = self.client.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = guard.as_ref() {
            return Ok(client.clone());
        }

        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("building HTTP client: {e}"))?;
        tracing::debug!(base_url = %self.base_url, "HTTP client created");
        *guard = Some(client.clone());
        Ok(client)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorized(&self, builder: RequestBuilder, token: &str) -> RequestBuilder {
        builder.header(header::AUTHORIZATION, format!("Bearer {token}"))
    }
}

async fn send(builder: RequestBuilder) -> HelixResult<Response> {
    let response = builder
        .send()
        .await
        .map_err(|e| NetworkError::Unreachable(e.to_string()))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(NetworkError::HttpStatus {
        code: status.as_u16(),
        message,
    }
    .into())
}

async fn read_json<T: DeserializeOwned>(response: Response) -> HelixResult<T> {
    let body = response
        .bytes()
        .await
        .map_err(|e| NetworkError::Unreachable(e.to_string()))?;
    Ok(serde_json::from_slice(&body)?)
}

/// Sign-in rejections are reported as verification failures, not HTTP errors.
fn verification_rejection(err: HelixError) -> HelixError {
    match err {
        HelixError::Network(NetworkError::HttpStatus { code, message })
            if matches!(code, 400 | 401 | 403) =>
        {
            AuthError::VerificationFailed(format!("HTTP {code}: {message}")).into()
        }
        other => other,
    }
}

#[async_trait]
impl HelixApi for HttpApi {
    fn name(&self) -> &str {
        "http"
    }

    async fn request_nonce(&self, wallet: &str) -> HelixResult<String> {
        let client = self.client()?;
        let response = send(
            client
                .get(self.url("/api/auth/nonce"))
                .query(&[("wallet", wallet)]),
        )
        .await?;
        let body: NonceResponse = read_json(response).await?;
        Ok(body.nonce)
    }

    async fn verify_signature(&self, request: &VerifyRequest) -> HelixResult<String> {
        let client = self.client()?;
        let response = send(client.post(self.url("/api/auth/verify")).json(request))
            .await
            .map_err(verification_rejection)?;
        let body: TokenResponse = read_json(response).await?;
        Ok(body.token)
    }

    async fn upload_content(
        &self,
        token: &str,
        data: Vec<u8>,
        mime_type: &str,
    ) -> HelixResult<String> {
        let client = self.client()?;
        let builder = client
            .post(self.url("/api/upload"))
            .header(header::CONTENT_TYPE, mime_type)
            .body(data);
        let response = send(self.authorized(builder, token)).await?;
        let body: UploadResponse = read_json(response).await?;
        Ok(body.transaction_id)
    }

    async fn create_file_record(
        &self,
        token: &str,
        request: &CreateFileRequest,
    ) -> HelixResult<FileRecord> {
        let client = self.client()?;
        let builder = client.post(self.url("/api/files")).json(request);
        let response = send(self.authorized(builder, token)).await?;
        read_json(response).await
    }

    async fn list_files(
        &self,
        token: &str,
        page: u32,
        page_size: u32,
    ) -> HelixResult<Vec<FileRecord>> {
        let client = self.client()?;
        let builder = client
            .get(self.url("/api/files"))
            .query(&[("page", page), ("pageSize", page_size)]);
        let response = send(self.authorized(builder, token)).await?;
        let body: FileListResponse = read_json(response).await?;
        Ok(body.files)
    }

    async fn get_file(&self, token: &str, file_id: &str) -> HelixResult<FileRecord> {
        let client = self.client()?;
        let builder = client.get(self.url(&format!("/api/files/{file_id}")));
        let response = send(self.authorized(builder, token)).await?;
        read_json(response).await
    }

    async fn delete_file(&self, token: &str, file_id: &str) -> HelixResult<()> {
        let client = self.client()?;
        let builder = client.delete(self.url(&format!("/api/files/{file_id}")));
        send(self.authorized(builder, token)).await?;
        Ok(())
    }

    async fn create_share_link(
        &self,
        token: &str,
        request: &ShareRequest,
    ) -> HelixResult<ShareLink> {
        let client = self.client()?;
        let builder = client.post(self.url("/api/share")).json(request);
        let response = send(self.authorized(builder, token)).await?;
        let body: ShareResponse = read_json(response).await?;
        Ok(body.share_link)
    }

    async fn fetch_content(&self, transaction_id: &str) -> HelixResult<Vec<u8>> {
        let client = self.client()?;
        let response = send(client.get(format!("{}/{transaction_id}", self.gateway_url))).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| NetworkError::Unreachable(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    fn close(&self) {
        let mut guard = self.client.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.take().is_some() {
            tracing::debug!(base_url = %self.base_url, "HTTP client closed");
        }
    }
}
