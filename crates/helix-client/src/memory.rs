//! In-process Helix backend
//!
//! Implements the same contract as the hosted API: nonces are single-use,
//! sign-in signatures are verified against the wallet address, records are
//! scoped to the wallet that created them, and unknown tokens are answered
//! with HTTP 401. Content ids are 43-character base64url strings like the
//! permanent store issues.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use chrono::Utc;
use helix_core::types::{FileRecord, ShareLink};
use helix_core::{AuthError, HelixResult, NetworkError};
use rand::RngCore;

use crate::api::{CreateFileRequest, HelixApi, ShareRequest, VerifyRequest};
use crate::wallet::verify_sign_in;

const SHARE_BASE_URL: &str = "memory://helix/share";

#[derive(Default)]
struct State {
    /// nonce -> wallet it was issued for
    nonces: HashMap<String, String>,
    /// token -> wallet
    tokens: HashMap<String, String>,
    content: HashMap<String, Vec<u8>>,
    /// (owner wallet, record), in creation order
    records: Vec<(String, FileRecord)>,
    shares: Vec<ShareLink>,
    next_id: u64,
}

impl State {
    fn wallet_for(&self, token: &str) -> HelixResult<String> {
        self.tokens.get(token).cloned().ok_or_else(|| {
            NetworkError::HttpStatus {
                code: 401,
                message: "invalid or expired token".into(),
            }
            .into()
        })
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn record_index(&self, wallet: &str, file_id: &str) -> HelixResult<usize> {
        self.records
            .iter()
            .position(|(owner, record)| owner == wallet && record.id == file_id)
            .ok_or_else(|| not_found(file_id))
    }
}

fn not_found(what: &str) -> helix_core::HelixError {
    NetworkError::HttpStatus {
        code: 404,
        message: format!("not found: {what}"),
    }
    .into()
}

fn random_id(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[derive(Default)]
pub struct MemoryApi {
    state: Mutex<State>,
}

impl MemoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stored bytes for a content id, exactly as uploaded
    pub fn stored_content(&self, transaction_id: &str) -> Option<Vec<u8>> {
        self.state().content.get(transaction_id).cloned()
    }

    /// Number of stored content blobs, including ones whose record was deleted
    pub fn content_count(&self) -> usize {
        self.state().content.len()
    }

    /// Invalidate every issued token, as a server-side session expiry would.
    pub fn revoke_tokens(&self) {
        self.state().tokens.clear();
    }
}

#[async_trait]
impl HelixApi for MemoryApi {
    fn name(&self) -> &str {
        "memory"
    }

    async fn request_nonce(&self, wallet: &str) -> HelixResult<String> {
        let nonce = random_id(16);
        self.state().nonces.insert(nonce.clone(), wallet.to_string());
        Ok(nonce)
    }

    async fn verify_signature(&self, request: &VerifyRequest) -> HelixResult<String> {
        let mut state = self.state();

        // Consumed whether or not the signature checks out
        let issued_for = state.nonces.remove(&request.nonce);
        if issued_for.as_deref() != Some(request.wallet.as_str()) {
            return Err(AuthError::VerificationFailed("unknown or reused nonce".into()).into());
        }

        let signature = STANDARD.decode(&request.signature).map_err(|e| {
            AuthError::VerificationFailed(format!("signature is not base64: {e}"))
        })?;
        verify_sign_in(&request.wallet, &request.nonce, &signature)?;

        let token = random_id(32);
        state.tokens.insert(token.clone(), request.wallet.clone());
        Ok(token)
    }

    async fn upload_content(
        &self,
        token: &str,
        data: Vec<u8>,
        _mime_type: &str,
    ) -> HelixResult<String> {
        let mut state = self.state();
        state.wallet_for(token)?;

        let transaction_id = random_id(32);
        state.content.insert(transaction_id.clone(), data);
        Ok(transaction_id)
    }

    async fn create_file_record(
        &self,
        token: &str,
        request: &CreateFileRequest,
    ) -> HelixResult<FileRecord> {
        let mut state = self.state();
        let wallet = state.wallet_for(token)?;
        if !state.content.contains_key(&request.transaction_id) {
            return Err(not_found(&request.transaction_id));
        }

        let record = FileRecord {
            id: state.next_id("file"),
            transaction_id: request.transaction_id.clone(),
            mime_type: request.mime_type.clone(),
            size: request.size,
            is_encrypted: request.is_encrypted,
            encrypted_name: request.encrypted_name.clone(),
            created_at: Utc::now(),
            updated_at: None,
        };
        state.records.push((wallet, record.clone()));
        Ok(record)
    }

    async fn list_files(
        &self,
        token: &str,
        page: u32,
        page_size: u32,
    ) -> HelixResult<Vec<FileRecord>> {
        let state = self.state();
        let wallet = state.wallet_for(token)?;

        let skip = page.saturating_sub(1) as usize * page_size as usize;
        Ok(state
            .records
            .iter()
            .filter(|(owner, _)| *owner == wallet)
            .map(|(_, record)| record.clone())
            .skip(skip)
            .take(page_size as usize)
            .collect())
    }

    async fn get_file(&self, token: &str, file_id: &str) -> HelixResult<FileRecord> {
        let state = self.state();
        let wallet = state.wallet_for(token)?;
        let index = state.record_index(&wallet, file_id)?;
        Ok(state.records[index].1.clone())
    }

    async fn delete_file(&self, token: &str, file_id: &str) -> HelixResult<()> {
        let mut state = self.state();
        let wallet = state.wallet_for(token)?;
        let index = state.record_index(&wallet, file_id)?;
        state.records.remove(index);
        Ok(())
    }

    async fn create_share_link(
        &self,
        token: &str,
        request: &ShareRequest,
    ) -> HelixResult<ShareLink> {
        let mut state = self.state();
        let wallet = state.wallet_for(token)?;
        state.record_index(&wallet, &request.file_id)?;

        let id = state.next_id("share");
        let link = ShareLink {
            url: format!("{SHARE_BASE_URL}/{id}"),
            id,
            download_count: 0,
            created_at: Utc::now(),
            expires_at: request.expires_at,
            max_downloads: request.max_downloads,
        };
        state.shares.push(link.clone());
        Ok(link)
    }

    async fn fetch_content(&self, transaction_id: &str) -> HelixResult<Vec<u8>> {
        self.stored_content(transaction_id)
            .ok_or_else(|| not_found(transaction_id))
    }
}
