//! Wallet sign-in session
//!
//! ```text
//! Unauthenticated --request_challenge--> ChallengeIssued --respond--> Authenticated
//!        ^                                     |                          |
//!        +------------- any failure -----------+---- logout / HTTP 401 ---+
//! ```
//!
//! Every transition is a single write of the whole `AuthState` under the lock,
//! so readers never observe a half-replaced token.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine};
use helix_core::{AuthError, HelixResult};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::api::{HelixApi, VerifyRequest};
use crate::wallet::{sign_in_message, WalletSigner};

#[derive(Clone, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    /// A nonce has been issued and not yet answered
    ChallengeIssued { nonce: String },
    Authenticated { token: String },
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => f.write_str("Unauthenticated"),
            Self::ChallengeIssued { nonce } => f
                .debug_struct("ChallengeIssued")
                .field("nonce", nonce)
                .finish(),
            Self::Authenticated { .. } => f
                .debug_struct("Authenticated")
                .field("token", &"[REDACTED]")
                .finish(),
        }
    }
}

pub struct AuthSession {
    api: Arc<dyn HelixApi>,
    signer: Arc<dyn WalletSigner>,
    state: RwLock<AuthState>,
}

impl AuthSession {
    pub fn new(api: Arc<dyn HelixApi>, signer: Arc<dyn WalletSigner>) -> Self {
        Self {
            api,
            signer,
            state: RwLock::new(AuthState::Unauthenticated),
        }
    }

    pub fn wallet_address(&self) -> String {
        self.signer.address()
    }

    pub async fn state(&self) -> AuthState {
        self.state.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        matches!(*self.state.read().await, AuthState::Authenticated { .. })
    }

    /// Fetch a nonce for this wallet. Any token held so far is discarded.
    pub async fn request_challenge(&self) -> HelixResult<String> {
        let wallet = self.signer.address();
        match self.api.request_nonce(&wallet).await {
            Ok(nonce) => {
                debug!(wallet = %wallet, "sign-in challenge issued");
                *self.state.write().await = AuthState::ChallengeIssued {
                    nonce: nonce.clone(),
                };
                Ok(nonce)
            }
            Err(e) => {
                *self.state.write().await = AuthState::Unauthenticated;
                Err(e)
            }
        }
    }

    /// Sign the outstanding nonce and exchange it for a bearer token.
    ///
    /// The nonce is consumed up front: on any failure the session is left
    /// `Unauthenticated` and a fresh challenge is needed.
    pub async fn respond(&self) -> HelixResult<()> {
        let nonce = {
            let mut state = self.state.write().await;
            match std::mem::replace(&mut *state, AuthState::Unauthenticated) {
                AuthState::ChallengeIssued { nonce } => nonce,
                _ => {
                    return Err(
                        AuthError::VerificationFailed("no outstanding challenge".into()).into(),
                    )
                }
            }
        };

        let wallet = self.signer.address();
        let signature = self.signer.sign_message(sign_in_message(&nonce).as_bytes());
        let request = VerifyRequest {
            wallet: wallet.clone(),
            signature: STANDARD.encode(signature),
            nonce,
        };

        match self.api.verify_signature(&request).await {
            Ok(token) => {
                *self.state.write().await = AuthState::Authenticated { token };
                info!(wallet = %wallet, backend = self.api.name(), "authenticated");
                Ok(())
            }
            Err(e) => {
                warn!(wallet = %wallet, error = %e, "sign-in rejected");
                Err(e)
            }
        }
    }

    /// `request_challenge` followed by `respond`.
    pub async fn authenticate(&self) -> HelixResult<()> {
        self.request_challenge().await?;
        self.respond().await
    }

    /// The current bearer token.
    pub async fn token(&self) -> HelixResult<String> {
        match &*self.state.read().await {
            AuthState::Authenticated { token } => Ok(token.clone()),
            _ => Err(AuthError::NotAuthenticated.into()),
        }
    }

    pub async fn logout(&self) {
        *self.state.write().await = AuthState::Unauthenticated;
        debug!("logged out");
    }

    /// Drop `token` after the backend rejected it. A token that has already
    /// been replaced by a newer sign-in is left alone.
    pub async fn invalidate(&self, token: &str) {
        let mut state = self.state.write().await;
        if matches!(&*state, AuthState::Authenticated { token: current } if current == token) {
            *state = AuthState::Unauthenticated;
            warn!("bearer token rejected by backend; session invalidated");
        }
    }
}
