//! helix-client: wallet-authenticated access to Helix storage
//!
//! - `api`: the `HelixApi` backend trait and its wire types
//! - `http`: reqwest backend for the hosted Helix API and content gateway
//! - `memory`: in-process backend with the same contract, for tests and offline use
//! - `wallet`: Ed25519 wallet signer and the sign-in message format
//! - `auth`: nonce challenge / signature / bearer token session
//! - `pipeline`: encrypt, upload, register; fetch and decrypt
//! - `client`: `HelixClient`, tying the pieces together
//! - `health`: reachability probe

pub mod api;
pub mod auth;
pub mod client;
pub mod health;
pub mod http;
pub mod memory;
pub mod pipeline;
pub mod wallet;

pub use api::HelixApi;
pub use auth::{AuthSession, AuthState};
pub use client::HelixClient;
pub use health::{check_health, is_healthy};
pub use http::HttpApi;
pub use memory::MemoryApi;
pub use pipeline::UploadPipeline;
pub use wallet::{Keypair, WalletSigner};
