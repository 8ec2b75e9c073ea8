//! helix-core: types shared by every Helix client crate
//!
//! - `error`: the error taxonomy surfaced to callers
//! - `config`: `helix.toml` schema
//! - `types`: file records, share links, upload results (camelCase on the wire)
//! - `validate`: registry-side input rules, checked before any network call
//! - `logging`: tracing subscriber setup

pub mod config;
pub mod error;
pub mod logging;
pub mod types;
pub mod validate;

pub use error::{
    AuthError, CryptoError, HelixError, HelixResult, NetworkError, ValidationError,
};
