use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{HelixError, HelixResult};

/// Top-level client configuration (loaded from helix.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HelixConfig {
    pub api: ApiConfig,
    pub wallet: WalletConfig,
    pub crypto: CryptoConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Helix API base URL
    pub base_url: String,
    /// Content gateway used for downloads and retrieval URLs
    pub gateway_url: String,
    /// Per-request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// Reject plaintext HTTP endpoints instead of warning
    pub enforce_tls: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Path to a 64-byte JSON array keypair file
    pub keypair_path: PathBuf,
}

/// Client-side encryption configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoConfig {
    /// Encrypt uploads unless the caller opts out (default: true)
    pub encrypt_by_default: bool,
    /// PBKDF2-HMAC-SHA256 iterations for password-derived keys (default: 100000)
    pub pbkdf2_iterations: u32,
    /// Salt length in bytes for password-derived keys (default: 16)
    pub salt_length: usize,
    /// Payloads at or above this size are encrypted on the blocking pool
    pub offload_threshold_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or EnvFilter directive (default: info)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

impl HelixConfig {
    /// Load configuration from a TOML file, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> HelixResult<Self> {
        if !path.exists() {
            tracing::warn!(
                "config file not found: {}  (using defaults)",
                path.display()
            );
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
            .map_err(|e| HelixError::Config(format!("parsing {}: {e}", path.display())))
    }

    pub fn from_toml(content: &str) -> HelixResult<Self> {
        toml::from_str(content).map_err(|e| HelixError::Config(e.to_string()))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://heyx-production.up.railway.app".into(),
            gateway_url: "https://arweave.net".into(),
            timeout_secs: 30,
            enforce_tls: false,
        }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            keypair_path: PathBuf::from("~/.config/solana/id.json"),
        }
    }
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            encrypt_by_default: true,
            pbkdf2_iterations: 100_000,
            salt_length: 16,
            offload_threshold_bytes: 1024 * 1024,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

/// Expand `~` in path to the user's home directory
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(rest) = path.to_str().and_then(|s| s.strip_prefix("~/")) {
        let home = std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"));
        return home.join(rest);
    }
    path.to_path_buf()
}
