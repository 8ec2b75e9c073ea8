//! Per-artifact key store with JSON file backup
//!
//! The file format is a flat JSON object of artifact id → base64 key, sorted
//! by id:
//! ```json
//! {
//!   "bNbA3TEQVL60xlgCcqdz4ZPHFZ711cZ3hmkpGttDt_U": "q8VvV2m0...="
//! }
//! ```
//! The file is NOT encrypted. Callers that need encryption at rest must
//! protect it themselves.
//!
//! Mutation takes `&mut self`; sharing a store across threads requires
//! external locking.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::Path;

use helix_core::HelixResult;
use tracing::{debug, warn};

use crate::keys::{export_key, import_key, EncryptionKey};

#[derive(Debug, Default)]
pub struct KeyStore {
    keys: HashMap<String, EncryptionKey>,
}

impl KeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a key for an artifact, replacing any previous key.
    pub fn store(&mut self, id: impl Into<String>, key: EncryptionKey) {
        self.keys.insert(id.into(), key);
    }

    pub fn get(&self, id: &str) -> Option<&EncryptionKey> {
        self.keys.get(id)
    }

    /// Remove a key. Returns true if an entry existed.
    pub fn delete(&mut self, id: &str) -> bool {
        self.keys.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Stored artifact ids, sorted
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.keys.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Export every key as base64, sorted by id.
    pub fn export_all(&self) -> BTreeMap<String, String> {
        self.keys
            .iter()
            .map(|(id, key)| (id.clone(), export_key(key)))
            .collect()
    }

    /// Merge base64 keys into the store; imported entries win over existing ones.
    ///
    /// Every value is validated first, so a bad entry leaves the store unchanged.
    pub fn import_all<I, K, V>(&mut self, entries: I) -> HelixResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut decoded = Vec::new();
        for (id, encoded) in entries {
            let id = id.into();
            let key = import_key(encoded.as_ref()).inspect_err(|e| {
                debug!(id = %id, error = %e, "rejected key store entry");
            })?;
            decoded.push((id, key));
        }
        self.keys.extend(decoded);
        Ok(())
    }

    /// Write all keys to `path` as pretty JSON. The temp file is created
    /// owner-only, then renamed into place.
    pub fn save_to_file(&self, path: &Path) -> HelixResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&self.export_all())?;

        let tmp_path = path.with_extension("tmp");
        let written = write_private(&tmp_path, json.as_bytes())
            .and_then(|()| std::fs::rename(&tmp_path, path));
        if let Err(e) = written {
            if let Err(cleanup) = std::fs::remove_file(&tmp_path) {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    warn!(
                        path = %tmp_path.display(),
                        error = %cleanup,
                        "failed to remove temp file"
                    );
                }
            }
            return Err(e.into());
        }

        debug!(path = %path.display(), keys = self.keys.len(), "key store saved");
        Ok(())
    }

    /// Merge keys from a file written by `save_to_file`.
    pub fn load_from_file(&mut self, path: &Path) -> HelixResult<()> {
        let content = std::fs::read_to_string(path)?;
        let entries: BTreeMap<String, String> = serde_json::from_str(&content)?;
        let count = entries.len();
        self.import_all(entries)?;

        debug!(path = %path.display(), keys = count, "key store loaded");
        Ok(())
    }
}

/// Create `path` readable by the owner only and write `contents` to it. A
/// leftover file is removed first so its permissions are not inherited.
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    let mut opts = std::fs::OpenOptions::new();
    opts.create_new(true).write(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }

    let mut file = opts.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}
