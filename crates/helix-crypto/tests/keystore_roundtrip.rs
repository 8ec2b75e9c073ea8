//! Key store export/import and file persistence.

use helix_crypto::{export_key, generate_key, import_key, KeyStore};
use tempfile::TempDir;

fn populated_store(n: usize) -> KeyStore {
    let mut store = KeyStore::new();
    for i in 0..n {
        store.store(format!("artifact-{i}"), generate_key());
    }
    store
}

#[test]
fn export_import_reproduces_mapping() {
    let original = populated_store(8);

    let mut restored = KeyStore::new();
    restored.import_all(original.export_all()).unwrap();

    assert_eq!(restored.export_all(), original.export_all());
    for id in original.ids() {
        assert_eq!(restored.get(id), original.get(id));
    }
}

#[test]
fn save_then_load_into_fresh_store() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("keys/helix-keys.json");
    let original = populated_store(5);

    original.save_to_file(&path).unwrap();

    let mut loaded = KeyStore::new();
    loaded.load_from_file(&path).unwrap();

    assert_eq!(loaded.export_all(), original.export_all());
}

#[test]
fn saved_file_is_flat_base64_mapping() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("keys.json");

    let key = generate_key();
    let mut store = KeyStore::new();
    store.store("tx-abc", key.clone());
    store.save_to_file(&path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let parsed: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(&content).unwrap();

    assert_eq!(parsed.len(), 1);
    let encoded = parsed["tx-abc"].as_str().unwrap();
    assert_eq!(encoded, export_key(&key));
    assert_eq!(import_key(encoded).unwrap(), key);
}

#[test]
fn empty_store_roundtrip() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("empty.json");

    KeyStore::new().save_to_file(&path).unwrap();

    let mut loaded = KeyStore::new();
    loaded.load_from_file(&path).unwrap();
    assert!(loaded.is_empty());
}

#[test]
fn load_merges_into_existing_entries() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("keys.json");

    let mut on_disk = KeyStore::new();
    let disk_key = generate_key();
    on_disk.store("shared", disk_key.clone());
    on_disk.save_to_file(&path).unwrap();

    let mut store = KeyStore::new();
    store.store("shared", generate_key());
    store.store("local-only", generate_key());
    store.load_from_file(&path).unwrap();

    assert_eq!(store.len(), 2);
    assert_eq!(store.get("shared"), Some(&disk_key));
}

#[test]
fn load_missing_file_is_io_error() {
    let tmp = TempDir::new().unwrap();
    let mut store = KeyStore::new();
    let result = store.load_from_file(&tmp.path().join("absent.json"));
    assert!(matches!(result, Err(helix_core::HelixError::Io(_))));
}

#[cfg(unix)]
#[test]
fn saved_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("keys.json");
    let stale = tmp.path().join("keys.tmp");
    std::fs::write(&stale, "{}").unwrap();
    std::fs::set_permissions(&stale, std::fs::Permissions::from_mode(0o644)).unwrap();

    populated_store(2).save_to_file(&path).unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
    assert!(!stale.exists());
}

#[test]
fn failed_save_leaves_no_temp_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("keys.json");
    std::fs::create_dir(&path).unwrap();
    std::fs::write(path.join("occupied"), "x").unwrap();

    let result = populated_store(2).save_to_file(&path);

    assert!(matches!(result, Err(helix_core::HelixError::Io(_))));
    assert!(!tmp.path().join("keys.tmp").exists());
    assert!(path.is_dir());
}
