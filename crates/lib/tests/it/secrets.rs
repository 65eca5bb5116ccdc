//! Tests for the device credential store through the `CredentialStore` trait.

use hushnote::secrets::{CredentialStore, FileCredentialStore, InMemoryCredentialStore};

#[tokio::test]
async fn test_file_store_round_trip_across_instances() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = FileCredentialStore::new(dir.path());
        store.save_secret("derived_key", "deadbeef").await.unwrap();
    }

    // A new instance over the same directory sees the persisted secret
    let store = FileCredentialStore::new(dir.path());
    assert_eq!(
        store.get_secret("derived_key").await.unwrap(),
        Some("deadbeef".to_string())
    );
}

#[tokio::test]
async fn test_file_store_corruption_is_evicted_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCredentialStore::new(dir.path());
    store.save_secret("derived_key", "deadbeef").await.unwrap();

    // Flip bytes underneath the store
    let entry = std::fs::read_dir(dir.path())
        .unwrap()
        .next()
        .unwrap()
        .unwrap()
        .path();
    std::fs::write(&entry, "garbage-without-checksum").unwrap();

    // First read reports corruption and evicts; the entry no longer jams reads
    let err = store.get_secret("derived_key").await.unwrap_err();
    assert!(err.is_corrupt_credential());
    assert_eq!(store.get_secret("derived_key").await.unwrap(), None);
}

#[tokio::test]
async fn test_memory_store_matches_trait_contract() {
    let store = InMemoryCredentialStore::new();

    assert_eq!(store.get_secret("missing").await.unwrap(), None);

    store.save_secret("name", "value").await.unwrap();
    assert_eq!(
        store.get_secret("name").await.unwrap(),
        Some("value".to_string())
    );

    store.delete_secret("name").await.unwrap();
    assert_eq!(store.get_secret("name").await.unwrap(), None);
}
