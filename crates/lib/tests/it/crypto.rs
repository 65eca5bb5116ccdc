//! Tests for salt generation, key derivation, the ciphertext codec, and the
//! decryption cache, exercised through the public API.

use std::collections::HashSet;
use std::sync::Arc;

use hushnote::{
    CipherCodec, CipherText, DecryptOutcome, DecryptionCache, DerivedKey, derive_key,
    generate_salt,
};

#[test]
fn test_derive_key_is_deterministic() {
    let a = derive_key("OldPw1", "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
    let b = derive_key("OldPw1", "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
    assert_eq!(a, b);
    assert_eq!(a.as_str().len(), 64);
}

#[test]
fn test_salt_distinctness_over_many_calls() {
    let salts: HashSet<String> = (0..1000).map(|_| generate_salt()).collect();
    assert_eq!(salts.len(), 1000);
    for salt in &salts {
        assert_eq!(salt.len(), 32);
        assert!(salt.chars().all(|c| c.is_ascii_hexdigit()));
    }
}

#[test]
fn test_round_trip_strong_path() {
    let codec = CipherCodec::new();
    let key = derive_key("pw", &generate_salt());

    for plaintext in ["meet at noon", "", "multi\nline\ntext", "émoji ☀️"] {
        let ciphertext = codec.encrypt_text(plaintext, &key);
        assert!(matches!(ciphertext, CipherText::Strong(_)));
        assert_eq!(codec.decrypt_text(&ciphertext.to_string(), &key), plaintext);
    }
}

#[test]
fn test_wrong_key_returns_empty_never_panics() {
    let codec = CipherCodec::new();
    let key_a = derive_key("pw-a", &generate_salt());
    let key_b = derive_key("pw-b", &generate_salt());

    let ciphertext = codec.encrypt_text("meet at noon", &key_a).to_string();
    assert_eq!(codec.decrypt_text(&ciphertext, &key_b), "");
}

#[test]
fn test_failure_sentinel_decrypts_to_empty_without_work() {
    let codec = CipherCodec::new();
    let key = derive_key("pw", &generate_salt());

    // A stored sentinel from a device whose ciphers were unavailable
    let sentinel = "FAILED:1722470400000";
    assert_eq!(codec.decrypt_text(sentinel, &key), "");
    assert_eq!(
        codec.try_decrypt(sentinel, &key),
        DecryptOutcome::Sentinel
    );
}

#[test]
fn test_fallback_marker_dispatch() {
    let codec = CipherCodec::new();
    let key = derive_key("pw", &generate_salt());

    // Unreadable fallback payloads degrade to empty, not an error
    assert_eq!(codec.decrypt_text("FALLBACK:zznothex", &key), "");
}

#[test]
fn test_cache_idempotence() {
    let cache = Arc::new(DecryptionCache::new(32));
    let codec = CipherCodec::with_cache(cache.clone());
    let key = derive_key("pw", &generate_salt());

    let ciphertext = codec.encrypt_text("render me twice", &key).to_string();
    let first = codec.decrypt_text(&ciphertext, &key);
    let second = codec.decrypt_text(&ciphertext, &key);

    assert_eq!(first, "render me twice");
    assert_eq!(first, second);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_cache_does_not_leak_across_keys() {
    let cache = Arc::new(DecryptionCache::new(32));
    let codec = CipherCodec::with_cache(cache);
    let key_a = derive_key("pw-a", &generate_salt());
    let key_b = derive_key("pw-b", &generate_salt());

    let ciphertext = codec.encrypt_text("scoped to key-a", &key_a).to_string();
    assert_eq!(codec.decrypt_text(&ciphertext, &key_a), "scoped to key-a");

    // The second key gets a cache miss and a failed authentication, not the
    // plaintext the first key cached
    assert_eq!(codec.decrypt_text(&ciphertext, &key_b), "");
}

#[test]
fn test_ciphertext_wire_forms_are_mutually_exclusive() {
    let strong = CipherText::Strong("cGF5bG9hZA==".to_string());
    let fallback = CipherText::Fallback("deadbeef".to_string());
    let failed = CipherText::Failed(1722470400000);

    for (ciphertext, wire) in [
        (&strong, "cGF5bG9hZA=="),
        (&fallback, "FALLBACK:deadbeef"),
        (&failed, "FAILED:1722470400000"),
    ] {
        assert_eq!(ciphertext.to_string(), wire);
        assert_eq!(&CipherText::from_wire(wire), ciphertext);
    }
}

#[test]
fn test_derived_key_fingerprint_is_not_the_key() {
    let key = DerivedKey::from_hex("ab".repeat(32));
    assert_ne!(key.fingerprint(), key.as_str());
    assert_eq!(key.fingerprint().len(), 16);
}
