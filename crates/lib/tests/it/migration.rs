//! Tests for key-rotation migration over a personal-note history.

use hushnote::{
    CipherCodec, CipherText, KeyRotationMigrator, MigrationOutcome,
    posts::{PostStore, StaticTokens},
};

use crate::helpers::{personal_post, rotation_keys, seeded_store};

#[tokio::test]
async fn test_partial_failure_leaves_corrupt_post_untouched() {
    let codec = CipherCodec::new();
    let (old_key, new_key) = rotation_keys();

    // Three posts; B's stored ciphertext is corrupted so decryption fails
    let (store, _ids) = seeded_store(&codec, "alice", &old_key, &["post A", "post C"]);
    let corrupt_wire = "not-a-real-ciphertext!!!";
    let corrupt_id = store.insert_post(personal_post(
        "alice",
        "friend",
        CipherText::from_wire(corrupt_wire),
    ));

    let migrator = KeyRotationMigrator::new(&codec, &store);
    let outcome = migrator
        .migrate("alice", &old_key, &new_key, &StaticTokens::valid("token"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        MigrationOutcome {
            migrated: 2,
            failed: 1,
            skipped: 0
        }
    );

    // The corrupt post keeps its original ciphertext, byte for byte
    let corrupt_post = store.post(&corrupt_id).unwrap();
    assert_eq!(corrupt_post.content.to_string(), corrupt_wire);
    assert!(corrupt_post.updated_at.is_none());

    // The healthy posts are now decryptable under the new key
    let mut recovered: Vec<String> = Vec::new();
    for post in store.personal_posts_for_user("alice").await.unwrap() {
        if post.id != corrupt_id {
            recovered.push(codec.decrypt_text(&post.content.to_string(), &new_key));
        }
    }
    recovered.sort();
    assert_eq!(recovered, ["post A", "post C"]);
}

#[tokio::test]
async fn test_persistence_failure_counts_but_does_not_abort() {
    let codec = CipherCodec::new();
    let (old_key, new_key) = rotation_keys();
    let (store, ids) = seeded_store(&codec, "alice", &old_key, &["one", "two", "three"]);
    store.fail_patches_for(&ids[1]);

    let migrator = KeyRotationMigrator::new(&codec, &store);
    let outcome = migrator
        .migrate("alice", &old_key, &new_key, &StaticTokens::valid("token"))
        .await
        .unwrap();

    assert_eq!(outcome.migrated, 2);
    assert_eq!(outcome.failed, 1);

    // The failed post is still readable under the old key
    let failed_post = store.post(&ids[1]).unwrap();
    assert_eq!(
        codec.decrypt_text(&failed_post.content.to_string(), &old_key),
        "two"
    );
}

#[tokio::test]
async fn test_rerun_after_partial_failure_is_idempotent() {
    let codec = CipherCodec::new();
    let (old_key, new_key) = rotation_keys();
    let (store, ids) = seeded_store(&codec, "alice", &old_key, &["one", "two"]);
    store.fail_patches_for(&ids[0]);

    let migrator = KeyRotationMigrator::new(&codec, &store);
    let tokens = StaticTokens::valid("token");

    let first = migrator
        .migrate("alice", &old_key, &new_key, &tokens)
        .await
        .unwrap();
    assert_eq!((first.migrated, first.failed), (1, 1));

    // Second run: the migrated post is recognized as already under the new
    // key; only the still-failing post is attempted again
    let second = migrator
        .migrate("alice", &old_key, &new_key, &tokens)
        .await
        .unwrap();
    assert_eq!(second.skipped, 1);
    assert_eq!(second.failed, 1);
    assert_eq!(second.migrated, 0);
}

#[tokio::test]
async fn test_migration_scopes_to_the_user() {
    let codec = CipherCodec::new();
    let (old_key, new_key) = rotation_keys();

    let (store, _) = seeded_store(&codec, "alice", &old_key, &["mine"]);
    let other_key = hushnote::derive_key("SomeoneElse", "cccccccccccccccccccccccccccccccc");
    let other_id = store.insert_post(personal_post(
        "carol",
        "dave",
        codec.encrypt_text("not mine", &other_key),
    ));
    let other_before = store.post(&other_id).unwrap().content;

    let migrator = KeyRotationMigrator::new(&codec, &store);
    let outcome = migrator
        .migrate("alice", &old_key, &new_key, &StaticTokens::valid("token"))
        .await
        .unwrap();

    assert_eq!(outcome.total(), 1);
    assert_eq!(store.post(&other_id).unwrap().content, other_before);
}
