//! Tests for login, session restore, and the full password-change flow.

use hushnote::{
    UserSession, derive_key, login,
    posts::{PostStore, StaticTokens},
    secrets::InMemoryCredentialStore,
};

use crate::helpers::{directory_with_user, personal_post, seeded_store};

#[tokio::test]
async fn test_login_then_note_round_trip() {
    let directory = directory_with_user("alice@example.com", "alice", Some("aa11bb22"));
    let secrets = InMemoryCredentialStore::new();

    let session = login(
        &directory,
        &secrets,
        &StaticTokens::valid("token"),
        "alice@example.com",
        "hunter2",
    )
    .await
    .unwrap();

    let ciphertext = session.encrypt_note("meet at noon").to_string();
    assert_ne!(ciphertext, "meet at noon");
    assert_eq!(session.decrypt_note(&ciphertext), "meet at noon");
}

#[tokio::test]
async fn test_legacy_account_gets_salt_on_first_login() {
    let directory = directory_with_user("old-timer@example.com", "old-timer", None);
    let secrets = InMemoryCredentialStore::new();

    login(
        &directory,
        &secrets,
        &StaticTokens::valid("token"),
        "old-timer@example.com",
        "pw",
    )
    .await
    .unwrap();

    let salt = directory.salt_of("old-timer").unwrap();
    assert_eq!(salt.len(), 32);

    // A second login against the persisted salt restores the same key
    let again = login(
        &directory,
        &secrets,
        &StaticTokens::valid("token"),
        "old-timer@example.com",
        "pw",
    )
    .await
    .unwrap();
    let ciphertext = again.encrypt_note("stable key").to_string();
    assert_eq!(again.decrypt_note(&ciphertext), "stable key");
}

#[tokio::test]
async fn test_password_change_end_to_end() {
    let salt_old = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    let directory = directory_with_user("alice@example.com", "alice", Some(salt_old));
    let secrets = InMemoryCredentialStore::new();
    let tokens = StaticTokens::valid("token");

    let mut session = login(&directory, &secrets, &tokens, "alice@example.com", "OldPw1")
        .await
        .unwrap();

    // A note written before the password change
    let old_key = derive_key("OldPw1", salt_old);
    let (store, ids) = seeded_store(
        &hushnote::CipherCodec::new(),
        "alice",
        &old_key,
        &["meet at noon"],
    );

    let report = session
        .change_password("NewPw2", &directory, &store, &secrets, &tokens)
        .await
        .unwrap();
    assert_eq!(report.outcome.migrated, 1);
    assert_eq!(report.outcome.failed, 0);
    assert_eq!(report.user_message(), "Password changed; 1 notes migrated.");

    // The directory now carries a fresh salt
    let salt_new = directory.salt_of("alice").unwrap();
    assert_ne!(salt_new, salt_old);

    // The migrated note decrypts under the new key and not under the old one
    let new_key = derive_key("NewPw2", &salt_new);
    let migrated = store.post(&ids[0]).unwrap();
    let codec = hushnote::CipherCodec::new();
    assert_eq!(
        codec.decrypt_text(&migrated.content.to_string(), &new_key),
        "meet at noon"
    );
    assert_eq!(codec.decrypt_text(&migrated.content.to_string(), &old_key), "");

    // The live session already operates under the new key
    let fresh = session.encrypt_note("after rotation").to_string();
    assert_eq!(codec.decrypt_text(&fresh, &new_key), "after rotation");
}

#[tokio::test]
async fn test_password_change_with_partial_failure_still_succeeds() {
    let salt_old = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    let directory = directory_with_user("alice@example.com", "alice", Some(salt_old));
    let secrets = InMemoryCredentialStore::new();
    let tokens = StaticTokens::valid("token");

    let mut session = login(&directory, &secrets, &tokens, "alice@example.com", "OldPw1")
        .await
        .unwrap();

    let old_key = derive_key("OldPw1", salt_old);
    let codec = hushnote::CipherCodec::new();
    let (store, _ids) = seeded_store(&codec, "alice", &old_key, &["healthy"]);
    store.insert_post(personal_post(
        "alice",
        "friend",
        hushnote::CipherText::from_wire("corrupted-beyond-repair"),
    ));

    let report = session
        .change_password("NewPw2", &directory, &store, &secrets, &tokens)
        .await
        .unwrap();

    assert_eq!(report.outcome.migrated, 1);
    assert_eq!(report.outcome.failed, 1);
    assert!(report.user_message().contains("contact support"));
}

#[tokio::test]
async fn test_restore_survives_restart_and_logout_clears() {
    let directory = directory_with_user("alice@example.com", "alice", Some("aa11bb22"));
    let secrets = InMemoryCredentialStore::new();

    let session = login(
        &directory,
        &secrets,
        &StaticTokens::valid("token"),
        "alice@example.com",
        "hunter2",
    )
    .await
    .unwrap();
    let ciphertext = session.encrypt_note("persisted").to_string();
    drop(session);

    let restored = UserSession::restore(&secrets).await.unwrap().unwrap();
    assert_eq!(restored.decrypt_note(&ciphertext), "persisted");

    restored.logout(&secrets).await.unwrap();
    assert!(UserSession::restore(&secrets).await.unwrap().is_none());
}

#[tokio::test]
async fn test_posts_listing_reaches_recipient_side() {
    // The migrator walks posts where the user is sender or recipient; make
    // sure the store exposes both directions
    let codec = hushnote::CipherCodec::new();
    let key = derive_key("pw", "aa11bb22");
    let (store, _) = seeded_store(&codec, "alice", &key, &["sent"]);
    store.insert_post(personal_post(
        "bob",
        "alice",
        codec.encrypt_text("received", &key),
    ));

    let posts = store.personal_posts_for_user("alice").await.unwrap();
    assert_eq!(posts.len(), 2);
}
