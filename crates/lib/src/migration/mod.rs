//! Key-rotation migration
//!
//! When a user's password changes, their derived key changes with it, and
//! every personal note they can reach must be re-encrypted from the old key
//! to the new one. The walk is sequential and each post is isolated: a
//! failure decrypting, re-encrypting, or persisting one post is counted and
//! leaves that post readable under its existing (old-key) ciphertext. A
//! post is never half-written.
//!
//! Re-running a partially failed migration is safe: a post that no longer
//! decrypts under the old key is probed with the new key, and posts already
//! readable under the new key are counted as skipped rather than failed.

use tracing::{debug, info, warn};

use crate::{
    Result,
    crypto::{CipherCodec, CipherText, DecryptOutcome, DerivedKey},
    posts::{PersonalPost, PostCipherPatch, PostStore, TokenProvider},
};

pub mod errors;

pub use errors::MigrationError;

/// Tally of one migration run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MigrationOutcome {
    /// Posts re-encrypted and persisted under the new key.
    pub migrated: usize,
    /// Posts left untouched because decryption, re-encryption, or
    /// persistence failed. Still readable under the old key.
    pub failed: usize,
    /// Posts with nothing to do: already readable under the new key, or
    /// carrying only a failure sentinel.
    pub skipped: usize,
}

impl MigrationOutcome {
    /// True when every post that needed migration was migrated.
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }

    /// Total number of posts attempted.
    pub fn total(&self) -> usize {
        self.migrated + self.failed + self.skipped
    }
}

/// How one post's ciphertext field should be handled.
enum FieldPlan {
    /// Recovered plaintext, re-encrypt under the new key.
    Rewrap(String),
    /// Carry the existing ciphertext through unchanged (failure sentinel,
    /// or already readable under the new key).
    Carry,
}

/// Result of migrating a single post.
enum PostMigration {
    Migrated,
    Skipped(String),
    Failed(String),
}

/// Re-encrypts a user's personal-note history from one key to another.
pub struct KeyRotationMigrator<'a> {
    codec: &'a CipherCodec,
    posts: &'a dyn PostStore,
}

impl<'a> KeyRotationMigrator<'a> {
    pub fn new(codec: &'a CipherCodec, posts: &'a dyn PostStore) -> Self {
        Self { codec, posts }
    }

    /// Walk every personal post reachable by `user_id` and re-encrypt its
    /// ciphertext fields from `old_key` to `new_key`.
    ///
    /// Returns the tally after all posts have been attempted. Errors are
    /// returned only when the run cannot start at all (missing token,
    /// enumeration failure); per-post failures are counted, never raised.
    pub async fn migrate(
        &self,
        user_id: &str,
        old_key: &DerivedKey,
        new_key: &DerivedKey,
        tokens: &dyn TokenProvider,
    ) -> Result<MigrationOutcome> {
        let token = tokens
            .bearer_token()
            .await
            .ok_or(MigrationError::MissingToken)?;

        let posts = self
            .posts
            .personal_posts_for_user(user_id)
            .await
            .map_err(|e| MigrationError::Enumerate {
                user_id: user_id.to_string(),
                reason: e.to_string(),
            })?;

        let mut outcome = MigrationOutcome::default();
        for post in posts {
            match self.migrate_post(&post, old_key, new_key, &token).await {
                PostMigration::Migrated => outcome.migrated += 1,
                PostMigration::Skipped(reason) => {
                    debug!(post_id = %post.id, reason = %reason, "Skipping post");
                    outcome.skipped += 1;
                }
                PostMigration::Failed(reason) => {
                    warn!(
                        post_id = %post.id,
                        reason = %reason,
                        "Post migration failed, leaving existing ciphertext in place"
                    );
                    outcome.failed += 1;
                }
            }
        }

        info!(
            user_id,
            migrated = outcome.migrated,
            failed = outcome.failed,
            skipped = outcome.skipped,
            "Key rotation migration finished"
        );
        Ok(outcome)
    }

    async fn migrate_post(
        &self,
        post: &PersonalPost,
        old_key: &DerivedKey,
        new_key: &DerivedKey,
        token: &str,
    ) -> PostMigration {
        let content_plan = match self.plan_field(&post.content, old_key, new_key) {
            Ok(plan) => plan,
            Err(reason) => return PostMigration::Failed(format!("content {reason}")),
        };

        let formatting_plan = match &post.formatting {
            None => None,
            Some(formatting) => match self.plan_field(formatting, old_key, new_key) {
                Ok(plan) => Some(plan),
                Err(reason) => return PostMigration::Failed(format!("formatting {reason}")),
            },
        };

        let nothing_to_rewrap = matches!(content_plan, FieldPlan::Carry)
            && !matches!(formatting_plan, Some(FieldPlan::Rewrap(_)));
        if nothing_to_rewrap {
            return PostMigration::Skipped(
                "already under the new key or nothing recoverable".to_string(),
            );
        }

        let content = match self.rewrap(&post.content, content_plan, new_key) {
            Ok(ciphertext) => ciphertext,
            Err(reason) => return PostMigration::Failed(format!("content {reason}")),
        };
        let formatting = match formatting_plan {
            None => None,
            Some(plan) => {
                // post.formatting is Some whenever a plan exists
                let Some(existing) = &post.formatting else {
                    return PostMigration::Failed("formatting disappeared mid-walk".to_string());
                };
                match self.rewrap(existing, plan, new_key) {
                    Ok(ciphertext) => Some(ciphertext),
                    Err(reason) => return PostMigration::Failed(format!("formatting {reason}")),
                }
            }
        };

        let patch = PostCipherPatch { content, formatting };
        match self
            .posts
            .update_post_ciphertext(&post.id, &patch, token)
            .await
        {
            Ok(()) => PostMigration::Migrated,
            Err(err) => PostMigration::Failed(format!("persistence failed: {err}")),
        }
    }

    /// Decide what to do with one ciphertext field.
    ///
    /// `Err` means the field is unreadable under both keys: real
    /// corruption, and the post must be left alone.
    fn plan_field(
        &self,
        field: &CipherText,
        old_key: &DerivedKey,
        new_key: &DerivedKey,
    ) -> std::result::Result<FieldPlan, String> {
        let wire = field.to_string();
        match self.codec.try_decrypt(&wire, old_key) {
            DecryptOutcome::Recovered(plaintext) => Ok(FieldPlan::Rewrap(plaintext)),
            DecryptOutcome::Sentinel => Ok(FieldPlan::Carry),
            DecryptOutcome::Unreadable => match self.codec.try_decrypt(&wire, new_key) {
                DecryptOutcome::Recovered(_) => Ok(FieldPlan::Carry),
                _ => Err("unreadable under both keys".to_string()),
            },
        }
    }

    /// Produce the ciphertext to persist for one field.
    fn rewrap(
        &self,
        existing: &CipherText,
        plan: FieldPlan,
        new_key: &DerivedKey,
    ) -> std::result::Result<CipherText, String> {
        match plan {
            FieldPlan::Carry => Ok(existing.clone()),
            FieldPlan::Rewrap(plaintext) => {
                let reencrypted = self.codec.encrypt_text(&plaintext, new_key);
                // Persisting a sentinel over recoverable ciphertext would
                // destroy the note
                if reencrypted.is_failed() {
                    return Err("re-encryption produced a failure sentinel".to_string());
                }
                Ok(reencrypted)
            }
        }
    }
}
