//! User session management
//!
//! Ties the crypto subsystem to the external directory: login resolves the
//! account's salt (creating one for legacy accounts), derives the key, and
//! stashes it on-device so the password is not re-entered every launch.
//! Password changes rotate the salt and key, then drive the key-rotation
//! migration over the user's personal-note history.

use tracing::{info, warn};

use crate::{
    Result,
    constants::{DERIVED_KEY_SECRET, USER_ID_SECRET},
    crypto::{CipherCodec, CipherText, DerivedKey, derive_key, generate_salt},
    migration::{KeyRotationMigrator, MigrationOutcome},
    posts::{PasswordChangeRequest, PostError, PostStore, TokenProvider, UserDirectory},
    secrets::CredentialStore,
};

pub mod errors;

pub use errors::SessionError;

/// Outcome of a password change.
///
/// The password change itself succeeded whenever this struct exists;
/// `outcome.failed > 0` is degraded success, reported to the user rather
/// than escalated.
#[derive(Clone, Copy, Debug)]
pub struct PasswordChangeReport {
    pub outcome: MigrationOutcome,
}

impl PasswordChangeReport {
    /// User-facing summary of the change.
    pub fn user_message(&self) -> String {
        if self.outcome.is_clean() {
            format!(
                "Password changed; {} notes migrated.",
                self.outcome.migrated
            )
        } else {
            format!(
                "Password changed; {} notes migrated, {} failed — contact support.",
                self.outcome.migrated, self.outcome.failed
            )
        }
    }
}

/// Authenticated user session holding the derived key in memory.
///
/// The key is zeroized when the session drops. Sessions are created by
/// [`login`] or restored from the device credential store by
/// [`UserSession::restore`].
pub struct UserSession {
    user_id: String,
    key: DerivedKey,
    codec: CipherCodec,
}

impl std::fmt::Debug for UserSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserSession")
            .field("user_id", &self.user_id)
            .field("key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

/// Log in with an email and password.
///
/// Resolves the account's salt through the directory. Legacy accounts
/// (present email, absent salt) get a salt generated and persisted before
/// the key is derived. The derived key and user id are stashed in the
/// credential store best-effort: a failed stash degrades to
/// password-on-next-launch, never a failed login.
pub async fn login(
    directory: &dyn UserDirectory,
    secrets: &dyn CredentialStore,
    tokens: &dyn TokenProvider,
    email: &str,
    password: &str,
) -> Result<UserSession> {
    let lookup = directory.salt_by_email(email).await.map_err(|err| {
        if err.is_not_found() {
            SessionError::UnknownAccount {
                email: email.to_string(),
            }
            .into()
        } else {
            err
        }
    })?;

    let salt = match lookup.salt.as_deref() {
        Some(salt) if !salt.is_empty() => salt.to_string(),
        _ => {
            if !lookup.needs_salt() {
                return Err(SessionError::UnknownAccount {
                    email: email.to_string(),
                }
                .into());
            }
            let token =
                tokens
                    .bearer_token()
                    .await
                    .ok_or_else(|| SessionError::MissingToken {
                        operation: "salt creation".to_string(),
                    })?;
            let salt = generate_salt();
            directory
                .update_user_salt(&lookup.user_id, &salt, &token)
                .await?;
            info!(user_id = %lookup.user_id, "Created salt for legacy account");
            salt
        }
    };

    let key = derive_key(password, &salt);
    let session = UserSession::new(lookup.user_id, key);
    session.stash(secrets).await;
    Ok(session)
}

impl UserSession {
    fn new(user_id: String, key: DerivedKey) -> Self {
        Self {
            user_id,
            key,
            codec: CipherCodec::new(),
        }
    }

    /// Rebuild a session from the device credential store, without the
    /// password.
    ///
    /// Returns `Ok(None)` when no usable session is stored. Corrupt entries
    /// are evicted by the store's read path and treated as absent here.
    pub async fn restore(secrets: &dyn CredentialStore) -> Result<Option<UserSession>> {
        let user_id = match secrets.get_secret(USER_ID_SECRET).await {
            Ok(Some(user_id)) => user_id,
            Ok(None) => return Ok(None),
            Err(err) => {
                warn!(%err, "Stored session identity unreadable, requiring fresh login");
                return Ok(None);
            }
        };
        let key = match secrets.get_secret(DERIVED_KEY_SECRET).await {
            Ok(Some(key)) => key,
            Ok(None) => return Ok(None),
            Err(err) => {
                warn!(%err, "Stored derived key unreadable, requiring fresh login");
                return Ok(None);
            }
        };
        Ok(Some(UserSession::new(user_id, DerivedKey::from_hex(key))))
    }

    /// Get the user id.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Encrypt a note payload under this session's key.
    pub fn encrypt_note(&self, plaintext: &str) -> CipherText {
        self.codec.encrypt_text(plaintext, &self.key)
    }

    /// Decrypt a note payload. Returns `""` when the payload is
    /// unavailable; the UI renders that as blank content, not an error.
    pub fn decrypt_note(&self, ciphertext: &str) -> String {
        self.codec.decrypt_text(ciphertext, &self.key)
    }

    /// Change the account password and re-encrypt the personal-note
    /// history under the new key.
    ///
    /// The directory call happens first; migration failures after it never
    /// fail the password change. On return the session operates under the
    /// new key.
    pub async fn change_password(
        &mut self,
        new_password: &str,
        directory: &dyn UserDirectory,
        posts: &dyn PostStore,
        secrets: &dyn CredentialStore,
        tokens: &dyn TokenProvider,
    ) -> Result<PasswordChangeReport> {
        let token = tokens
            .bearer_token()
            .await
            .ok_or_else(|| SessionError::MissingToken {
                operation: "password change".to_string(),
            })?;

        let new_salt = generate_salt();
        let new_key = derive_key(new_password, &new_salt);

        let request = PasswordChangeRequest {
            user_id: self.user_id.clone(),
            new_salt,
            new_password: new_password.to_string(),
            new_encrypted_data: self.codec.encrypt_text(&self.user_id, &new_key).to_string(),
        };
        directory
            .change_password(&request, &token)
            .await
            .map_err(|err| match err {
                crate::Error::Post(PostError::Unauthorized) => {
                    SessionError::PasswordChangeRejected {
                        reason: "bearer token rejected".to_string(),
                    }
                    .into()
                }
                other => other,
            })?;

        let outcome = KeyRotationMigrator::new(&self.codec, posts)
            .migrate(&self.user_id, &self.key, &new_key, tokens)
            .await?;

        self.key = new_key;
        self.stash(secrets).await;

        if outcome.is_clean() {
            info!(user_id = %self.user_id, migrated = outcome.migrated, "Password changed");
        } else {
            warn!(
                user_id = %self.user_id,
                migrated = outcome.migrated,
                failed = outcome.failed,
                "Password changed with partial migration failure"
            );
        }
        Ok(PasswordChangeReport { outcome })
    }

    /// Log out: clear stored credentials and consume the session.
    ///
    /// The in-memory key is zeroized when the session drops.
    pub async fn logout(self, secrets: &dyn CredentialStore) -> Result<()> {
        secrets.delete_secret(DERIVED_KEY_SECRET).await?;
        secrets.delete_secret(USER_ID_SECRET).await?;
        Ok(())
    }

    /// Best-effort persistence of the session to the credential store.
    async fn stash(&self, secrets: &dyn CredentialStore) {
        if let Err(err) = secrets.save_secret(USER_ID_SECRET, &self.user_id).await {
            warn!(%err, "Failed to stash session identity");
        }
        if let Err(err) = secrets
            .save_secret(DERIVED_KEY_SECRET, self.key.as_str())
            .await
        {
            warn!(%err, "Failed to stash derived key");
        }
    }
}
