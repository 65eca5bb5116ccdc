//! Wire types exchanged with the backend
//!
//! Ciphertext fields are opaque strings on the wire; everything else on a
//! personal post (timestamps, color, emoji) is ordinary plaintext metadata.
//! Field names follow the backend's JSON contract.

use serde::{Deserialize, Serialize};

use crate::crypto::CipherText;

/// A directed note addressed from one user to exactly one recipient.
///
/// `content` and `formatting` are always ciphertext at rest; this crate only
/// reads and rewrites those two fields during key rotation. The post record
/// itself is owned by the external post store.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalPost {
    pub id: String,

    pub sender_id: String,

    pub recipient_id: String,

    /// Encrypted note body.
    pub content: CipherText,

    /// Encrypted serialized style document, when the note carries styling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatting: Option<CipherText>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,

    /// Unix-millisecond creation timestamp.
    pub created_at: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

/// Ciphertext rewrite applied to a post during key rotation.
///
/// When `formatting` is absent the stored formatting field is left alone.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCipherPatch {
    pub content: CipherText,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatting: Option<CipherText>,
}

/// Result of the salt-by-email lookup.
///
/// A missing `salt` together with a present `email` signals a legacy
/// account whose salt has not been created yet; the login flow resolves
/// this by generating one and persisting it through the directory.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaltLookup {
    pub user_id: String,

    #[serde(default)]
    pub salt: Option<String>,

    #[serde(default)]
    pub email: Option<String>,
}

impl SaltLookup {
    /// True when this account needs a salt created before login can proceed.
    pub fn needs_salt(&self) -> bool {
        self.salt.as_deref().is_none_or(str::is_empty) && self.email.is_some()
    }
}

/// Password-change request body.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PasswordChangeRequest {
    #[serde(rename = "clerkId")]
    pub user_id: String,

    #[serde(rename = "newSalt")]
    pub new_salt: String,

    #[serde(rename = "newPassword")]
    pub new_password: String,

    /// Opaque key-check blob the backend stores alongside the account;
    /// produced by encrypting the user id under the new key.
    #[serde(rename = "newEncryptedData")]
    pub new_encrypted_data: String,
}
