//!
//! Hushnote: the client-side content-encryption core for personal notes.
//!
//! Directed ("personal") notes must be unreadable to the hosting backend
//! and its operators; ordinary board notes stay in the clear. This crate
//! owns everything that makes that work on the client:
//!
//! * **Salt generation (`crypto::salt`)**: a per-user random salt, created at
//!   account creation or lazily on first login, persisted server-side.
//! * **Key derivation (`crypto::kdf`)**: a deterministic 256-bit key from
//!   `(password, salt)`; never persisted durably.
//! * **Ciphertext codec (`crypto::codec`)**: encrypts and decrypts note
//!   payloads through a degrading tier ladder that never raises to the UI.
//! * **Decryption cache (`crypto::cache`)**: bounded memo of decrypted
//!   payloads so repeated renders skip redundant cryptographic work.
//! * **Credential store (`secrets`)**: device-local persistence of the
//!   derived key across launches, with a self-healing read path.
//! * **Key rotation (`migration`)**: re-encrypts a user's personal-note
//!   history when a password change replaces the key, tolerating per-note
//!   failure.
//! * **Sessions (`session`)**: login, restore, and password-change flows
//!   tying the pieces to the external directory and post store.

pub mod constants;
pub mod crypto;
pub mod migration;
pub mod posts;
pub mod secrets;
pub mod session;

pub use crypto::{
    CipherCodec, CipherText, DecryptOutcome, DecryptionCache, DerivedKey, derive_key,
    generate_salt,
};
pub use migration::{KeyRotationMigrator, MigrationOutcome};
pub use session::{PasswordChangeReport, UserSession, login};

/// Result type used throughout the Hushnote library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Hushnote library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured crypto errors (internal to the fallback ladders)
    #[error(transparent)]
    Crypto(#[from] crypto::CryptoError),

    /// Structured credential-store errors from the secrets module
    #[error(transparent)]
    Credential(#[from] secrets::CredentialError),

    /// Structured post-store and directory errors from the posts module
    #[error(transparent)]
    Post(#[from] posts::PostError),

    /// Structured migration errors from the migration module
    #[error(transparent)]
    Migration(#[from] migration::MigrationError),

    /// Structured session errors from the session module
    #[error(transparent)]
    Session(#[from] session::SessionError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
            Error::Crypto(_) => "crypto",
            Error::Credential(_) => "secrets",
            Error::Post(_) => "posts",
            Error::Migration(_) => "migration",
            Error::Session(_) => "session",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Post(post_err) => post_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error is authentication-related.
    pub fn is_authentication_error(&self) -> bool {
        match self {
            Error::Post(post_err) => post_err.is_authentication_error(),
            Error::Session(session::SessionError::MissingToken { .. }) => true,
            _ => false,
        }
    }

    /// Check if this error reported a corrupt (and evicted) credential entry.
    pub fn is_corrupt_credential(&self) -> bool {
        match self {
            Error::Credential(cred_err) => cred_err.is_corrupt(),
            _ => false,
        }
    }
}
