//! Device-local storage for short-lived secrets
//!
//! Persists the derived key and session identity across app restarts so the
//! user is not forced to re-enter their password every time the encryption
//! key is needed. Reads are self-healing: a corrupt entry is evicted
//! synchronously before the read returns, so it cannot permanently jam
//! future reads. Writes are best-effort at the call sites that treat them
//! as such (the session layer logs and continues).

use async_trait::async_trait;

use crate::Result;

pub mod errors;
pub mod file;
pub mod memory;

pub use errors::CredentialError;
pub use file::FileCredentialStore;
pub use memory::InMemoryCredentialStore;

/// Device-local secret storage.
///
/// Secrets are last-writer-wins with no transactional guarantee across
/// entries.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetch a secret by name.
    ///
    /// Returns `Ok(None)` when the entry is absent. When the entry exists
    /// but cannot be read back intact, the implementation evicts it before
    /// returning the error, so the next read observes `Ok(None)`.
    async fn get_secret(&self, name: &str) -> Result<Option<String>>;

    /// Store a secret under `name`, replacing any existing value.
    async fn save_secret(&self, name: &str, value: &str) -> Result<()>;

    /// Remove a secret. Removing an absent entry is not an error.
    async fn delete_secret(&self, name: &str) -> Result<()>;
}
