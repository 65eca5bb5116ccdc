//! Error types for the device credential store

use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CredentialError {
    #[error("Credential store I/O failure for '{name}': {reason}")]
    Io { name: String, reason: String },

    #[error("Corrupt credential entry '{name}' (entry evicted): {reason}")]
    Corrupt { name: String, reason: String },

    #[error("Credential store unavailable: {reason}")]
    Unavailable { reason: String },
}

impl CredentialError {
    /// Check if this error reported a corrupt (and therefore evicted) entry.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, CredentialError::Corrupt { .. })
    }
}
