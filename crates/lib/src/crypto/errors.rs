//! Error types for the content-encryption module
//!
//! These errors are internal to the fallback ladders: no public crypto entry
//! point propagates them. Each tier reports its failure here so the driver
//! can log it and fall through to the next tier.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Entropy source unavailable: {reason}")]
    EntropyUnavailable { reason: String },

    #[error("Key derivation failed: {reason}")]
    DerivationFailed { reason: String },

    #[error("Encryption failed: {reason}")]
    EncryptionFailed { reason: String },

    #[error("Decryption failed: {reason}")]
    DecryptionFailed { reason: String },

    #[error("Malformed ciphertext payload: {reason}")]
    MalformedPayload { reason: String },
}

impl CryptoError {
    /// Check if this error came from the decrypt path.
    pub fn is_decryption_failure(&self) -> bool {
        matches!(
            self,
            CryptoError::DecryptionFailed { .. } | CryptoError::MalformedPayload { .. }
        )
    }
}
