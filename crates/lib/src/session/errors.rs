//! Error types for session and account orchestration

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("No account found for email: {email}")]
    UnknownAccount { email: String },

    #[error("No bearer token available for {operation}")]
    MissingToken { operation: String },

    #[error("Password change rejected by the directory: {reason}")]
    PasswordChangeRejected { reason: String },
}
