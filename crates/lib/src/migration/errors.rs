//! Error types for key-rotation migration

use thiserror::Error;

/// Errors that prevent a migration run from starting.
///
/// Per-post failures never surface here; they are counted in the
/// migration outcome instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MigrationError {
    /// No bearer token was available; nothing was touched.
    #[error("No bearer token available for migration")]
    MissingToken,

    /// The user's personal posts could not be enumerated.
    #[error("Failed to enumerate personal posts for {user_id}: {reason}")]
    Enumerate { user_id: String, reason: String },
}
