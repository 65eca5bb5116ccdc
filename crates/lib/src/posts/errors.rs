//! Error types for the external post-store and user-directory interfaces

use thiserror::Error;

/// Errors surfaced by the post store and user directory clients.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PostError {
    /// Request could not be sent or the connection failed.
    #[error("Request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    /// Server answered with a non-success status.
    #[error("Server returned {status} for {url}")]
    Status { status: u16, url: String },

    /// Response body could not be decoded.
    #[error("Failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },

    /// Bearer token missing or rejected by the server.
    #[error("Request rejected: bearer token missing or invalid")]
    Unauthorized,

    /// No account matches the given email.
    #[error("No account found for email: {email}")]
    UserNotFound { email: String },

    /// No post matches the given id.
    #[error("Post not found: {post_id}")]
    PostNotFound { post_id: String },
}

impl PostError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PostError::UserNotFound { .. } | PostError::PostNotFound { .. }
        )
    }

    /// Check if this error is authentication-related.
    pub fn is_authentication_error(&self) -> bool {
        matches!(self, PostError::Unauthorized)
    }
}
