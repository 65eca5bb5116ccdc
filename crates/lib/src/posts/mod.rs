//! External post-store and user-directory interfaces
//!
//! This crate is a client of the backend that owns posts and accounts: it
//! reads personal posts, rewrites their ciphertext fields during key
//! rotation, and manages the per-user salt. The traits here are the seams
//! the core consumes; [`HttpApi`] is the production implementation and
//! [`InMemoryPostStore`] / [`InMemoryDirectory`] back the tests.

use async_trait::async_trait;

use crate::Result;

pub mod errors;
pub mod http;
pub mod memory;
pub mod types;

pub use errors::PostError;
pub use http::HttpApi;
pub use memory::{InMemoryDirectory, InMemoryPostStore};
pub use types::{PasswordChangeRequest, PersonalPost, PostCipherPatch, SaltLookup};

/// Read and rewrite access to a user's personal posts.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Every personal post where the user is sender or recipient.
    async fn personal_posts_for_user(&self, user_id: &str) -> Result<Vec<PersonalPost>>;

    /// Replace a post's ciphertext fields. Bearer-authenticated.
    async fn update_post_ciphertext(
        &self,
        post_id: &str,
        patch: &PostCipherPatch,
        token: &str,
    ) -> Result<()>;
}

/// Account-directory operations the encryption core depends on.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Look up a user's salt by email.
    async fn salt_by_email(&self, email: &str) -> Result<SaltLookup>;

    /// Persist a freshly generated salt for a legacy account.
    async fn update_user_salt(&self, user_id: &str, salt: &str, token: &str) -> Result<()>;

    /// Change the account password, supplying the new salt alongside it.
    async fn change_password(&self, request: &PasswordChangeRequest, token: &str) -> Result<()>;
}

/// Source of bearer tokens for authenticated backend calls.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// The current bearer token, or `None` when no session token exists.
    async fn bearer_token(&self) -> Option<String>;
}

/// Token provider backed by a fixed token. Used in tests and by callers
/// that refresh tokens out of band.
pub struct StaticTokens(pub Option<String>);

impl StaticTokens {
    pub fn valid(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    pub fn missing() -> Self {
        Self(None)
    }
}

#[async_trait]
impl TokenProvider for StaticTokens {
    async fn bearer_token(&self) -> Option<String> {
        self.0.clone()
    }
}
