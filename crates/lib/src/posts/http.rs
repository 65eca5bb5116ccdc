//! HTTP implementation of the post-store and user-directory interfaces
//!
//! Talks JSON to the backend with reqwest. Mutating calls carry a bearer
//! token; the server validates the token against the user id being mutated
//! before anything is touched.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::debug;

use super::{
    PostStore, UserDirectory,
    errors::PostError,
    types::{PasswordChangeRequest, PersonalPost, PostCipherPatch, SaltLookup},
};
use crate::Result;

/// HTTP client for the backend's user and post endpoints.
pub struct HttpApi {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct SaltUpdate<'a> {
    #[serde(rename = "clerkId")]
    user_id: &'a str,
    salt: &'a str,
}

impl HttpApi {
    /// Client for the backend rooted at `base_url` (no trailing slash needed).
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn check_status(status: StatusCode, url: &str) -> Result<()> {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(PostError::Unauthorized.into());
        }
        if !status.is_success() {
            return Err(PostError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for HttpApi {
    async fn salt_by_email(&self, email: &str) -> Result<SaltLookup> {
        let url = self.url("/api/v0/users/salt");
        let response = self
            .client
            .get(&url)
            .query(&[("email", email)])
            .send()
            .await
            .map_err(|e| PostError::Request {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(PostError::UserNotFound {
                email: email.to_string(),
            }
            .into());
        }
        Self::check_status(response.status(), &url)?;

        response
            .json::<SaltLookup>()
            .await
            .map_err(|e| {
                PostError::Decode {
                    url,
                    reason: e.to_string(),
                }
                .into()
            })
    }

    async fn update_user_salt(&self, user_id: &str, salt: &str, token: &str) -> Result<()> {
        let url = self.url("/api/v0/users");
        let response = self
            .client
            .patch(&url)
            .bearer_auth(token)
            .json(&SaltUpdate { user_id, salt })
            .send()
            .await
            .map_err(|e| PostError::Request {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        Self::check_status(response.status(), &url)?;
        debug!(user_id, "Persisted new user salt");
        Ok(())
    }

    async fn change_password(&self, request: &PasswordChangeRequest, token: &str) -> Result<()> {
        let url = self.url("/api/v0/users/password");
        let response = self
            .client
            .patch(&url)
            .bearer_auth(token)
            .json(request)
            .send()
            .await
            .map_err(|e| PostError::Request {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        Self::check_status(response.status(), &url)
    }
}

#[async_trait]
impl PostStore for HttpApi {
    async fn personal_posts_for_user(&self, user_id: &str) -> Result<Vec<PersonalPost>> {
        let url = self.url("/api/v0/posts/personal");
        let response = self
            .client
            .get(&url)
            .query(&[("user", user_id)])
            .send()
            .await
            .map_err(|e| PostError::Request {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        Self::check_status(response.status(), &url)?;

        response
            .json::<Vec<PersonalPost>>()
            .await
            .map_err(|e| {
                PostError::Decode {
                    url,
                    reason: e.to_string(),
                }
                .into()
            })
    }

    async fn update_post_ciphertext(
        &self,
        post_id: &str,
        patch: &PostCipherPatch,
        token: &str,
    ) -> Result<()> {
        let url = self.url(&format!("/api/v0/posts/{post_id}"));
        let response = self
            .client
            .patch(&url)
            .bearer_auth(token)
            .json(patch)
            .send()
            .await
            .map_err(|e| PostError::Request {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(PostError::PostNotFound {
                post_id: post_id.to_string(),
            }
            .into());
        }
        Self::check_status(response.status(), &url)
    }
}
