//! In-memory post store and user directory
//!
//! Process-local implementations of the backend interfaces, used by the
//! test suites and available for offline targets. The post store supports
//! per-post patch-failure injection so migration tests can exercise
//! partial-failure behavior.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{
    PostStore, UserDirectory,
    errors::PostError,
    types::{PasswordChangeRequest, PersonalPost, PostCipherPatch, SaltLookup},
};
use crate::Result;

/// Post store backed by a process-local vector.
#[derive(Default)]
pub struct InMemoryPostStore {
    posts: Mutex<Vec<PersonalPost>>,
    failing_patches: Mutex<HashSet<String>>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a post, assigning a fresh id when the given one is empty.
    /// Returns the post id.
    pub fn insert_post(&self, mut post: PersonalPost) -> String {
        if post.id.is_empty() {
            post.id = Uuid::new_v4().to_string();
        }
        let id = post.id.clone();
        self.posts.lock().unwrap().push(post);
        id
    }

    /// Snapshot of a stored post.
    pub fn post(&self, post_id: &str) -> Option<PersonalPost> {
        self.posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == post_id)
            .cloned()
    }

    /// Make every future patch of `post_id` fail, simulating a persistence
    /// error for that post.
    pub fn fail_patches_for(&self, post_id: &str) {
        self.failing_patches
            .lock()
            .unwrap()
            .insert(post_id.to_string());
    }

    /// Number of stored posts.
    pub fn len(&self) -> usize {
        self.posts.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn personal_posts_for_user(&self, user_id: &str) -> Result<Vec<PersonalPost>> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.sender_id == user_id || p.recipient_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_post_ciphertext(
        &self,
        post_id: &str,
        patch: &PostCipherPatch,
        token: &str,
    ) -> Result<()> {
        if token.is_empty() {
            return Err(PostError::Unauthorized.into());
        }
        if self.failing_patches.lock().unwrap().contains(post_id) {
            return Err(PostError::Status {
                status: 500,
                url: format!("memory://posts/{post_id}"),
            }
            .into());
        }

        let mut posts = self.posts.lock().unwrap();
        let Some(post) = posts.iter_mut().find(|p| p.id == post_id) else {
            return Err(PostError::PostNotFound {
                post_id: post_id.to_string(),
            }
            .into());
        };

        post.content = patch.content.clone();
        if let Some(formatting) = &patch.formatting {
            post.formatting = Some(formatting.clone());
        }
        post.updated_at = Some(Utc::now().timestamp_millis());
        Ok(())
    }
}

struct DirectoryRecord {
    user_id: String,
    email: String,
    salt: Option<String>,
}

/// User directory backed by a process-local map.
#[derive(Default)]
pub struct InMemoryDirectory {
    users: Mutex<HashMap<String, DirectoryRecord>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account. Pass `None` for the salt to model a legacy
    /// account whose salt has not been created yet.
    pub fn add_user(&self, email: &str, user_id: &str, salt: Option<&str>) {
        self.users.lock().unwrap().insert(
            email.to_string(),
            DirectoryRecord {
                user_id: user_id.to_string(),
                email: email.to_string(),
                salt: salt.map(str::to_string),
            },
        );
    }

    /// The stored salt for a user id, if any.
    pub fn salt_of(&self, user_id: &str) -> Option<String> {
        self.users
            .lock()
            .unwrap()
            .values()
            .find(|r| r.user_id == user_id)
            .and_then(|r| r.salt.clone())
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn salt_by_email(&self, email: &str) -> Result<SaltLookup> {
        let users = self.users.lock().unwrap();
        let Some(record) = users.get(email) else {
            return Err(PostError::UserNotFound {
                email: email.to_string(),
            }
            .into());
        };
        Ok(SaltLookup {
            user_id: record.user_id.clone(),
            salt: record.salt.clone(),
            email: Some(record.email.clone()),
        })
    }

    async fn update_user_salt(&self, user_id: &str, salt: &str, token: &str) -> Result<()> {
        if token.is_empty() {
            return Err(PostError::Unauthorized.into());
        }
        let mut users = self.users.lock().unwrap();
        for record in users.values_mut() {
            if record.user_id == user_id {
                record.salt = Some(salt.to_string());
                return Ok(());
            }
        }
        Err(PostError::UserNotFound {
            email: user_id.to_string(),
        }
        .into())
    }

    async fn change_password(&self, request: &PasswordChangeRequest, token: &str) -> Result<()> {
        if token.is_empty() {
            return Err(PostError::Unauthorized.into());
        }
        let mut users = self.users.lock().unwrap();
        for record in users.values_mut() {
            if record.user_id == request.user_id {
                record.salt = Some(request.new_salt.clone());
                return Ok(());
            }
        }
        Err(PostError::UserNotFound {
            email: request.user_id.clone(),
        }
        .into())
    }
}
