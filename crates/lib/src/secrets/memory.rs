//! In-memory credential store
//!
//! Keeps secrets in a process-local map. Used in tests and on targets
//! without durable device storage; the self-healing read contract is
//! exercised via explicit corruption marking.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::warn;

use super::errors::CredentialError;
use crate::Result;

/// Credential store backed by a process-local map.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    entries: Mutex<HashMap<String, String>>,
    corrupt: Mutex<HashSet<String>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an entry corrupt: the next read evicts it and reports the
    /// corruption, mirroring a failed device-storage read.
    pub fn mark_corrupt(&self, name: &str) {
        self.corrupt.lock().unwrap().insert(name.to_string());
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl super::CredentialStore for InMemoryCredentialStore {
    async fn get_secret(&self, name: &str) -> Result<Option<String>> {
        if self.corrupt.lock().unwrap().remove(name) {
            self.entries.lock().unwrap().remove(name);
            warn!(name, "Evicted corrupt credential entry");
            return Err(CredentialError::Corrupt {
                name: name.to_string(),
                reason: "Entry marked corrupt".to_string(),
            }
            .into());
        }
        Ok(self.entries.lock().unwrap().get(name).cloned())
    }

    async fn save_secret(&self, name: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    async fn delete_secret(&self, name: &str) -> Result<()> {
        self.entries.lock().unwrap().remove(name);
        Ok(())
    }
}
