//! File-backed credential store
//!
//! One file per secret under a base directory. Each file carries a SHA-256
//! checksum line ahead of the value so tampering and partial writes surface
//! as corrupt entries rather than silently wrong secrets. A corrupt entry
//! is deleted before the failed read returns.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::errors::CredentialError;
use crate::Result;

/// Credential store persisting each secret as a checksummed file.
pub struct FileCredentialStore {
    dir: PathBuf,
}

impl FileCredentialStore {
    /// Store secrets under `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the credential files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, name: &str) -> PathBuf {
        // Hex-encoded names keep arbitrary secret names filesystem-safe
        self.dir.join(format!("{}.cred", hex::encode(name)))
    }

    fn checksum(value: &str) -> String {
        hex::encode(Sha256::digest(value.as_bytes()))
    }

    /// Evict the entry backing `name`, then return the corruption error.
    async fn evict_corrupt(&self, name: &str, reason: String) -> crate::Error {
        let path = self.entry_path(name);
        if let Err(err) = tokio::fs::remove_file(&path).await {
            warn!(name, %err, "Failed to evict corrupt credential entry");
        } else {
            warn!(name, "Evicted corrupt credential entry");
        }
        CredentialError::Corrupt {
            name: name.to_string(),
            reason,
        }
        .into()
    }
}

#[async_trait]
impl super::CredentialStore for FileCredentialStore {
    async fn get_secret(&self, name: &str) -> Result<Option<String>> {
        let path = self.entry_path(name);
        let raw = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(self.evict_corrupt(name, format!("Unreadable entry: {err}")).await);
            }
        };

        let text = match String::from_utf8(raw) {
            Ok(text) => text,
            Err(err) => {
                return Err(self
                    .evict_corrupt(name, format!("Entry is not UTF-8: {err}"))
                    .await);
            }
        };

        let Some((checksum, value)) = text.split_once('\n') else {
            return Err(self
                .evict_corrupt(name, "Entry is missing its checksum line".to_string())
                .await);
        };

        if checksum != Self::checksum(value) {
            return Err(self
                .evict_corrupt(name, "Checksum mismatch".to_string())
                .await);
        }

        debug!(name, "Loaded credential entry");
        Ok(Some(value.to_string()))
    }

    async fn save_secret(&self, name: &str, value: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| CredentialError::Io {
                name: name.to_string(),
                reason: format!("Failed to create store directory: {e}"),
            })?;

        let contents = format!("{}\n{}", Self::checksum(value), value);
        tokio::fs::write(self.entry_path(name), contents)
            .await
            .map_err(|e| {
                CredentialError::Io {
                    name: name.to_string(),
                    reason: format!("Failed to write entry: {e}"),
                }
                .into()
            })
    }

    async fn delete_secret(&self, name: &str) -> Result<()> {
        match tokio::fs::remove_file(self.entry_path(name)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(CredentialError::Io {
                name: name.to_string(),
                reason: format!("Failed to delete entry: {err}"),
            }
            .into()),
        }
    }
}
