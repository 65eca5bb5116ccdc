//! Password-based key derivation
//!
//! Turns `(password, salt)` into a deterministic 256-bit symmetric key.
//! The primary path is PBKDF2-HMAC-SHA256 with a fixed iteration count.
//! If the primary strategy reports failure, derivation falls back to a
//! single SHA-256 pass over `password:salt`. The fallback has no iteration
//! stretching and is logged as a security degradation; it exists to avoid
//! hard failure, not as an equivalent substitute.

use std::fmt;

use pbkdf2::pbkdf2_hmac;
use sha2::{Digest, Sha256};
use tracing::warn;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::errors::CryptoError;
use crate::constants::{KEY_BYTES, PBKDF2_ITERATIONS};

/// Hex-encoded 256-bit symmetric key derived from a password and salt.
///
/// Never persisted to durable storage; lives in process memory and,
/// optionally, in the device credential store for the session duration.
/// Zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey(String);

impl DerivedKey {
    /// Wrap an existing hex key string (e.g. restored from the credential store).
    pub fn from_hex(hex_key: impl Into<String>) -> Self {
        Self(hex_key.into())
    }

    /// The hex key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Short stable identifier for this key, safe to use as a cache key
    /// component or log field. First 8 bytes of SHA-256 over the hex string.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        hex::encode(&digest[..8])
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Key material stays out of logs and panics
        write!(f, "DerivedKey({})", self.fingerprint())
    }
}

/// Strategy signature for the primary derivation tier.
pub(crate) type KdfStrategy = fn(&str, &str) -> Result<String, CryptoError>;

/// Derive the symmetric key for `(password, salt)`.
///
/// Deterministic and total: the same inputs always produce the same key, and
/// no failure propagates to the caller. A primary-tier failure degrades to
/// the single-pass hash fallback with a warning.
pub fn derive_key(password: &str, salt: &str) -> DerivedKey {
    derive_key_with(derive_pbkdf2, password, salt)
}

pub(crate) fn derive_key_with(primary: KdfStrategy, password: &str, salt: &str) -> DerivedKey {
    match primary(password, salt) {
        Ok(key) => DerivedKey(key),
        Err(err) => {
            warn!(%err, "Primary key derivation unavailable, using single-pass hash fallback");
            DerivedKey(derive_single_pass(password, salt))
        }
    }
}

/// PBKDF2-HMAC-SHA256 with the fixed work factor, hex-encoded.
fn derive_pbkdf2(password: &str, salt: &str) -> Result<String, CryptoError> {
    let mut key = [0u8; KEY_BYTES];
    pbkdf2_hmac::<Sha256>(
        password.as_bytes(),
        salt.as_bytes(),
        PBKDF2_ITERATIONS,
        &mut key,
    );
    let encoded = hex::encode(key);
    key.zeroize();
    Ok(encoded)
}

/// Single SHA-256 pass over `password:salt`, hex-encoded.
///
/// No iteration stretching; only reached when the primary tier fails.
fn derive_single_pass(password: &str, salt: &str) -> String {
    let mut input = format!("{password}:{salt}");
    let digest = Sha256::digest(input.as_bytes());
    input.zeroize();
    hex::encode(digest)
}
