//! Note payload encryption and decryption
//!
//! Encrypts and decrypts personal-note payloads with a three-tier degrading
//! ladder: AES-256-GCM, then an XOR keystream derived from the key, then an
//! explicit failure sentinel. Neither direction ever raises to its caller:
//! callers are UI flows that must stay responsive even when a cipher
//! primitive is unavailable on a given device, so secrecy under the weaker
//! tiers is intentionally traded for robustness. That tradeoff is part of
//! the contract; the weak tiers are logged, not hidden.
//!
//! # Wire forms
//!
//! Every string produced by [`CipherCodec::encrypt_text`] is exactly one of:
//!
//! - **Strong**: no prefix; base64 of `nonce || AES-256-GCM ciphertext`.
//! - **Fallback**: [`FALLBACK_MARKER`] followed by a hex stream.
//! - **Failed**: [`FAILURE_MARKER`] followed by a Unix-millisecond
//!   timestamp; carries no recoverable content.
//!
//! Decryption dispatches purely on the prefix, never on errors.

use std::fmt;
use std::sync::Arc;

use aes_gcm::{
    Aes256Gcm, KeyInit, Nonce,
    aead::{Aead, AeadCore, OsRng},
};
use base64ct::{Base64, Encoding};
use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::{cache::DecryptionCache, errors::CryptoError, kdf::DerivedKey};
use crate::constants::{FALLBACK_MARKER, FAILURE_MARKER};

/// AES-GCM nonce size (96 bits / 12 bytes).
const NONCE_SIZE: usize = 12;

/// A note payload at rest, in exactly one of three mutually exclusive forms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CipherText {
    /// Produced by the primary cipher; opaque payload, no prefix.
    Strong(String),
    /// Produced when the primary cipher construction fails; hex payload.
    Fallback(String),
    /// Produced when both cipher paths fail; carries only a timestamp.
    Failed(i64),
}

impl CipherText {
    /// Parse a wire string into its tagged form.
    ///
    /// Total over all strings: anything without a marker is `Strong`.
    pub fn from_wire(raw: &str) -> Self {
        if let Some(rest) = raw.strip_prefix(FAILURE_MARKER) {
            return CipherText::Failed(rest.parse::<i64>().unwrap_or(0));
        }
        if let Some(rest) = raw.strip_prefix(FALLBACK_MARKER) {
            return CipherText::Fallback(rest.to_string());
        }
        CipherText::Strong(raw.to_string())
    }

    /// True when this is the failure sentinel.
    pub fn is_failed(&self) -> bool {
        matches!(self, CipherText::Failed(_))
    }

    /// True when this was produced by the fallback cipher.
    pub fn is_fallback(&self) -> bool {
        matches!(self, CipherText::Fallback(_))
    }
}

impl fmt::Display for CipherText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CipherText::Strong(payload) => write!(f, "{payload}"),
            CipherText::Fallback(payload) => write!(f, "{FALLBACK_MARKER}{payload}"),
            CipherText::Failed(timestamp) => write!(f, "{FAILURE_MARKER}{timestamp}"),
        }
    }
}

impl Serialize for CipherText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for CipherText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(CipherText::from_wire(&raw))
    }
}

/// Tagged decryption outcome.
///
/// [`CipherCodec::decrypt_text`] collapses this to a string (`""` on
/// anything but `Recovered`); the migrator needs the distinction between a
/// failure sentinel, a real corruption, and recovered text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecryptOutcome {
    /// Plaintext recovered successfully.
    Recovered(String),
    /// The input is a failure sentinel; there is nothing to recover.
    Sentinel,
    /// The input could not be decrypted with the supplied key.
    Unreadable,
}

/// One encryption tier: produces the payload string or reports failure so
/// the ladder can fall through to the next tier.
#[derive(Clone, Copy)]
pub(crate) struct EncryptTier {
    pub(crate) name: &'static str,
    pub(crate) run: fn(&str, &DerivedKey) -> Result<String, CryptoError>,
    pub(crate) wrap: fn(String) -> CipherText,
}

const DEFAULT_ENCRYPT_LADDER: &[EncryptTier] = &[
    EncryptTier {
        name: "aes-256-gcm",
        run: strong_encrypt,
        wrap: CipherText::Strong,
    },
    EncryptTier {
        name: "xor-stream",
        run: fallback_encrypt,
        wrap: CipherText::Fallback,
    },
];

/// Encrypts and decrypts note payloads with the degrading tier ladder and
/// the shared decryption cache.
#[derive(Clone)]
pub struct CipherCodec {
    cache: Arc<DecryptionCache>,
    encrypt_ladder: &'static [EncryptTier],
}

impl CipherCodec {
    /// Codec backed by the process-wide decryption cache.
    pub fn new() -> Self {
        Self::with_cache(DecryptionCache::global())
    }

    /// Codec backed by a caller-supplied cache.
    pub fn with_cache(cache: Arc<DecryptionCache>) -> Self {
        Self {
            cache,
            encrypt_ladder: DEFAULT_ENCRYPT_LADDER,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_encrypt_ladder(
        cache: Arc<DecryptionCache>,
        ladder: &'static [EncryptTier],
    ) -> Self {
        Self {
            cache,
            encrypt_ladder: ladder,
        }
    }

    /// Encrypt a note payload. Total: always returns *a* ciphertext.
    ///
    /// Walks the tier ladder in order and uses the first success; when every
    /// tier fails, returns the failure sentinel stamped with the current
    /// time. A tier below the first is a security degradation and is logged.
    pub fn encrypt_text(&self, plaintext: &str, key: &DerivedKey) -> CipherText {
        for (index, tier) in self.encrypt_ladder.iter().enumerate() {
            match (tier.run)(plaintext, key) {
                Ok(payload) => {
                    if index > 0 {
                        warn!(tier = tier.name, "Encrypted with degraded cipher tier");
                    }
                    return (tier.wrap)(payload);
                }
                Err(err) => {
                    warn!(tier = tier.name, %err, "Cipher tier failed, trying next tier");
                }
            }
        }
        warn!("All cipher tiers failed, emitting failure sentinel");
        CipherText::Failed(Utc::now().timestamp_millis())
    }

    /// Decrypt a wire ciphertext string. Total: returns `""` on any failure.
    ///
    /// Empty input or an empty key short-circuits to `""`. Successful
    /// decryptions are memoized in the cache, keyed by the ciphertext and
    /// the key's fingerprint.
    pub fn decrypt_text(&self, ciphertext: &str, key: &DerivedKey) -> String {
        match self.try_decrypt(ciphertext, key) {
            DecryptOutcome::Recovered(text) => text,
            DecryptOutcome::Sentinel | DecryptOutcome::Unreadable => String::new(),
        }
    }

    /// Decrypt with a tagged outcome instead of the collapsed string form.
    pub fn try_decrypt(&self, ciphertext: &str, key: &DerivedKey) -> DecryptOutcome {
        if ciphertext.is_empty() || key.is_empty() {
            return DecryptOutcome::Unreadable;
        }

        let fingerprint = key.fingerprint();
        if let Some(cached) = self.cache.get(ciphertext, &fingerprint) {
            return DecryptOutcome::Recovered(cached);
        }

        let outcome = match CipherText::from_wire(ciphertext) {
            CipherText::Failed(_) => DecryptOutcome::Sentinel,
            CipherText::Fallback(payload) => match fallback_decrypt(&payload, key) {
                Ok(text) => DecryptOutcome::Recovered(text),
                Err(err) => {
                    debug!(%err, "Fallback ciphertext unreadable");
                    DecryptOutcome::Unreadable
                }
            },
            CipherText::Strong(payload) => match strong_decrypt(&payload, key) {
                Ok(text) => DecryptOutcome::Recovered(text),
                Err(err) => {
                    debug!(%err, "Strong ciphertext unreadable");
                    DecryptOutcome::Unreadable
                }
            },
        };

        if let DecryptOutcome::Recovered(text) = &outcome {
            self.cache.insert(ciphertext, &fingerprint, text);
        }
        outcome
    }

    /// The cache backing this codec.
    pub fn cache(&self) -> &Arc<DecryptionCache> {
        &self.cache
    }
}

impl Default for CipherCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// Passphrase-style keying: any non-empty key string maps to a 256-bit
/// cipher key via SHA-256.
fn cipher_key(key: &DerivedKey) -> [u8; 32] {
    Sha256::digest(key.as_str().as_bytes()).into()
}

/// Tier 1: AES-256-GCM, nonce prepended, base64 wire form.
fn strong_encrypt(plaintext: &str, key: &DerivedKey) -> Result<String, CryptoError> {
    let cipher =
        Aes256Gcm::new_from_slice(&cipher_key(key)).map_err(|e| CryptoError::EncryptionFailed {
            reason: format!("Failed to create cipher: {e}"),
        })?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext =
        cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| CryptoError::EncryptionFailed {
                reason: format!("Encryption failed: {e}"),
            })?;

    let mut packed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    packed.extend_from_slice(&nonce);
    packed.extend_from_slice(&ciphertext);
    Ok(Base64::encode_string(&packed))
}

fn strong_decrypt(payload: &str, key: &DerivedKey) -> Result<String, CryptoError> {
    let packed = Base64::decode_vec(payload).map_err(|e| CryptoError::MalformedPayload {
        reason: format!("Invalid base64: {e}"),
    })?;
    if packed.len() < NONCE_SIZE {
        return Err(CryptoError::MalformedPayload {
            reason: "Payload shorter than nonce".to_string(),
        });
    }

    let (nonce_bytes, ciphertext) = packed.split_at(NONCE_SIZE);
    let cipher =
        Aes256Gcm::new_from_slice(&cipher_key(key)).map_err(|e| CryptoError::DecryptionFailed {
            reason: format!("Failed to create cipher: {e}"),
        })?;

    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|e| CryptoError::DecryptionFailed {
            reason: format!("Decryption failed: {e}"),
        })?;

    String::from_utf8(plaintext).map_err(|e| CryptoError::DecryptionFailed {
        reason: format!("Decrypted bytes are not UTF-8: {e}"),
    })
}

/// Tier 2: XOR against a SHA-256 keystream, cycled to the payload length.
///
/// Weaker than the primary tier (keystream reuse across notes); exists so
/// encryption still produces recoverable ciphertext when the primary cipher
/// construction is unavailable.
fn fallback_encrypt(plaintext: &str, key: &DerivedKey) -> Result<String, CryptoError> {
    Ok(hex::encode(xor_keystream(plaintext.as_bytes(), key)))
}

fn fallback_decrypt(payload: &str, key: &DerivedKey) -> Result<String, CryptoError> {
    let bytes = hex::decode(payload).map_err(|e| CryptoError::MalformedPayload {
        reason: format!("Invalid hex: {e}"),
    })?;
    String::from_utf8(xor_keystream(&bytes, key)).map_err(|e| CryptoError::DecryptionFailed {
        reason: format!("Recovered bytes are not UTF-8: {e}"),
    })
}

fn xor_keystream(data: &[u8], key: &DerivedKey) -> Vec<u8> {
    let keystream = Sha256::digest(key.as_str().as_bytes());
    data.iter()
        .enumerate()
        .map(|(i, byte)| byte ^ keystream[i % keystream.len()])
        .collect()
}
