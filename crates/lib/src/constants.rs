//! Constants used throughout the Hushnote library.
//!
//! This module provides central definitions for wire markers, key material
//! sizes, and tunables shared across the crypto and session modules.

/// Marker prefixing ciphertext produced by the XOR-stream fallback cipher.
///
/// Payload after the marker is a hex stream.
pub const FALLBACK_MARKER: &str = "FALLBACK:";

/// Marker prefixing the failure sentinel produced when no cipher tier succeeds.
///
/// The marker is followed by a Unix-millisecond timestamp and carries no
/// recoverable content.
pub const FAILURE_MARKER: &str = "FAILED:";

/// Salt length in bytes before hex encoding (32 hex chars).
pub const SALT_BYTES: usize = 16;

/// Derived key length in bytes before hex encoding (AES-256).
pub const KEY_BYTES: usize = 32;

/// PBKDF2-HMAC-SHA256 iteration count for the primary derivation path.
pub const PBKDF2_ITERATIONS: u32 = 10_000;

/// Maximum number of entries retained by the decryption cache.
pub const DECRYPTION_CACHE_CAPACITY: usize = 1024;

/// Credential-store entry name for the session's derived key.
pub const DERIVED_KEY_SECRET: &str = "derived_key";

/// Credential-store entry name for the session's user id.
pub const USER_ID_SECRET: &str = "session_user_id";
