//! Client-side content encryption for personal notes
//!
//! Provides salt generation, password-based key derivation, the note
//! ciphertext codec with its degrading fallback ladder, and the bounded
//! decryption cache. All public entry points here are total: failure is
//! absorbed into degraded-but-defined return values, never raised.

pub mod cache;
pub mod codec;
pub mod errors;
pub mod kdf;
pub mod salt;

pub use cache::DecryptionCache;
pub use codec::{CipherCodec, CipherText, DecryptOutcome};
pub use errors::CryptoError;
pub use kdf::{DerivedKey, derive_key};
pub use salt::generate_salt;
