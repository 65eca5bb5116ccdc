//! Per-user salt generation
//!
//! Produces the random salt stored server-side for each account. Generation
//! walks a degrading ladder of entropy sources and always succeeds: the
//! function never raises and never returns an empty string. Every tier below
//! the first is a security-relevant degradation and is logged so operators
//! can detect devices running on the weak tiers.

use chrono::Utc;
use rand::{
    RngCore, SeedableRng,
    rngs::{OsRng, SmallRng},
};
use tracing::warn;

use super::errors::CryptoError;
use crate::constants::SALT_BYTES;

/// Named entropy tier: each tier produces a full hex salt or reports failure.
pub(crate) struct SaltTier {
    pub(crate) name: &'static str,
    pub(crate) run: fn() -> Result<String, CryptoError>,
}

const DEFAULT_LADDER: &[SaltTier] = &[
    SaltTier {
        name: "os-rng",
        run: os_random_salt,
    },
    SaltTier {
        name: "thread-rng",
        run: thread_random_salt,
    },
    SaltTier {
        name: "clock-seeded",
        run: clock_seeded_salt,
    },
];

/// Generate a random per-user salt as hex text.
///
/// Total: tries each entropy tier in order and falls back to fabricating
/// hex characters from a clock-seeded xorshift if every tier fails. The
/// strong path yields 16 random bytes (32 hex chars, ~128 bits of entropy);
/// the weak tiers are not cryptographically sound and are logged as such.
pub fn generate_salt() -> String {
    generate_salt_with(DEFAULT_LADDER)
}

pub(crate) fn generate_salt_with(ladder: &[SaltTier]) -> String {
    for (index, tier) in ladder.iter().enumerate() {
        match (tier.run)() {
            Ok(salt) => {
                if index > 0 {
                    warn!(
                        tier = tier.name,
                        "Generated salt from degraded entropy source"
                    );
                }
                return salt;
            }
            Err(err) => {
                warn!(tier = tier.name, %err, "Salt entropy tier failed, trying next tier");
            }
        }
    }
    warn!("All salt entropy tiers failed, fabricating salt from weak PRNG");
    fabricated_salt()
}

/// Tier 1: platform CSPRNG fill.
fn os_random_salt() -> Result<String, CryptoError> {
    let mut bytes = [0u8; SALT_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| CryptoError::EntropyUnavailable {
            reason: e.to_string(),
        })?;
    Ok(hex::encode(bytes))
}

/// Tier 2: thread-local CSPRNG (reseeded from the OS, still secure).
fn thread_random_salt() -> Result<String, CryptoError> {
    let mut bytes = [0u8; SALT_BYTES];
    rand::thread_rng()
        .try_fill_bytes(&mut bytes)
        .map_err(|e| CryptoError::EntropyUnavailable {
            reason: e.to_string(),
        })?;
    Ok(hex::encode(bytes))
}

/// Tier 3: non-cryptographic per-byte fill seeded from the clock.
///
/// Not cryptographically sound. Kept only so salt generation cannot hard-fail
/// on runtimes without a usable secure source.
fn clock_seeded_salt() -> Result<String, CryptoError> {
    let mut rng = SmallRng::seed_from_u64(Utc::now().timestamp_millis() as u64);
    let mut bytes = [0u8; SALT_BYTES];
    for byte in &mut bytes {
        *byte = (rng.next_u32() & 0xff) as u8;
    }
    Ok(hex::encode(bytes))
}

/// Tier 4: fabricate 32 hex chars from a clock-seeded xorshift.
///
/// Ultimate fallback for environments where even byte-array fill fails.
fn fabricated_salt() -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    // xorshift64; seed must be non-zero
    let mut state = (Utc::now().timestamp_millis() as u64) | 1;
    let mut salt = String::with_capacity(SALT_BYTES * 2);
    for _ in 0..SALT_BYTES * 2 {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        salt.push(HEX[(state & 0xf) as usize] as char);
    }
    salt
}
