/*! Integration tests for Hushnote.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - crypto: salt generation, key derivation, the ciphertext codec, and the cache
 * - secrets: the device credential store and its self-healing read path
 * - migration: key-rotation runs over personal-note histories
 * - session: login, restore, and the full password-change flow
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("hushnote=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod crypto;
mod migration;
mod secrets;
mod session;
