// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for native security capabilities.
//
// The engine never talks to the keychain/keystore or the biometric prompt
// directly; it goes through these traits so that a test double can stand in
// for the real platform without touching component logic.

use std::future::Future;
use std::pin::Pin;

use shieldmark_core::error::Result;

/// Unified bridge that groups the native capabilities the engine needs.
pub trait PlatformBridge: SecretStore + DeviceAuthenticator {
    /// Human-readable platform name (e.g. "iOS 18", "Android 15").
    fn platform_name(&self) -> &str;
}

/// Durable opaque secret storage in the platform keychain / keystore.
///
/// Implementations must keep values across process restarts, make them
/// available only after the first device unlock since boot, and never allow
/// export to another device. Values stored here are the only place secret
/// material (signing private keys, the vault symmetric key, lockdown
/// snapshots) lives.
pub trait SecretStore: Send + Sync {
    /// Store a secret under the given key, replacing any existing value.
    fn store_secret(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Retrieve a secret by key. Returns `None` if not found.
    fn load_secret(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Delete a secret by key. Deleting a missing key is not an error.
    fn delete_secret(&self, key: &str) -> Result<()>;
}

/// The device-owner authentication prompt (biometric or passcode).
///
/// One round trip: present `reason` to the user and resolve `true` only on a
/// successful check. Resolves `false` when the user fails or cancels, and
/// when the platform cannot evaluate the policy at all (no biometrics or
/// passcode configured).
pub trait DeviceAuthenticator: Send + Sync {
    fn authenticate<'a>(&'a self, reason: &'a str) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>>;
}
