// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ShieldMark — Native platform bridge abstractions.
//
// Defines the collaborator traits the security engine depends on: the
// durable secret store (keychain/keystore) and the device-owner
// authentication prompt. Per-platform implementations (Keychain +
// LocalAuthentication on iOS, Keystore + BiometricPrompt on Android) plug in
// behind these traits; desktop and CI builds get the in-memory stub.

pub mod memory;
pub mod stub;
pub mod traits;

pub use memory::MemorySecretStore;
pub use stub::StubBridge;
pub use traits::{DeviceAuthenticator, PlatformBridge, SecretStore};

/// Retrieve the bridge implementation for the current target.
///
/// Mobile targets are expected to ship their own `PlatformBridge` and wire
/// it at app startup; everything else falls back to the in-memory stub.
pub fn platform_bridge() -> Box<dyn PlatformBridge> {
    Box::new(stub::StubBridge::new())
}
