// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub bridge for desktop/CI builds where native platform APIs are
// unavailable.
//
// Secrets are held in memory only (a warning is logged on first store), and
// the authenticator always resolves `false` — the platform cannot evaluate
// an owner-presence policy it does not have.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};

use shieldmark_core::error::Result;

use crate::memory::MemorySecretStore;
use crate::traits::{DeviceAuthenticator, PlatformBridge, SecretStore};

/// Bridge returned on non-mobile platforms.
#[derive(Default)]
pub struct StubBridge {
    secrets: MemorySecretStore,
    warned: AtomicBool,
}

impl StubBridge {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlatformBridge for StubBridge {
    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }
}

impl SecretStore for StubBridge {
    fn store_secret(&self, key: &str, value: &[u8]) -> Result<()> {
        if !self.warned.swap(true, Ordering::Relaxed) {
            tracing::warn!("stub bridge stores secrets in memory only; they do not survive restart");
        }
        self.secrets.store_secret(key, value)
    }

    fn load_secret(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.secrets.load_secret(key)
    }

    fn delete_secret(&self, key: &str) -> Result<()> {
        self.secrets.delete_secret(key)
    }
}

impl DeviceAuthenticator for StubBridge {
    fn authenticate<'a>(&'a self, _reason: &'a str) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        tracing::warn!("DeviceAuthenticator::authenticate called on stub bridge");
        Box::pin(std::future::ready(false))
    }
}
