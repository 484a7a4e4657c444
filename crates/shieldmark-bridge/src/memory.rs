// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory secret store — the test double for the platform keychain.
//
// Holds secrets in a plain map for the lifetime of the process. Suitable for
// tests and desktop development; it satisfies none of the durability or
// accessibility guarantees a real keychain provides.

use std::collections::HashMap;
use std::sync::Mutex;

use shieldmark_core::error::{Result, ShieldmarkError};

use crate::traits::SecretStore;

/// Process-lifetime secret store backed by a `HashMap`.
#[derive(Default)]
pub struct MemorySecretStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.entries
            .lock()
            .map_err(|_| ShieldmarkError::SecretStore("secret store mutex poisoned".into()))
    }
}

impl SecretStore for MemorySecretStore {
    fn store_secret(&self, key: &str, value: &[u8]) -> Result<()> {
        self.entries()?.insert(key.to_owned(), value.to_vec());
        Ok(())
    }

    fn load_secret(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn delete_secret(&self, key: &str) -> Result<()> {
        self.entries()?.remove(key);
        Ok(())
    }
}
