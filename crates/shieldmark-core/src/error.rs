// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for ShieldMark.

use thiserror::Error;

use crate::types::{DeviceId, VaultItemId};

/// Top-level error type for all ShieldMark operations.
///
/// Variants are grouped by how a caller should react: wrong-state guards are
/// retried after a state change, not-found errors after re-selection,
/// integrity errors surface a security warning, and storage errors a generic
/// "try again" — see `human_errors::humanize_error`.
#[derive(Debug, Error)]
pub enum ShieldmarkError {
    // -- Lockdown state guards --
    #[error("lockdown is already engaged")]
    AlreadyLocked,

    #[error("lockdown is not engaged")]
    NotLocked,

    #[error("no unlock attempt is in progress")]
    NotAwaitingReauth,

    #[error("trusted device not found: {0}")]
    DeviceNotFound(DeviceId),

    // -- Vault --
    #[error("vault is locked")]
    VaultLocked,

    #[error("vault item not found: {0}")]
    ItemNotFound(VaultItemId),

    #[error("ciphertext is corrupt or failed authentication")]
    CorruptCiphertext,

    // -- Proofs --
    #[error("no stored proofs to verify against")]
    NoStoredProofs,

    // -- Cryptography --
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    // -- Secret store --
    #[error("secret not found: {0}")]
    SecretNotFound(String),

    #[error("secret store error: {0}")]
    SecretStore(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ShieldmarkError>;
