// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for a personal-safety audience.
//
// Every technical error maps to plain English with a clear suggestion. The
// failure class tells the caller which recovery path applies: wrong state
// needs a state change (unlock), not-found needs re-selection, integrity
// failures deserve a security warning, storage failures a retry.

use crate::error::ShieldmarkError;

/// How a failure should be handled from the caller's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The operation is valid but the current lockdown/security mode forbids
    /// it — retry after the state changes.
    WrongState,
    /// The referenced device or item does not exist.
    NotFound,
    /// Cryptographic or integrity failure — surface a security warning, not
    /// a generic error.
    Integrity,
    /// Disk or secret store unavailable — safe to retry.
    StorageUnavailable,
}

/// A human-readable error with a plain-English message and a suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Drives which recovery UI the caller presents.
    pub class: FailureClass,
}

/// Convert a `ShieldmarkError` into a `HumanError`.
pub fn humanize_error(err: &ShieldmarkError) -> HumanError {
    match err {
        // -- Lockdown state guards --
        ShieldmarkError::AlreadyLocked => HumanError {
            message: "Lockdown is already on.".into(),
            suggestion: "Your vault is already protected. Unlock it first if you want to start over.".into(),
            class: FailureClass::WrongState,
        },

        ShieldmarkError::NotLocked => HumanError {
            message: "Lockdown isn't on right now.".into(),
            suggestion: "There's nothing to unlock. If you feel unsafe, use the panic button first.".into(),
            class: FailureClass::WrongState,
        },

        ShieldmarkError::NotAwaitingReauth => HumanError {
            message: "No unlock is in progress.".into(),
            suggestion: "Start an unlock attempt first, then confirm your identity.".into(),
            class: FailureClass::WrongState,
        },

        ShieldmarkError::VaultLocked => HumanError {
            message: "Your vault is locked.".into(),
            suggestion: "Lockdown is active. Confirm your identity to unlock the vault before opening items.".into(),
            class: FailureClass::WrongState,
        },

        // -- Not found --
        ShieldmarkError::DeviceNotFound(_) => HumanError {
            message: "That device isn't in your trusted list.".into(),
            suggestion: "It may already have been removed. Refresh the list and try again.".into(),
            class: FailureClass::NotFound,
        },

        ShieldmarkError::ItemNotFound(_) => HumanError {
            message: "That item isn't in your vault.".into(),
            suggestion: "It may have been stored on another device. Check the vault list and try again.".into(),
            class: FailureClass::NotFound,
        },

        ShieldmarkError::SecretNotFound(_) => HumanError {
            message: "A stored security key couldn't be found.".into(),
            suggestion: "The app's secure storage may have been reset. You may need to set up protection again.".into(),
            class: FailureClass::NotFound,
        },

        // -- Integrity / cryptography --
        ShieldmarkError::CorruptCiphertext => HumanError {
            message: "This vault item couldn't be opened safely.".into(),
            suggestion: "The stored copy looks damaged or tampered with. Treat it as untrusted and keep the original if you have one.".into(),
            class: FailureClass::Integrity,
        },

        ShieldmarkError::NoStoredProofs => HumanError {
            message: "You haven't created any proofs yet.".into(),
            suggestion: "Create a proof for a photo or file first, then you can verify copies of it later.".into(),
            class: FailureClass::NotFound,
        },

        ShieldmarkError::KeyGeneration(_) | ShieldmarkError::Signing(_) => HumanError {
            message: "There was a problem with your signing key.".into(),
            suggestion: "Try again. If this keeps happening, the app's secure storage may need to be reset.".into(),
            class: FailureClass::Integrity,
        },

        ShieldmarkError::Encryption(_) => HumanError {
            message: "This item couldn't be protected.".into(),
            suggestion: "Try again. If this keeps happening, the app's secure storage may need to be reset.".into(),
            class: FailureClass::Integrity,
        },

        // -- Storage --
        ShieldmarkError::SecretStore(_) => HumanError {
            message: "The device's secure storage had a problem.".into(),
            suggestion: "Try closing and reopening the app. Your keys are kept by the device itself.".into(),
            class: FailureClass::StorageUnavailable,
        },

        ShieldmarkError::Io(_) => HumanError {
            message: "There was a problem reading or writing a file.".into(),
            suggestion: "Try again. If this keeps happening, your device's storage may be full.".into(),
            class: FailureClass::StorageUnavailable,
        },

        ShieldmarkError::Serialization(_) => HumanError {
            message: "The app had an internal data problem.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            class: FailureClass::StorageUnavailable,
        },
    }
}
