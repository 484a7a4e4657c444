// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// shieldmark-security — the ShieldMark state-and-proof engine.
//
// Five cooperating components, each an exclusive-access domain over its own
// durable file: the incident trail, the signing key manager, the lockdown
// state machine, the authenticity proof engine, and the encrypted vault.
// Secret material lives only behind the shieldmark-bridge SecretStore trait.

pub mod audit;
pub mod integrity;
pub mod keys;
pub mod lockdown;
pub mod proofs;
pub mod recovery;
pub mod storage;
pub mod vault;

pub use audit::IncidentLog;
pub use integrity::{content_hash, content_hash_hex};
pub use keys::{KeyManager, SignedMessage};
pub use lockdown::LockdownController;
pub use proofs::{ProofEngine, VerificationResult, signing_message_v1};
pub use vault::Vault;
