// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use serde::{Deserialize, Serialize};

use crate::types::SignatureAlgorithm;

/// Persistent application settings for the security engine.
///
/// The engine exposes one policy knob: which signature scheme new proofs are
/// created with. Verification always honors the algorithm recorded in the
/// payload, so changing this does not invalidate existing proofs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Signature scheme for newly created proofs.
    pub signing_algorithm: SignatureAlgorithm,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            signing_algorithm: SignatureAlgorithm::Ed25519,
        }
    }
}
