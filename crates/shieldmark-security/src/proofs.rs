// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Content-authenticity proofs — creation, verification, and local
// persistence.
//
// A proof binds the SHA-256 hash of file bytes to the signer's public key
// and a timestamp. The signed message is fixed by protocol version so that
// an exported payload verifies anywhere.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use shieldmark_core::error::{Result, ShieldmarkError};
use shieldmark_core::types::{
    HashAlgorithm, IncidentEvent, IncidentKind, PROOF_SCHEMA_VERSION, ProofId, ProofPayload,
    ProofRecord, Severity, SignatureAlgorithm,
};

use crate::audit::IncidentLog;
use crate::integrity;
use crate::keys::KeyManager;
use crate::storage;

/// Canonical signing-message prefix for version 1 proofs.
///
/// Must stay bit-exact: the signed message is this ASCII tag followed by the
/// raw content-hash bytes, and existing exported proofs verify against it.
pub const SIGNING_TAG_V1: &[u8] = b"ShieldMarkProofV1|sha256|";

/// Build the exact byte sequence that is signed and verified for a proof.
pub fn signing_message_v1(content_hash: &[u8]) -> Vec<u8> {
    let mut message = SIGNING_TAG_V1.to_vec();
    message.extend_from_slice(content_hash);
    message
}

/// Outcome of verifying a piece of content against the stored proofs.
#[derive(Debug, Clone)]
pub struct VerificationResult {
    pub is_valid: bool,
    /// On success, the record that verified. On a hash match whose signature
    /// failed, the first hash-matching candidate — "right file, bad
    /// signature" is a different security signal than "wrong file".
    pub matched_record: Option<ProofRecord>,
    pub reason: String,
}

/// Proof creation, verification, and matching over a durable record list.
pub struct ProofEngine {
    keys: Arc<KeyManager>,
    incidents: Arc<IncidentLog>,
    path: PathBuf,
    algorithm: SignatureAlgorithm,
    records: Mutex<Vec<ProofRecord>>,
}

impl ProofEngine {
    /// Open (or create) the proof store at `path`, signing new proofs with
    /// `algorithm`.
    #[instrument(skip_all, fields(path = %path.as_ref().display(), ?algorithm))]
    pub async fn open(
        keys: Arc<KeyManager>,
        incidents: Arc<IncidentLog>,
        path: impl AsRef<std::path::Path>,
        algorithm: SignatureAlgorithm,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let records: Vec<ProofRecord> = storage::load_json(&path).await?.unwrap_or_default();

        debug!(records = records.len(), "proof store opened");
        Ok(Self {
            keys,
            incidents,
            path,
            algorithm,
            records: Mutex::new(records),
        })
    }

    /// Create, persist, and return a proof for `data`.
    #[instrument(skip(self, data, label, media_type), fields(data_len = data.len()))]
    pub async fn create_proof(
        &self,
        data: &[u8],
        label: Option<String>,
        media_type: Option<String>,
    ) -> Result<ProofRecord> {
        let content_hash = integrity::content_hash(data);
        let message = signing_message_v1(&content_hash);
        let signed = self.keys.sign(&message, self.algorithm)?;

        let payload = ProofPayload {
            version: PROOF_SCHEMA_VERSION,
            hash_algorithm: HashAlgorithm::Sha256,
            content_hash,
            signature_algorithm: signed.algorithm,
            signer_public_key: signed.public_key,
            signature: signed.signature,
            created_at: Utc::now(),
        };
        let record = ProofRecord {
            id: ProofId::new(),
            label,
            media_type,
            payload,
        };

        let mut records = self.records.lock().await;
        records.push(record.clone());
        storage::save_json_atomic(&self.path, &*records).await?;
        drop(records);

        self.incidents
            .append_best_effort(
                IncidentEvent::new(IncidentKind::ProofCreated, Severity::Info, "Proof created")
                    .with_metadata("recordId", record.id.to_string()),
            )
            .await;

        Ok(record)
    }

    /// Verify `data` against the stored proofs.
    ///
    /// Matching is exact-hash equality. Among hash-matching candidates, the
    /// first whose signature validates wins; if none validates the first
    /// candidate is still returned so the caller can distinguish a forged or
    /// corrupted signature from a plain mismatch.
    #[instrument(skip(self, data), fields(data_len = data.len()))]
    pub async fn verify(&self, data: &[u8]) -> Result<VerificationResult> {
        let records = self.records.lock().await;
        if records.is_empty() {
            return Err(ShieldmarkError::NoStoredProofs);
        }

        let content_hash = integrity::content_hash(data);
        let candidates: Vec<ProofRecord> = records
            .iter()
            .filter(|record| record.payload.content_hash == content_hash)
            .cloned()
            .collect();
        drop(records);

        if candidates.is_empty() {
            return Ok(VerificationResult {
                is_valid: false,
                matched_record: None,
                reason: "no stored proof matches this content hash".into(),
            });
        }

        for record in &candidates {
            let message = signing_message_v1(&record.payload.content_hash);
            let ok = self.keys.verify(
                &record.payload.signature,
                &message,
                &record.payload.signer_public_key,
                record.payload.signature_algorithm,
            );
            if ok {
                self.incidents
                    .append_best_effort(
                        IncidentEvent::new(
                            IncidentKind::ProofVerified,
                            Severity::Info,
                            "Proof verified",
                        )
                        .with_metadata("recordId", record.id.to_string()),
                    )
                    .await;
                return Ok(VerificationResult {
                    is_valid: true,
                    matched_record: Some(record.clone()),
                    reason: "signature valid and hash matches stored proof".into(),
                });
            }
        }

        Ok(VerificationResult {
            is_valid: false,
            matched_record: Some(candidates[0].clone()),
            reason: "hash matched but signature did not validate".into(),
        })
    }

    /// Snapshot of stored records, newest first.
    pub async fn list(&self) -> Vec<ProofRecord> {
        let records = self.records.lock().await;
        let mut listed: Vec<ProofRecord> = records.clone();
        listed.sort_by(|a, b| b.payload.created_at.cmp(&a.payload.created_at));
        listed
    }
}
