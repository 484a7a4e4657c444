// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the ShieldMark security engine.
//
// Every type here is a plain serializable record; secret material (signing
// private keys, the vault symmetric key) never appears in this module and is
// held only by the secret-store collaborator.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an incident event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a trusted device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(pub Uuid);

impl DeviceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DeviceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a stored proof record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProofId(pub Uuid);

impl ProofId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ProofId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ProofId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a vault item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VaultItemId(pub Uuid);

impl VaultItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for VaultItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for VaultItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The fixed set of security event types recorded in the incident trail.
///
/// Adding a variant is a compile-checked change: `Display` below and
/// `human_errors` match exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IncidentKind {
    /// App came to the foreground (emitted by the embedding app).
    AppLaunch,
    ProofCreated,
    ProofVerified,
    LockdownEngaged,
    LockdownUnlockAttempt,
    LockdownUnlocked,
    TrustedDeviceEnrolled,
    TrustedDeviceRemoved,
    VaultLocked,
    VaultUnlocked,
    RecoveryAssistantRequested,
    SecurityWarning,
}

impl std::fmt::Display for IncidentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::AppLaunch => "appLaunch",
            Self::ProofCreated => "proofCreated",
            Self::ProofVerified => "proofVerified",
            Self::LockdownEngaged => "lockdownEngaged",
            Self::LockdownUnlockAttempt => "lockdownUnlockAttempt",
            Self::LockdownUnlocked => "lockdownUnlocked",
            Self::TrustedDeviceEnrolled => "trustedDeviceEnrolled",
            Self::TrustedDeviceRemoved => "trustedDeviceRemoved",
            Self::VaultLocked => "vaultLocked",
            Self::VaultUnlocked => "vaultUnlocked",
            Self::RecoveryAssistantRequested => "recoveryAssistantRequested",
            Self::SecurityWarning => "securityWarning",
        };
        f.write_str(label)
    }
}

/// Severity of an incident event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// A single entry in the append-only incident trail.
///
/// Created once, never mutated, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentEvent {
    pub id: EventId,
    pub kind: IncidentKind,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    /// Free-form context (e.g. the record id a proof event refers to).
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl IncidentEvent {
    pub fn new(kind: IncidentKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            id: EventId::new(),
            kind,
            severity,
            timestamp: Utc::now(),
            message: message.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Attach one metadata entry, builder-style.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Security mode of the lockdown machinery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LockdownMode {
    /// Normal operation.
    Unlocked,
    /// Panic engaged: the vault and other sensitive operations are blocked.
    Locked,
    /// Locked, with an unlock attempt waiting on re-authentication.
    AwaitingReauth,
}

/// High-level lockdown state snapshot.
///
/// `engaged_at` is set on panic engagement and retained until the next
/// successful unlock; `last_unlock_at` updates only on a successful
/// transition back to `Unlocked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockdownState {
    pub mode: LockdownMode,
    pub engaged_at: Option<DateTime<Utc>>,
    pub last_unlock_at: Option<DateTime<Utc>>,
}

impl Default for LockdownState {
    fn default() -> Self {
        Self {
            mode: LockdownMode::Unlocked,
            engaged_at: None,
            last_unlock_at: None,
        }
    }
}

/// Enrollment status of a trusted device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrustedDeviceStatus {
    Active,
    Revoked,
}

/// A locally-enrolled trusted device.
///
/// The registry is append/mutate-only: devices are never physically removed,
/// revocation flips `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustedDevice {
    pub id: DeviceId,
    pub display_name: String,
    pub enrolled_at: DateTime<Utc>,
    pub status: TrustedDeviceStatus,
}

impl TrustedDevice {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            id: DeviceId::new(),
            display_name: display_name.into(),
            enrolled_at: Utc::now(),
            status: TrustedDeviceStatus::Active,
        }
    }
}

/// Hash algorithm used for proof content hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HashAlgorithm {
    Sha256,
}

/// Supported signature schemes for content-authenticity proofs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SignatureAlgorithm {
    /// Edwards-curve scheme; 32-byte public keys, 64-byte signatures.
    Ed25519,
    /// NIST P-256 ECDSA with SHA-256; ASN.1 DER signatures.
    P256,
}

/// Current proof payload schema version.
pub const PROOF_SCHEMA_VERSION: u32 = 1;

/// A portable, verifiable proof payload for a given content hash.
///
/// This is what can be exported and verified elsewhere. Immutable once
/// created; byte fields serialize as hex strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofPayload {
    /// Schema version for forward compatibility.
    pub version: u32,
    pub hash_algorithm: HashAlgorithm,
    /// Raw hash bytes of the underlying content.
    #[serde(with = "hex::serde")]
    pub content_hash: Vec<u8>,
    pub signature_algorithm: SignatureAlgorithm,
    /// Raw public key bytes of the signer.
    #[serde(with = "hex::serde")]
    pub signer_public_key: Vec<u8>,
    /// Signature over the canonical signing message.
    #[serde(with = "hex::serde")]
    pub signature: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

impl ProofPayload {
    /// Serialize the payload to portable JSON bytes.
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Parse a payload previously exported with [`ProofPayload::to_json`].
    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

/// Locally stored record of a proof created for an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofRecord {
    pub id: ProofId,
    /// Optional user-facing label (filename, note, ...).
    pub label: Option<String>,
    /// Optional original media type, kept for UX only.
    pub media_type: Option<String>,
    pub payload: ProofPayload,
}

/// Category of a vault item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VaultItemKind {
    Proof,
    Note,
    Blob,
}

/// Index entry for an item stored in the encrypted vault.
///
/// Encryption-at-rest is handled by the vault itself; this is the logical
/// record and carries no ciphertext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultItem {
    pub id: VaultItemId,
    pub kind: VaultItemKind,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Opaque pointer to the ciphertext blob (file name inside the vault).
    pub reference: Option<String>,
}
