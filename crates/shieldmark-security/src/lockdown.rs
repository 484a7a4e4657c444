// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Emergency lockdown — security mode state machine and trusted-device
// registry.
//
// Unlocked -> Locked -> AwaitingReauth -> Unlocked | Locked. Every unlock is
// forced through the explicit AwaitingReauth step; the machine never
// validates *how* re-auth succeeded — the authentication collaborator
// supplies that as a boolean, keeping transitions policy-agnostic and
// testable without biometric hardware.
//
// State and registry snapshots persist in the secret store after every
// transition, before the matching audit events are appended: state is
// durable independent of logging outcome.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use shieldmark_bridge::{DeviceAuthenticator, SecretStore};
use shieldmark_core::error::{Result, ShieldmarkError};
use shieldmark_core::types::{
    DeviceId, IncidentEvent, IncidentKind, LockdownMode, LockdownState, Severity, TrustedDevice,
    TrustedDeviceStatus,
};

use crate::audit::IncidentLog;

/// Secret-store key for the lockdown state snapshot.
const STATE_SECRET_KEY: &str = "lockdown.state";
/// Secret-store key for the trusted-device registry snapshot.
const DEVICES_SECRET_KEY: &str = "lockdown.trusted_devices";

struct Inner {
    state: LockdownState,
    devices: Vec<TrustedDevice>,
}

/// Owns the security mode and the trusted-device registry.
pub struct LockdownController {
    secrets: Arc<dyn SecretStore>,
    incidents: Arc<IncidentLog>,
    inner: Mutex<Inner>,
}

impl LockdownController {
    /// Load persisted state from the secret store, defaulting to unlocked
    /// with an empty registry when no snapshot exists yet.
    ///
    /// A snapshot that exists but cannot be parsed is an error: defaulting
    /// it would silently clear an engaged lockdown.
    pub fn open(secrets: Arc<dyn SecretStore>, incidents: Arc<IncidentLog>) -> Result<Self> {
        let state = match secrets.load_secret(STATE_SECRET_KEY)? {
            Some(bytes) => serde_json::from_slice(&bytes)?,
            None => LockdownState::default(),
        };
        let devices = match secrets.load_secret(DEVICES_SECRET_KEY)? {
            Some(bytes) => serde_json::from_slice(&bytes)?,
            None => Vec::new(),
        };

        debug!(mode = ?state.mode, devices = devices.len(), "lockdown state loaded");
        Ok(Self {
            secrets,
            incidents,
            inner: Mutex::new(Inner { state, devices }),
        })
    }

    /// Current state snapshot.
    pub async fn state(&self) -> LockdownState {
        self.inner.lock().await.state
    }

    /// Snapshot of the trusted-device registry, including revoked entries.
    pub async fn trusted_devices(&self) -> Vec<TrustedDevice> {
        self.inner.lock().await.devices.clone()
    }

    /// Engage panic mode: deny sensitive operations immediately.
    ///
    /// Allowed only from `Unlocked`.
    #[instrument(skip(self))]
    pub async fn engage_panic(&self, reason: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.state.mode != LockdownMode::Unlocked {
            return Err(ShieldmarkError::AlreadyLocked);
        }

        inner.state.mode = LockdownMode::Locked;
        inner.state.engaged_at = Some(Utc::now());
        self.persist_state(&inner.state)?;

        self.incidents
            .append_best_effort(IncidentEvent::new(
                IncidentKind::LockdownEngaged,
                Severity::Critical,
                reason,
            ))
            .await;
        self.incidents
            .append_best_effort(IncidentEvent::new(
                IncidentKind::VaultLocked,
                Severity::Critical,
                "Vault locked due to lockdown",
            ))
            .await;
        Ok(())
    }

    /// Start an unlock attempt: the caller must follow up with
    /// [`complete_unlock`](Self::complete_unlock) once re-authentication has
    /// resolved. Allowed only from `Locked`.
    #[instrument(skip(self))]
    pub async fn begin_unlock_attempt(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.state.mode != LockdownMode::Locked {
            return Err(ShieldmarkError::NotLocked);
        }

        inner.state.mode = LockdownMode::AwaitingReauth;
        self.persist_state(&inner.state)?;

        self.incidents
            .append_best_effort(IncidentEvent::new(
                IncidentKind::LockdownUnlockAttempt,
                Severity::Warning,
                "Unlock attempt started (awaiting re-auth)",
            ))
            .await;
        Ok(())
    }

    /// Resolve a pending unlock attempt with the re-authentication outcome.
    ///
    /// Allowed only from `AwaitingReauth`. On failure the machine returns to
    /// `Locked`, retaining the `engaged_at` of the original panic.
    #[instrument(skip(self))]
    pub async fn complete_unlock(&self, success: bool) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.state.mode != LockdownMode::AwaitingReauth {
            return Err(ShieldmarkError::NotAwaitingReauth);
        }

        if success {
            inner.state.mode = LockdownMode::Unlocked;
            inner.state.last_unlock_at = Some(Utc::now());
            self.persist_state(&inner.state)?;

            self.incidents
                .append_best_effort(IncidentEvent::new(
                    IncidentKind::LockdownUnlocked,
                    Severity::Info,
                    "Lockdown cleared",
                ))
                .await;
            self.incidents
                .append_best_effort(IncidentEvent::new(
                    IncidentKind::VaultUnlocked,
                    Severity::Info,
                    "Vault unlocked",
                ))
                .await;
        } else {
            inner.state.mode = LockdownMode::Locked;
            self.persist_state(&inner.state)?;

            self.incidents
                .append_best_effort(IncidentEvent::new(
                    IncidentKind::SecurityWarning,
                    Severity::Warning,
                    "Re-auth failed; vault remains locked",
                ))
                .await;
        }
        Ok(())
    }

    /// Run one full unlock round trip against the authentication
    /// collaborator and return whether it succeeded.
    ///
    /// A `false` resolution (failed, cancelled, or policy unavailable) is
    /// treated as a failed re-auth: the machine returns to `Locked`.
    pub async fn request_unlock(
        &self,
        authenticator: &dyn DeviceAuthenticator,
        reason: &str,
    ) -> Result<bool> {
        self.begin_unlock_attempt().await?;
        let passed = authenticator.authenticate(reason).await;
        self.complete_unlock(passed).await?;
        Ok(passed)
    }

    /// Enroll this device in the trusted registry. Allowed in any mode.
    #[instrument(skip(self))]
    pub async fn enroll_this_device(&self, display_name: &str) -> Result<TrustedDevice> {
        let mut inner = self.inner.lock().await;
        let device = TrustedDevice::new(display_name);
        inner.devices.push(device.clone());
        self.persist_devices(&inner.devices)?;

        self.incidents
            .append_best_effort(
                IncidentEvent::new(
                    IncidentKind::TrustedDeviceEnrolled,
                    Severity::Info,
                    format!("Trusted device enrolled: {display_name}"),
                )
                .with_metadata("deviceId", device.id.to_string()),
            )
            .await;
        Ok(device)
    }

    /// Revoke a trusted device. The entry stays in the registry with its
    /// status flipped; devices are never physically removed.
    #[instrument(skip(self))]
    pub async fn revoke_device(&self, id: DeviceId) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let device = inner
            .devices
            .iter_mut()
            .find(|device| device.id == id)
            .ok_or(ShieldmarkError::DeviceNotFound(id))?;

        device.status = TrustedDeviceStatus::Revoked;
        let name = device.display_name.clone();
        self.persist_devices(&inner.devices)?;

        self.incidents
            .append_best_effort(
                IncidentEvent::new(
                    IncidentKind::TrustedDeviceRemoved,
                    Severity::Warning,
                    format!("Trusted device revoked: {name}"),
                )
                .with_metadata("deviceId", id.to_string()),
            )
            .await;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    fn persist_state(&self, state: &LockdownState) -> Result<()> {
        let bytes = serde_json::to_vec(state)?;
        self.secrets.store_secret(STATE_SECRET_KEY, &bytes)
    }

    fn persist_devices(&self, devices: &[TrustedDevice]) -> Result<()> {
        let bytes = serde_json::to_vec(devices)?;
        self.secrets.store_secret(DEVICES_SECRET_KEY, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::pin::Pin;

    use shieldmark_bridge::MemorySecretStore;

    /// Authenticator double that resolves with a fixed outcome.
    struct FixedAuthenticator(bool);

    impl DeviceAuthenticator for FixedAuthenticator {
        fn authenticate<'a>(
            &'a self,
            _reason: &'a str,
        ) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
            Box::pin(std::future::ready(self.0))
        }
    }

    async fn make_controller(
        dir: &tempfile::TempDir,
    ) -> (Arc<MemorySecretStore>, Arc<IncidentLog>, LockdownController) {
        let secrets = Arc::new(MemorySecretStore::new());
        let incidents = Arc::new(
            IncidentLog::open(dir.path().join("incidents.json"))
                .await
                .expect("open incident log"),
        );
        let controller =
            LockdownController::open(secrets.clone(), incidents.clone()).expect("open lockdown");
        (secrets, incidents, controller)
    }

    #[tokio::test]
    async fn full_transition_cycle() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (_, _, controller) = make_controller(&dir).await;

        assert_eq!(controller.state().await.mode, LockdownMode::Unlocked);

        controller.engage_panic("panic button pressed").await.unwrap();
        assert_eq!(controller.state().await.mode, LockdownMode::Locked);

        controller.begin_unlock_attempt().await.unwrap();
        assert_eq!(controller.state().await.mode, LockdownMode::AwaitingReauth);

        controller.complete_unlock(false).await.unwrap();
        assert_eq!(controller.state().await.mode, LockdownMode::Locked);

        controller.begin_unlock_attempt().await.unwrap();
        controller.complete_unlock(true).await.unwrap();

        let state = controller.state().await;
        assert_eq!(state.mode, LockdownMode::Unlocked);
        assert!(state.last_unlock_at.is_some());
    }

    #[tokio::test]
    async fn failed_reauth_keeps_original_engaged_at() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (_, _, controller) = make_controller(&dir).await;

        controller.engage_panic("panic").await.unwrap();
        let engaged_at = controller.state().await.engaged_at;
        assert!(engaged_at.is_some());

        controller.begin_unlock_attempt().await.unwrap();
        controller.complete_unlock(false).await.unwrap();

        let state = controller.state().await;
        assert_eq!(state.mode, LockdownMode::Locked);
        assert_eq!(state.engaged_at, engaged_at);
    }

    #[tokio::test]
    async fn guards_reject_wrong_states() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (_, _, controller) = make_controller(&dir).await;

        // Unlocked: only engage_panic is legal.
        assert!(matches!(
            controller.begin_unlock_attempt().await,
            Err(ShieldmarkError::NotLocked)
        ));
        assert!(matches!(
            controller.complete_unlock(true).await,
            Err(ShieldmarkError::NotAwaitingReauth)
        ));

        controller.engage_panic("panic").await.unwrap();

        // Locked: engaging again fails and leaves state unchanged.
        let before = controller.state().await;
        assert!(matches!(
            controller.engage_panic("again").await,
            Err(ShieldmarkError::AlreadyLocked)
        ));
        assert_eq!(controller.state().await, before);

        assert!(matches!(
            controller.complete_unlock(true).await,
            Err(ShieldmarkError::NotAwaitingReauth)
        ));

        controller.begin_unlock_attempt().await.unwrap();
        assert!(matches!(
            controller.begin_unlock_attempt().await,
            Err(ShieldmarkError::NotLocked)
        ));
    }

    #[tokio::test]
    async fn transitions_emit_expected_events() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (_, incidents, controller) = make_controller(&dir).await;

        controller.engage_panic("panic").await.unwrap();
        controller.begin_unlock_attempt().await.unwrap();
        controller.complete_unlock(true).await.unwrap();

        let kinds: Vec<IncidentKind> = incidents
            .list_newest_first(None)
            .await
            .into_iter()
            .map(|e| e.kind)
            .collect();
        for expected in [
            IncidentKind::LockdownEngaged,
            IncidentKind::VaultLocked,
            IncidentKind::LockdownUnlockAttempt,
            IncidentKind::LockdownUnlocked,
            IncidentKind::VaultUnlocked,
        ] {
            assert!(kinds.contains(&expected), "missing event {expected}");
        }
    }

    #[tokio::test]
    async fn state_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (secrets, incidents, controller) = make_controller(&dir).await;

        controller.engage_panic("panic").await.unwrap();
        drop(controller);

        let reopened = LockdownController::open(secrets, incidents).unwrap();
        assert_eq!(reopened.state().await.mode, LockdownMode::Locked);
        assert!(reopened.state().await.engaged_at.is_some());
    }

    #[tokio::test]
    async fn corrupt_state_snapshot_fails_open() {
        let dir = tempfile::tempdir().expect("tempdir");
        let secrets = Arc::new(MemorySecretStore::new());
        let incidents = Arc::new(
            IncidentLog::open(dir.path().join("incidents.json"))
                .await
                .unwrap(),
        );
        secrets.store_secret(STATE_SECRET_KEY, b"{garbage").unwrap();

        assert!(LockdownController::open(secrets, incidents).is_err());
    }

    #[tokio::test]
    async fn enroll_and_revoke_devices() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (_, _, controller) = make_controller(&dir).await;

        let device = controller.enroll_this_device("Maya's phone").await.unwrap();
        assert_eq!(device.status, TrustedDeviceStatus::Active);

        controller.revoke_device(device.id).await.unwrap();

        let devices = controller.trusted_devices().await;
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].status, TrustedDeviceStatus::Revoked);
    }

    #[tokio::test]
    async fn enrollment_is_allowed_while_locked() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (_, _, controller) = make_controller(&dir).await;

        controller.engage_panic("panic").await.unwrap();
        let device = controller.enroll_this_device("backup tablet").await.unwrap();
        assert_eq!(device.status, TrustedDeviceStatus::Active);
    }

    #[tokio::test]
    async fn revoking_unknown_device_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (_, _, controller) = make_controller(&dir).await;

        controller.enroll_this_device("known").await.unwrap();
        let before = controller.trusted_devices().await;

        let missing = DeviceId::new();
        assert!(matches!(
            controller.revoke_device(missing).await,
            Err(ShieldmarkError::DeviceNotFound(id)) if id == missing
        ));
        assert_eq!(controller.trusted_devices().await, before);
    }

    #[tokio::test]
    async fn request_unlock_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (_, _, controller) = make_controller(&dir).await;

        controller.engage_panic("panic").await.unwrap();

        let denied = controller
            .request_unlock(&FixedAuthenticator(false), "confirm it's you")
            .await
            .unwrap();
        assert!(!denied);
        assert_eq!(controller.state().await.mode, LockdownMode::Locked);

        let granted = controller
            .request_unlock(&FixedAuthenticator(true), "confirm it's you")
            .await
            .unwrap();
        assert!(granted);
        assert_eq!(controller.state().await.mode, LockdownMode::Unlocked);
    }
}
