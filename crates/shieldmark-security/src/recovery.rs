// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recovery assistant — advisory guidance derived from the incident timeline.
//
// Advisory only: this module cannot approve devices or change security
// state. It summarizes the current situation and suggests a checklist.

use shieldmark_core::types::{IncidentEvent, IncidentKind, LockdownMode, Severity};

use crate::audit::IncidentLog;
use crate::lockdown::LockdownController;

/// How many recent events guidance generation looks at.
const TIMELINE_WINDOW: usize = 50;

/// Generate a markdown recovery summary + checklist from the current
/// lockdown mode and recent incident events, and record that guidance was
/// requested.
pub async fn generate_guidance(lockdown: &LockdownController, incidents: &IncidentLog) -> String {
    let events = incidents.list_newest_first(Some(TIMELINE_WINDOW)).await;
    let state = lockdown.state().await;

    let mut lines = vec![
        "## Summary".to_string(),
        format!("- Lockdown state: {}", mode_label(state.mode)),
        format!("- Recent events analyzed: {}", events.len()),
        most_recent_line(&events),
        String::new(),
        "## Recovery checklist (suggested)".to_string(),
        "- Confirm your device is in your physical possession and on a trusted network."
            .to_string(),
    ];

    if state.mode != LockdownMode::Unlocked {
        lines.push("- Keep the vault locked until you finish verification steps.".to_string());
        lines.push(
            "- Attempt unlock only after verifying device integrity (OS updates, no suspicious profiles)."
                .to_string(),
        );
    } else {
        lines.push("- Review the incident timeline for any unexpected activity.".to_string());
    }

    let device_activity = events.iter().any(|event| {
        matches!(
            event.kind,
            IncidentKind::TrustedDeviceEnrolled | IncidentKind::TrustedDeviceRemoved
        )
    });
    if device_activity {
        lines.push(
            "- Review trusted devices and revoke anything you don't recognize.".to_string(),
        );
    } else {
        lines.push(
            "- Consider enrolling this device as trusted once you're confident it's secure."
                .to_string(),
        );
    }

    lines.push(
        "- Rotate any impacted secrets outside the app (email, social, cloud) using official account settings."
            .to_string(),
    );
    lines.push(
        "- Enable multi-factor authentication where available (prefer hardware keys or passkeys)."
            .to_string(),
    );
    lines.push(
        "- After recovery, create fresh content proofs for new sensitive media.".to_string(),
    );

    incidents
        .append_best_effort(IncidentEvent::new(
            IncidentKind::RecoveryAssistantRequested,
            Severity::Info,
            "Recovery assistant guidance generated",
        ))
        .await;

    lines.join("\n")
}

fn mode_label(mode: LockdownMode) -> &'static str {
    match mode {
        LockdownMode::Unlocked => "unlocked",
        LockdownMode::Locked => "locked",
        LockdownMode::AwaitingReauth => "awaitingReauth",
    }
}

fn most_recent_line(events: &[IncidentEvent]) -> String {
    match events.first() {
        Some(event) => format!(
            "- Most recent: {} at {}",
            event.kind,
            event.timestamp.to_rfc3339()
        ),
        None => "- Most recent: none".to_string(),
    }
}
