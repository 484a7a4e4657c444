// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Incident trail — append-only JSON log of every security-relevant event.
//
// The full log is cached in memory and rewritten atomically on each append.
// Write cost is bounded by log size, and a concurrent reader of the file can
// never observe a partial document.

use std::path::PathBuf;

use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use shieldmark_core::error::Result;
use shieldmark_core::types::IncidentEvent;

use crate::storage;

/// Append-only incident log backed by a single JSON file.
///
/// Events are immutable: they are appended, listed, and counted — never
/// mutated or deleted.
pub struct IncidentLog {
    path: PathBuf,
    cached: Mutex<Vec<IncidentEvent>>,
}

impl IncidentLog {
    /// Open (or create) the incident log at `path`.
    ///
    /// A missing file is an empty log. A file that exists but cannot be
    /// parsed is an error — the trail is never silently reset.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let cached: Vec<IncidentEvent> = storage::load_json(&path).await?.unwrap_or_default();

        debug!(events = cached.len(), "incident log opened");
        Ok(Self {
            path,
            cached: Mutex::new(cached),
        })
    }

    /// Record a new incident event.
    #[instrument(skip(self, event), fields(kind = %event.kind, severity = ?event.severity))]
    pub async fn append(&self, event: IncidentEvent) -> Result<()> {
        let mut cached = self.cached.lock().await;
        cached.push(event);
        storage::save_json_atomic(&self.path, &*cached).await?;

        debug!("incident event recorded");
        Ok(())
    }

    /// Record an event accompanying a mutation that is already durable.
    ///
    /// A failed append must never roll back or block the security operation
    /// it accompanies — failing to log a lockdown engagement must not
    /// prevent the lockdown itself. Failures are surfaced via `warn!` only.
    pub async fn append_best_effort(&self, event: IncidentEvent) {
        let kind = event.kind;
        if let Err(error) = self.append(event).await {
            warn!(%kind, %error, "failed to append incident event");
        }
    }

    /// Snapshot of events, most recent first, optionally capped at `limit`.
    pub async fn list_newest_first(&self, limit: Option<usize>) -> Vec<IncidentEvent> {
        let cached = self.cached.lock().await;
        let mut events: Vec<IncidentEvent> = cached.clone();
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        if let Some(limit) = limit {
            events.truncate(limit);
        }
        events
    }

    /// Total number of events in the log.
    pub async fn count(&self) -> usize {
        self.cached.lock().await.len()
    }
}
