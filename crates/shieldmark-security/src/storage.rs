// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Atomic full-document persistence.
//
// Every durable write in the engine is a write-temp-then-rename of the
// complete document, so a crash mid-write can never leave a truncated or
// mixed-version file observable on the next read. Do not optimize this to
// partial writes.

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use shieldmark_core::error::Result;

/// Load a JSON document from `path`.
///
/// Returns `Ok(None)` if the file does not exist (first launch). A file that
/// exists but cannot be parsed is an error: silently resetting a durable
/// document would lose an audit trail or fail a lockdown snapshot open.
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Serialize `value` to JSON and write it atomically to `path`.
pub async fn save_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec(value)?;
    write_atomic(path, &bytes).await
}

/// Write raw bytes to `path` via a temp file and rename in the same
/// directory.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    debug!(path = %path.display(), len = bytes.len(), "atomic write complete");
    Ok(())
}
