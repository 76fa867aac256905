//! # Artifact Emission
//!
//! Writes the timeline as a JavaScript module and as JSON, and points a
//! presentation document at the analyzed audio file.

pub mod document;
pub mod json;
pub mod script;

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{EmitError, Result};

/// Distinguishes temporary files of overlapping writes within one process
static WRITE_SEQUENCE: AtomicU64 = AtomicU64::new(0);

pub use document::DocumentPatcher;

/// Replace `path` with `contents` via a temporary sibling unique to this call
///
/// Concurrent writes to the same file never interleave their bytes, whether
/// they come from other processes or from tasks of this one. The last rename
/// wins.
pub async fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_string());
    let sequence = WRITE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let temp_path = path.with_file_name(format!(
        ".{}.{}.{}.tmp",
        file_name,
        std::process::id(),
        sequence
    ));

    let write_failed = |e: std::io::Error| EmitError::WriteFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    tokio::fs::write(&temp_path, contents).await.map_err(write_failed)?;
    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(write_failed(e).into());
    }

    tracing::debug!("Wrote {} ({} bytes)", path.display(), contents.len());
    Ok(())
}
