//! The `entrada.json` document and its atomic writer.
//!
//! Writes go to `<path>.tmp` in the same directory and are renamed over the
//! target, so readers never observe a half-written document.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use signalboard_core::domain::SignalRecord;

use crate::assembler::BatchOutcome;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write {path}: {reason}")]
    WriteFailure { path: PathBuf, reason: String },
}

/// Top-level output document. Field names are fixed by the dashboards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryDocument {
    /// Short-horizon mode is disabled; always empty.
    pub swing: Vec<SignalRecord>,
    pub posicional: Vec<SignalRecord>,
    pub total_moedas: usize,
    pub total_processadas: usize,
    /// RFC 3339 with the configured offset, second precision.
    pub ultima_atualizacao: String,
}

impl EntryDocument {
    pub fn from_outcome(outcome: &BatchOutcome) -> Self {
        Self {
            swing: Vec::new(),
            posicional: outcome.records.clone(),
            total_moedas: outcome.total_instruments,
            total_processadas: outcome.processed(),
            ultima_atualizacao: outcome
                .finished_at
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, false),
        }
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Serialize `doc` and atomically replace `path`. Parent directories are
/// created as needed.
pub fn write_document(doc: &EntryDocument, path: &Path) -> Result<(), OutputError> {
    let fail = |reason: String| OutputError::WriteFailure {
        path: path.to_path_buf(),
        reason,
    };

    let json = serde_json::to_string_pretty(doc).map_err(|e| fail(format!("serialize: {e}")))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| fail(format!("create {}: {e}", parent.display())))?;
    }

    let tmp = tmp_path(path);
    if let Err(e) = fs::write(&tmp, json) {
        let _ = fs::remove_file(&tmp);
        return Err(fail(format!("write temp file: {e}")));
    }

    // Atomic rename
    fs::rename(&tmp, path).map_err(|e| {
        // Clean up temp file on rename failure
        let _ = fs::remove_file(&tmp);
        fail(format!("atomic rename failed: {e}"))
    })?;

    info!(
        path = %path.display(),
        entries = doc.posicional.len(),
        "entry document written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tmp_path_appends_suffix() {
        assert_eq!(
            tmp_path(Path::new("data/entrada.json")),
            PathBuf::from("data/entrada.json.tmp")
        );
    }
}
