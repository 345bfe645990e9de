//! Per-recording metadata export
//!
//! Each recording is written to `<SessionID>.json` with four-space
//! indentation. Serialization is deterministic, so exporting the same data
//! twice produces byte-identical files.

use crate::error::{ExportError, ExportResult};
use crate::recording::{Recording, RecordingSet};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Path of the metadata file for a recording
pub fn metadata_path(output_dir: &Path, recording: &Recording) -> ExportResult<PathBuf> {
    Ok(output_dir.join(format!("{}.json", recording.file_stem()?)))
}

/// Serialize one recording as indented JSON
pub fn to_pretty_json(recording: &Recording) -> ExportResult<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    recording
        .serialize(&mut serializer)
        .map_err(|source| ExportError::Json {
            session_id: recording.session_id.clone(),
            source,
        })?;
    Ok(buffer)
}

/// Write the metadata of every recording in `set` into `output_dir`
///
/// Existing files are overwritten. The first failure stops the export; files
/// written before it stay on disk. Returns the number of files written.
pub async fn export_metadata(output_dir: &Path, set: &RecordingSet) -> ExportResult<usize> {
    info!(
        directory = %output_dir.display(),
        count = set.len(),
        "saving recordings to JSON"
    );

    fs::create_dir_all(output_dir)
        .await
        .map_err(|e| ExportError::io(output_dir, e))?;

    let mut written = 0;
    for recording in set {
        let path = metadata_path(output_dir, recording)?;
        let json = to_pretty_json(recording)?;
        fs::write(&path, json)
            .await
            .map_err(|e| ExportError::io(&path, e))?;
        debug!(file = %path.display(), "saved recording JSON");
        written += 1;
    }

    Ok(written)
}
