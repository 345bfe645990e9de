//! One export pass: list, write metadata, download videos

use crate::config::ExportConfig;
use crate::download::{DownloadProgress, DownloadSummary, download_recordings};
use crate::error::ExportResult;
use crate::listing::{list_recordings, query_all};
use crate::metadata::export_metadata;
use crate::months::MonthRange;
use crate::recording::RecordingSet;
use crate::session::ApiSession;
use chrono::Month;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// What one export pass produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// Directory the files were written to
    pub output_dir: PathBuf,
    /// Total the server reported for the query
    pub reported_total: usize,
    /// Recordings actually listed
    pub retrieved: usize,
    /// Metadata files written
    pub exported: usize,
    pub downloads: DownloadSummary,
}

/// Export every recording of `month` (in the configured year)
///
/// Files land in `<output_dir>/<month number>/`.
#[instrument(skip(session, config, progress), fields(year = config.year))]
pub async fn export_month(
    session: &ApiSession,
    config: &ExportConfig,
    month: Month,
    progress: &dyn DownloadProgress,
) -> ExportResult<ExportSummary> {
    let range = MonthRange::new(config.year, month)?;
    info!(month = range.number(), from = range.from, to = range.to, "processing month");

    let set = list_recordings(session, &range.query()).await?;
    info!(
        month = range.number(),
        count = set.total,
        retrieved = set.len(),
        "found recordings"
    );

    export_set(session, &config.month_dir(range.number()), &set, progress).await
}

/// Export every recording regardless of time, into `<output_dir>/all/`
#[instrument(skip(session, config, progress))]
pub async fn export_all(
    session: &ApiSession,
    config: &ExportConfig,
    progress: &dyn DownloadProgress,
) -> ExportResult<ExportSummary> {
    let set = list_recordings(session, &query_all()).await?;
    info!(count = set.total, retrieved = set.len(), "found recordings");

    export_set(session, &config.all_dir(), &set, progress).await
}

async fn export_set(
    session: &ApiSession,
    output_dir: &Path,
    set: &RecordingSet,
    progress: &dyn DownloadProgress,
) -> ExportResult<ExportSummary> {
    let exported = export_metadata(output_dir, set).await?;
    let downloads = download_recordings(session, output_dir, set, progress).await?;

    Ok(ExportSummary {
        output_dir: output_dir.to_path_buf(),
        reported_total: set.total,
        retrieved: set.len(),
        exported,
        downloads,
    })
}
