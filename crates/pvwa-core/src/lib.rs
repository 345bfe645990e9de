//! PVWA recording export core library
//!
//! This crate retrieves privileged session recordings from a PVWA endpoint,
//! month by month, and stores each recording's metadata and video on disk.
//! Everything runs sequentially and every failure is returned to the caller.

pub mod config;
pub mod download;
pub mod error;
pub mod listing;
pub mod metadata;
pub mod months;
pub mod pipeline;
pub mod recording;
pub mod session;

// Re-export commonly used types
pub use config::ExportConfig;
pub use download::{DownloadProgress, DownloadSummary, NoProgress, download_recordings};
pub use error::{ExportError, ExportResult};
pub use listing::{MAX_PAGE_SIZE, RecordingQuery, RecordingSource, SortOrder, list_recordings, query_all};
pub use metadata::export_metadata;
pub use months::{MonthRange, parse_months};
pub use pipeline::{ExportSummary, export_all, export_month};
pub use recording::{Recording, RecordingFile, RecordingPage, RecordingSet};
pub use session::ApiSession;
