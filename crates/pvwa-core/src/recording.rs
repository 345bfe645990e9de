//! Recording data structures
//!
//! Field names mirror the PVWA JSON payload verbatim, so the same types are
//! used to decode listing responses and to write the exported metadata files.

use crate::error::{ExportError, ExportResult};
use serde::{Deserialize, Deserializer, Serialize};

/// Decode an explicit `null` as the field's default value
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Metadata about a single captured privileged session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Recording {
    #[serde(rename = "SessionID", deserialize_with = "null_as_default")]
    pub session_id: String,
    #[serde(rename = "SessionGuid", deserialize_with = "null_as_default")]
    pub session_guid: String,
    #[serde(rename = "SafeName", deserialize_with = "null_as_default")]
    pub safe_name: String,
    #[serde(rename = "FileName", deserialize_with = "null_as_default")]
    pub file_name: String,
    /// Session start, epoch seconds
    #[serde(rename = "Start", deserialize_with = "null_as_default")]
    pub start: i64,
    /// Session end, epoch seconds
    #[serde(rename = "End", deserialize_with = "null_as_default")]
    pub end: i64,
    /// Duration in seconds
    #[serde(rename = "Duration", deserialize_with = "null_as_default")]
    pub duration: i64,
    #[serde(rename = "User", deserialize_with = "null_as_default")]
    pub user: String,
    #[serde(rename = "RemoteMachine", deserialize_with = "null_as_default")]
    pub remote_machine: String,
    #[serde(rename = "AccountUsername", deserialize_with = "null_as_default")]
    pub account_username: String,
    #[serde(rename = "AccountPlatformID", deserialize_with = "null_as_default")]
    pub account_platform_id: String,
    #[serde(rename = "AccountAddress", deserialize_with = "null_as_default")]
    pub account_address: String,
    /// Activity entries are passed through untouched
    #[serde(rename = "RecordedActivities", deserialize_with = "null_as_default")]
    pub recorded_activities: Vec<serde_json::Value>,
    #[serde(rename = "ConnectionComponentID", deserialize_with = "null_as_default")]
    pub connection_component_id: String,
    #[serde(rename = "FromIP", deserialize_with = "null_as_default")]
    pub from_ip: String,
    #[serde(rename = "Client", deserialize_with = "null_as_default")]
    pub client: String,
    #[serde(rename = "RiskScore", deserialize_with = "null_as_default")]
    pub risk_score: f64,
    #[serde(rename = "Severity", deserialize_with = "null_as_default")]
    pub severity: String,
    #[serde(rename = "RecordingFiles", deserialize_with = "null_as_default")]
    pub recording_files: Vec<RecordingFile>,
    #[serde(rename = "VideoSize", deserialize_with = "null_as_default")]
    pub video_size: i64,
    #[serde(rename = "TextSize", deserialize_with = "null_as_default")]
    pub text_size: i64,
    #[serde(rename = "DetailsUrl", deserialize_with = "null_as_default")]
    pub details_url: String,
}

impl Recording {
    /// Create a recording with only its identifier set
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            ..Self::default()
        }
    }

    /// Session ID checked for use as a file stem and URL path segment
    ///
    /// The ID comes from the server. Anything that could leave the output
    /// directory or change the request path is rejected.
    pub fn file_stem(&self) -> ExportResult<&str> {
        let id = self.session_id.as_str();
        let reason = if id.is_empty() {
            Some("empty")
        } else if id == "." || id.contains("..") {
            Some("contains a relative path component")
        } else if id.contains(['/', '\\']) {
            Some("contains a path separator")
        } else if id.contains(['?', '#', '%']) {
            Some("contains a URL delimiter")
        } else if id.chars().any(char::is_control) {
            Some("contains a control character")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(ExportError::session_id(id, reason)),
            None => Ok(id),
        }
    }
}

/// One media or log file attached to a recording
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingFile {
    #[serde(rename = "FileName", deserialize_with = "null_as_default")]
    pub file_name: String,
    #[serde(rename = "RecordingType", deserialize_with = "null_as_default")]
    pub recording_type: i64,
    #[serde(rename = "LastReviewBy", deserialize_with = "null_as_default")]
    pub last_review_by: String,
    #[serde(rename = "LastReviewDate", deserialize_with = "null_as_default")]
    pub last_review_date: i64,
    #[serde(rename = "FileSize", deserialize_with = "null_as_default")]
    pub file_size: i64,
    #[serde(rename = "CompressedFileSize", deserialize_with = "null_as_default")]
    pub compressed_file_size: i64,
    #[serde(rename = "Format", deserialize_with = "null_as_default")]
    pub format: String,
}

/// A single decoded `GET /recordings` response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingPage {
    #[serde(rename = "Recordings", deserialize_with = "null_as_default")]
    pub recordings: Vec<Recording>,
    /// Count of all recordings matching the query, across pages
    #[serde(rename = "Total", deserialize_with = "null_as_default")]
    pub total: usize,
}

/// All recordings matching a query, accumulated across pages
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingSet {
    pub recordings: Vec<Recording>,
    /// Server-reported total from the last page fetched
    pub total: usize,
}

impl RecordingSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one page and take over its reported total
    pub fn extend_page(&mut self, page: RecordingPage) {
        self.recordings.extend(page.recordings);
        self.total = page.total;
    }

    /// Number of recordings actually retrieved
    pub fn len(&self) -> usize {
        self.recordings.len()
    }

    /// Check if no recordings were retrieved
    pub fn is_empty(&self) -> bool {
        self.recordings.is_empty()
    }

    /// Iterate over the retrieved recordings in server order
    pub fn iter(&self) -> std::slice::Iter<'_, Recording> {
        self.recordings.iter()
    }
}

impl<'a> IntoIterator for &'a RecordingSet {
    type Item = &'a Recording;
    type IntoIter = std::slice::Iter<'a, Recording>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
