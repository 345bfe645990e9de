//! Error types for PVWA recording export
//!
//! Every failure in the export is fatal to the run. Inner components return
//! [`ExportError`] with enough context (offset, session ID, path, URL) to
//! diagnose the problem without retrying; the caller decides what to do next.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Main error type for PVWA recording export
#[derive(Error, Debug)]
pub enum ExportError {
    /// Missing or invalid configuration (base URL, username, password, months)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential exchange failed or returned a non-success response
    #[error("Authentication failed{}: {message}", status_suffix(.status))]
    Auth {
        status: Option<u16>,
        message: String,
    },

    /// Network-level failure while sending a request or reading its response
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Network-level failure in the middle of a streamed response body
    #[error("Stream from {url} broke after {bytes} bytes: {source}")]
    Stream {
        url: String,
        bytes: u64,
        #[source]
        source: std::io::Error,
    },

    /// Unexpected status code or malformed response body
    #[error("Unexpected response from {url}{}: {message}", status_suffix(.status))]
    Protocol {
        url: String,
        status: Option<u16>,
        message: String,
    },

    /// Local file create/write failure
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Session ID that cannot be used as a file name or URL path segment
    #[error("Recording has an unusable session ID {session_id:?}: {reason}")]
    SessionId {
        session_id: String,
        reason: &'static str,
    },

    /// Recording metadata could not be serialized
    #[error("Failed to serialize recording {session_id}: {source}")]
    Json {
        session_id: String,
        #[source]
        source: serde_json::Error,
    },

    /// A listing page failed; carries the offset of the failing request
    #[error("Could not retrieve recordings at offset {offset}")]
    Page {
        offset: usize,
        #[source]
        source: Box<ExportError>,
    },

    /// Downloading one recording failed
    #[error("Could not download recording {session_id}")]
    Download {
        session_id: String,
        #[source]
        source: Box<ExportError>,
    },
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {})", s)).unwrap_or_default()
}

impl ExportError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a new authentication error
    pub fn auth(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Auth {
            status,
            message: message.into(),
        }
    }

    /// Create a new transport error for the given URL
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    /// Create a new protocol error
    pub fn protocol(url: impl Into<String>, status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Protocol {
            url: url.into(),
            status,
            message: message.into(),
        }
    }

    /// Create a new IO error tied to a local path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a new session ID error
    pub fn session_id(session_id: impl Into<String>, reason: &'static str) -> Self {
        Self::SessionId {
            session_id: session_id.into(),
            reason,
        }
    }

    /// Wrap an error with the listing offset it happened at
    pub fn at_offset(self, offset: usize) -> Self {
        Self::Page {
            offset,
            source: Box::new(self),
        }
    }

    /// Wrap an error with the recording it happened for
    pub fn for_recording(self, session_id: impl Into<String>) -> Self {
        Self::Download {
            session_id: session_id.into(),
            source: Box::new(self),
        }
    }

    /// HTTP status attached to this error, looking through context wrappers
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { status, .. } | Self::Protocol { status, .. } => *status,
            Self::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            Self::Page { source, .. } | Self::Download { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Check if this is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
