//! Export configuration
//!
//! Settings are resolved in layers: built-in defaults, then an optional JSON
//! file, then whatever the command line (flags or environment) overrides.
//! [`ExportConfig::validate`] runs once on the merged result.

use crate::error::{ExportError, ExportResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default PVWA base URL
pub const DEFAULT_BASE_URL: &str = "https://pvwa.example.com";

/// Default principal, any user with auditor rights on the recordings safe
pub const DEFAULT_USERNAME: &str = "svc-session-checker";

/// Default authentication provider segment in `/auth/<provider>/Logon`
pub const DEFAULT_AUTH_PROVIDER: &str = "CyberArk";

/// Default root directory for exported recordings
pub const DEFAULT_OUTPUT_DIR: &str = "downloaded_recordings";

/// Default reference year for month queries
pub const DEFAULT_YEAR: i32 = 2024;

/// Configuration for one export run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Root endpoint of the PVWA API
    pub base_url: String,
    /// Principal used to log on
    pub username: String,
    /// Authentication provider (CyberArk, LDAP, RADIUS, ...)
    pub auth_provider: String,
    /// Directory that receives one sub-directory per exported month
    pub output_dir: PathBuf,
    /// Year the month ranges are computed for
    pub year: i32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            username: DEFAULT_USERNAME.to_string(),
            auth_provider: DEFAULT_AUTH_PROVIDER.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            year: DEFAULT_YEAR,
        }
    }
}

impl ExportConfig {
    /// Load configuration from a JSON file; absent keys keep their defaults
    pub fn from_file(path: &Path) -> ExportResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ExportError::config(format!("cannot read config file {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            ExportError::config(format!("invalid config file {}: {}", path.display(), e))
        })
    }

    /// Set the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the username
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Set the authentication provider
    pub fn with_auth_provider(mut self, provider: impl Into<String>) -> Self {
        self.auth_provider = provider.into();
        self
    }

    /// Set the output root directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the reference year
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = year;
        self
    }

    /// Check that everything needed to start a session is present
    pub fn validate(&self) -> ExportResult<()> {
        let base_url = self.base_url.trim();
        if base_url.is_empty() {
            return Err(ExportError::config("baseURL cannot be empty"));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ExportError::config(format!(
                "baseURL must start with http:// or https://, got '{}'",
                base_url
            )));
        }
        if self.username.trim().is_empty() {
            return Err(ExportError::config("username cannot be empty"));
        }
        if self.auth_provider.trim().is_empty() {
            return Err(ExportError::config("auth provider cannot be empty"));
        }
        if !(1970..=9999).contains(&self.year) {
            return Err(ExportError::config(format!(
                "year must be between 1970 and 9999, got {}",
                self.year
            )));
        }
        Ok(())
    }

    /// Base URL without a trailing slash, ready for path concatenation
    pub fn api_root(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }

    /// Output directory for one calendar month
    pub fn month_dir(&self, month: u32) -> PathBuf {
        self.output_dir.join(month.to_string())
    }

    /// Output directory for the unfiltered export
    pub fn all_dir(&self) -> PathBuf {
        self.output_dir.join("all")
    }
}
