//! CLI argument definitions using clap

use clap::Parser;
use pvwa_core::ExportConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pvwa-export")]
#[command(about = "Export PSM session recordings from PVWA, one directory per month")]
#[command(
    long_about = r#"Export PSM session recordings from PVWA, one directory per month

For every selected month the recordings of that month are listed, their
metadata is written to <SessionID>.json and their video to <SessionID>.avi
under <output-dir>/<month>/.

The password is read from PVWA_PASSWORD, or prompted for if it is not set.

EXAMPLES:
  pvwa-export --months 1-12
  pvwa-export --months 5,6,7 --username auditor
  pvwa-export --all --output-dir /srv/exports"#
)]
#[command(version)]
pub struct Cli {
    /// Optional JSON configuration file; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// The base URL for PVWA
    #[arg(long = "base-url", env = "PVWA_BASE_URL")]
    pub base_url: Option<String>,

    /// The username for a user with auditor rights
    #[arg(long, env = "PVWA_USERNAME")]
    pub username: Option<String>,

    /// Authentication provider used to log on (CyberArk, LDAP, RADIUS, ...)
    #[arg(long = "auth-provider")]
    pub auth_provider: Option<String>,

    /// Months to process (e.g. '5,6,7' or '1-12')
    #[arg(long, default_value = "1-12", conflicts_with = "all")]
    pub months: String,

    /// Export every recording without a time filter into <output-dir>/all
    #[arg(long)]
    pub all: bool,

    /// Year the months refer to
    #[arg(long)]
    pub year: Option<i32>,

    /// Root directory for exported recordings
    #[arg(long = "output-dir")]
    pub output_dir: Option<PathBuf>,
}

impl Cli {
    /// Merge flags over the base configuration (defaults or config file)
    pub fn apply_to(&self, mut config: ExportConfig) -> ExportConfig {
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url);
        }
        if let Some(username) = &self.username {
            config = config.with_username(username);
        }
        if let Some(provider) = &self.auth_provider {
            config = config.with_auth_provider(provider);
        }
        if let Some(year) = self.year {
            config = config.with_year(year);
        }
        if let Some(dir) = &self.output_dir {
            config = config.with_output_dir(dir);
        }
        config
    }
}
