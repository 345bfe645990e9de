//! Top-level export driver
//!
//! This is the single place that decides what a failure means for the run:
//! any error ends the export and is reported with its context.

use crate::args::Cli;
use crate::password::read_password;
use crate::progress::TerminalProgress;
use anyhow::{Context, Result};
use pvwa_core::{ApiSession, ExportConfig, ExportSummary, export_all, export_month, parse_months};
use tracing::info;

/// Resolve the configuration from file and flags
pub fn resolve_config(cli: &Cli) -> Result<ExportConfig> {
    let base = match &cli.config {
        Some(path) => ExportConfig::from_file(path)?,
        None => ExportConfig::default(),
    };
    let config = cli.apply_to(base);
    config.validate()?;
    Ok(config)
}

pub async fn run(cli: Cli) -> Result<()> {
    info!("starting recording export");

    let config = resolve_config(&cli)?;
    // Reject a bad month selection before asking for a password
    let months = if cli.all {
        Vec::new()
    } else {
        parse_months(&cli.months)?
    };

    let password = read_password(&config.username)?;
    let session = ApiSession::authenticate(&config, &password)
        .await
        .context("could not get an authorization token")?;

    let progress = TerminalProgress::new();

    if cli.all {
        let summary = export_all(&session, &config, &progress)
            .await
            .context("error exporting all recordings")?;
        log_summary("all", &summary);
    } else {
        for month in months {
            let number = month.number_from_month();
            let summary = export_month(&session, &config, month, &progress)
                .await
                .with_context(|| format!("error exporting recordings for month {}", number))?;
            log_summary(&number.to_string(), &summary);
        }
    }

    info!("export finished");
    Ok(())
}

fn log_summary(label: &str, summary: &ExportSummary) {
    info!(
        month = label,
        total = summary.reported_total,
        retrieved = summary.retrieved,
        metadata_files = summary.exported,
        videos = summary.downloads.files,
        bytes = summary.downloads.bytes,
        path = %summary.output_dir.display(),
        "month exported"
    );
}
