//! PVWA recording export CLI
//!
//! Lists the PSM session recordings of each selected month and stores their
//! metadata and video under `<output-dir>/<month>/`.
//!
//! ```bash
//! PVWA_PASSWORD=... pvwa-export --base-url https://pvwa.corp/PasswordVault/API --months 5,6,7
//! ```
//!
//! Set `RUST_LOG=debug` for verbose logging.

mod args;
mod password;
mod progress;
mod runner;

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub use args::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with environment-based filtering, info by default
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    runner::run(cli).await
}
