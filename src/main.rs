//! translite daemon
//!
//! Resident translator that the selection/hotkey glue talks to.
//!
//! # Architecture Overview
//!
//! ```text
//!   translite-cli / UI glue
//!          │  JSON line
//!          ▼
//!   ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//!   │ net control  │───▶│ orchestrator │───▶│   registry   │
//!   │   server     │    │  (dispatch)  │    │ rank/health  │
//!   └──────────────┘    └──────┬───────┘    └──────┬───────┘
//!                              │                   │
//!                              ▼                   ▼
//!                       ┌──────────────┐    ┌──────────────┐
//!                       │   adapters   │    │ probe monitor│
//!                       │ libre/google │    │   (health)   │
//!                       └──────┬───────┘    └──────────────┘
//!                              ▼
//!                     LibreTranslate mirrors, Google
//! ```

use clap::Parser;
use std::path::PathBuf;

use translite::config::load_or_default;
use translite::lifecycle;
use translite::observability::logging;

#[derive(Parser)]
#[command(name = "translite")]
#[command(about = "Resident English/Chinese selection translator", long_about = None)]
struct Cli {
    /// Configuration file; built-in defaults are used when it does not exist
    #[arg(short, long, default_value = "translite.toml")]
    config: PathBuf,

    /// Override the configured log level
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_or_default(&cli.config)?;

    let level = cli
        .log_level
        .as_deref()
        .unwrap_or(&config.observability.log_level);
    logging::init(level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        built_in_defaults = !cli.config.exists(),
        backends = config.backends.len(),
        "translite starting"
    );

    lifecycle::run(config).await?;
    Ok(())
}
