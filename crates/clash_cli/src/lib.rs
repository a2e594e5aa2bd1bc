//! # Clash Driver
//!
//! Command-line caller for the clash engine: reads two entity set files,
//! runs `clash_detection`, and prints the results.
//!
//! ## Quick Start
//!
//! ```bash
//! # Touching or overlapping entities
//! clash set_a.txt set_b.txt
//!
//! # Allow a 5 cm clearance and print labelled pairs
//! clash set_a.txt set_b.txt --threshold 0.05 --format pairs
//!
//! # Centre-to-centre distances, JSON results, debug logs
//! clash set_a.txt set_b.txt --convention center -f json -l debug
//! ```
//!
//! ## Configuration
//!
//! Settings are read from a TOML file (default: `clash.toml`) when it
//! exists. Command-line options override file values.

use tracing::error;

mod app;
mod cli;
mod config;
mod logging;

pub use app::{render, Application};
pub use cli::CliArgs;
pub use config::{AppConfig, LoggingSettings, OutputFormat, OutputSettings};

/// Runs the driver with the process arguments.
///
/// Logging is set up from the configuration file and command-line
/// overrides before anything else, so configuration loading and every
/// failure are logged.
///
/// # Exit Codes
///
/// Returns `Err` after the failure has been reported; the caller exits
/// with code 1.
pub fn init() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let logging_settings = LoggingSettings::for_startup(&args);
    if let Err(e) = logging::setup_logging(&logging_settings) {
        eprintln!("❌ Failed to setup logging: {e}");
        return Err(anyhow::anyhow!("failed to setup logging: {e}"));
    }

    let app = Application::new(args).inspect_err(|e| error!("❌ Failed to start application: {e:#}"))?;
    app.run().inspect_err(|e| error!("❌ Application error: {e:#}"))
}
