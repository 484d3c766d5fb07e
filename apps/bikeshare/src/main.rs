//! # Bikeshare - US Bikeshare Trip Explorer
//!
//! The main binary for exploring bikeshare trip data.
//!
//! This application provides:
//! - Interactive explorer (prompt loop)
//! - One-shot reports for scripting
//! - City catalog listing
//!
//! ## Usage
//!
//! ```bash
//! # Interactive session
//! bikeshare --data-dir ./data
//!
//! # One-shot report as JSON
//! bikeshare --json-mode report --city chicago --month march --day friday
//!
//! # Where each city's file is expected
//! bikeshare cities
//! ```

use bikeshare::cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable selecting the log format (`json` or text).
const LOG_FORMAT_ENV: &str = "BIKESHARE_LOG_FORMAT";

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Logs go to stderr so stdout carries reports only.
    let log_format = std::env::var(LOG_FORMAT_ENV).unwrap_or_else(|_| "text".to_string());
    let default_filter = if cli.verbose {
        "bikeshare=debug"
    } else {
        "bikeshare=warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    // Display startup banner
    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Bikeshare startup banner.
fn print_banner() {
    println!(
        r#"
  Bikeshare Explorer v{}

  Chicago • New York City • Washington
"#,
        env!("CARGO_PKG_VERSION")
    );
}
