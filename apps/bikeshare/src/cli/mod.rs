//! # Bikeshare CLI Module
//!
//! This module implements the CLI interface for Bikeshare.
//!
//! ## Available Commands
//!
//! - `explore` - Interactive prompt loop (default)
//! - `report` - One-shot report for a city and filter
//! - `cities` - List configured cities and their data files

mod commands;

use crate::config::{AppConfig, DATA_DIR_ENV};
use bikeshare_core::{BikeshareError, Calendar, CityCatalog};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Bikeshare - US bikeshare trip explorer
///
/// Loads one city's trip records, narrows them by month and weekday, and
/// reports the most frequent times, stations, durations and user makeup.
#[derive(Parser, Debug)]
#[command(name = "bikeshare")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML configuration file
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the city CSV files
    #[arg(short = 'D', long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Explore interactively (default)
    Explore {
        /// Do not wait for ENTER between statistic groups
        #[arg(long)]
        no_pause: bool,
    },

    /// Print one report and exit
    Report {
        /// City (chicago, new york city, washington)
        #[arg(short = 'C', long)]
        city: String,

        /// Month (january..june) or "all"
        #[arg(short, long, default_value = "all")]
        month: String,

        /// Weekday (monday..sunday) or "all"
        #[arg(short, long, default_value = "all")]
        day: String,
    },

    /// List configured cities
    Cities,
}

// =============================================================================
// SETTINGS
// =============================================================================

/// Everything a command needs, resolved from flags, environment and file.
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub catalog: CityCatalog,
    pub calendar: Calendar,
    pub json_mode: bool,
}

impl Settings {
    pub fn resolve(cli: &Cli) -> Result<Self, BikeshareError> {
        let config = AppConfig::load_optional(cli.config.as_deref())?;
        let data_dir =
            config.resolve_data_dir(cli.data_dir.as_deref(), std::env::var(DATA_DIR_ENV).ok());
        let catalog = config.catalog()?;

        tracing::debug!("Data directory: {}", data_dir.display());
        Ok(Self {
            data_dir,
            catalog,
            calendar: Calendar::english(),
            json_mode: cli.json_mode,
        })
    }
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), BikeshareError> {
    let settings = Settings::resolve(&cli)?;

    match cli.command {
        Some(Commands::Explore { no_pause }) => cmd_explore(&settings, !no_pause),
        Some(Commands::Report { city, month, day }) => cmd_report(&settings, &city, &month, &day),
        Some(Commands::Cities) => cmd_cities(&settings),
        None => cmd_explore(&settings, true),
    }
}
