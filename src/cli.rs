//! Command-line arguments.

use crate::session::YearOrder;
use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

/// Ward-level grievance dashboard over yearly complaint feeds.
///
/// Without --batch the program runs an interactive menu. With --batch it
/// loads the feeds, applies the given filters, prints the dashboard,
/// exports it and exits.
///
/// Examples:
///   grievance-dash
///   grievance-dash --source 2024=data/2024.csv --source 2025=data/2025.csv
///   grievance-dash --batch --year 2025 --category Roads --ward "Ward-1"
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Feed to load, as YEAR=PATH or YEAR=URL (repeatable)
    ///
    /// Replaces the sources from the config file.
    #[arg(short, long = "source", value_name = "YEAR=LOCATION")]
    pub sources: Vec<String>,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "FILE", env = "GRIEVANCE_DASH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory for exported CSV/JSON files
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Order of the year selector
    #[arg(long, value_enum)]
    pub year_order: Option<YearOrder>,

    /// Rows shown per table preview
    #[arg(long, value_name = "COUNT")]
    pub preview_rows: Option<usize>,

    /// Run once without prompting
    #[arg(long)]
    pub batch: bool,

    #[arg(long)]
    pub year: Option<i32>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub sub_category: Option<String>,

    #[arg(long)]
    pub ward: Option<String>,

    /// Enable verbose logging output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else if self.quiet {
            Level::ERROR
        } else {
            Level::WARN
        }
    }
}
