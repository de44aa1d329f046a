//! Configuration file handling.
//!
//! Settings come from an optional TOML file and are then overridden by
//! command-line arguments.

use crate::cli::Args;
use crate::error::ConfigError;
use crate::loader::Source;
use crate::session::YearOrder;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_SOURCES: [(i32, &str); 2] = [
    (2024, "https://raw.githubusercontent.com/bluess21/GIS/main/2024-grievances.csv"),
    (2025, "https://raw.githubusercontent.com/bluess21/GIS/main/2025-grievances.csv"),
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Feeds, loaded in this order. Empty means the built-in defaults.
    #[serde(default)]
    pub sources: Vec<SourceConfig>,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub year: i32,
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            preview_rows: default_preview_rows(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_preview_rows() -> usize {
    10
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub year_order: YearOrder,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content, path)
    }

    fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Apply command-line overrides. `--source` flags replace the file's
    /// sources entirely.
    pub fn merge_with_args(&mut self, args: &Args) -> Result<(), ConfigError> {
        if !args.sources.is_empty() {
            self.sources = args
                .sources
                .iter()
                .map(|s| parse_source_spec(s))
                .collect::<Result<_, _>>()?;
        }
        if let Some(dir) = &args.output_dir {
            self.output.dir = dir.clone();
        }
        if let Some(rows) = args.preview_rows {
            self.output.preview_rows = rows;
        }
        if let Some(order) = args.year_order {
            self.display.year_order = order;
        }
        Ok(())
    }

    pub fn resolved_sources(&self) -> Vec<Source> {
        if self.sources.is_empty() {
            return DEFAULT_SOURCES
                .iter()
                .map(|(year, loc)| Source::new(*year, loc))
                .collect();
        }
        self.sources
            .iter()
            .map(|s| Source::new(s.year, &s.location))
            .collect()
    }
}

/// Parse `YEAR=LOCATION`.
pub fn parse_source_spec(spec: &str) -> Result<SourceConfig, ConfigError> {
    let bad = || ConfigError::BadSourceSpec(spec.to_string());
    let (year, location) = spec.split_once('=').ok_or_else(bad)?;
    let year: i32 = year.trim().parse().map_err(|_| bad())?;
    let location = location.trim();
    if location.is_empty() {
        return Err(bad());
    }
    Ok(SourceConfig {
        year,
        location: location.to_string(),
    })
}
