use std::io;

use thiserror::Error;

/// A feed could not be turned into records. Fatal for the run.
#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("source '{location}' ({year}) is unreachable: {reason}")]
    Unreachable {
        year: i32,
        location: String,
        reason: String,
    },
    #[error("source '{location}' ({year}) is missing required column '{column}'")]
    MissingColumn {
        year: i32,
        location: String,
        column: String,
    },
    #[error("source '{location}' ({year}) is malformed: {source}")]
    Malformed {
        year: i32,
        location: String,
        #[source]
        source: csv::Error,
    },
    #[error("no sources configured")]
    NoSources,
}

/// The requested ward has no summary row for the current filters.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("no data found for ward '{0}'")]
pub struct WardNotFound(pub String);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("'{value}' is not an available {stage} option")]
    NotAnOption { stage: String, value: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid source spec '{0}': expected YEAR=LOCATION")]
    BadSourceSpec(String),
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}
