use std::path::PathBuf;

use rate_core::{InvalidScheduleError, ParseBoundaryPolicyError};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur when loading schedules or income batches.
#[derive(Debug, Error)]
pub enum ScheduleLoaderError {
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("CSV write error: {0}")]
    CsvWrite(String),

    #[error("Config parse error: {0}")]
    ConfigParse(String),

    #[error("Schedule '{schedule}' defines threshold {threshold} more than once")]
    DuplicateThreshold { schedule: String, threshold: Decimal },

    #[error("Schedule '{0}' has no thresholds")]
    EmptySchedule(String),

    #[error("No schedules defined")]
    NoSchedules,

    #[error("Schedule '{name}' not found (available: {available})")]
    ScheduleNotFound { name: String, available: String },

    #[error("Several schedules defined ({0}); pick one by name")]
    AmbiguousSchedule(String),

    #[error("Default schedule '{0}' is not defined")]
    UnknownDefaultSchedule(String),

    #[error(transparent)]
    InvalidBoundaryPolicy(#[from] ParseBoundaryPolicyError),

    #[error(transparent)]
    InvalidSchedule(#[from] InvalidScheduleError),
}

impl From<csv::Error> for ScheduleLoaderError {
    fn from(err: csv::Error) -> Self {
        ScheduleLoaderError::CsvParse(err.to_string())
    }
}

impl From<toml::de::Error> for ScheduleLoaderError {
    fn from(err: toml::de::Error) -> Self {
        ScheduleLoaderError::ConfigParse(err.to_string())
    }
}
