use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use rate_core::RateSchedule;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::{ScheduleLoaderError, ScheduleSet};

/// Schedule name given to CSV rows that leave the `schedule` column empty or
/// omit it entirely.
pub const DEFAULT_SCHEDULE_NAME: &str = "default";

/// A single record from a rate schedule CSV file.
///
/// The CSV format uses the following columns, matched by header name:
/// - `schedule`: Name of the schedule the row belongs to (optional; empty
///   cells and a missing column both mean [`DEFAULT_SCHEDULE_NAME`])
/// - `threshold`: Income level, as a decimal (e.g., 50000)
/// - `rate`: Effective rate at that level, as a decimal (e.g., 0.12 for 12%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ScheduleRecord {
    #[serde(default, deserialize_with = "deserialize_schedule_name")]
    pub schedule: Option<String>,
    pub threshold: Decimal,
    pub rate: Decimal,
}

impl ScheduleRecord {
    pub fn schedule_name(&self) -> &str {
        self.schedule.as_deref().unwrap_or(DEFAULT_SCHEDULE_NAME)
    }
}

fn deserialize_schedule_name<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

/// Loader for rate schedules stored as CSV.
///
/// Rows may appear in any order; each named schedule is sorted by threshold
/// once loaded.
pub struct ScheduleLoader;

impl ScheduleLoader {
    /// Parse schedule records from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or
    /// a byte slice. Whitespace around values is ignored.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<ScheduleRecord>, ScheduleLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: ScheduleRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Group records into named schedules.
    ///
    /// # Errors
    ///
    /// * [`ScheduleLoaderError::DuplicateThreshold`] if a schedule lists the
    ///   same threshold twice.
    /// * [`ScheduleLoaderError::NoSchedules`] if there are no records.
    pub fn build(records: &[ScheduleRecord]) -> Result<ScheduleSet, ScheduleLoaderError> {
        let mut schedules: BTreeMap<String, RateSchedule<Decimal>> = BTreeMap::new();

        for record in records {
            let name = record.schedule_name();
            let schedule = schedules.entry(name.to_string()).or_default();

            if schedule.insert(record.threshold, record.rate).is_some() {
                return Err(ScheduleLoaderError::DuplicateThreshold {
                    schedule: name.to_string(),
                    threshold: record.threshold,
                });
            }
        }

        debug!(
            schedules = schedules.len(),
            records = records.len(),
            "built rate schedules from CSV"
        );

        ScheduleSet::new(schedules, None, None)
    }

    /// Read, parse and build the schedules in the CSV file at `path`.
    pub fn load_file(path: &Path) -> Result<ScheduleSet, ScheduleLoaderError> {
        let file = File::open(path).map_err(|source| ScheduleLoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let records = Self::parse(file)?;
        Self::build(&records)
    }
}
