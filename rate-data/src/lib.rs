//! Loading rate schedules and income batches from files.
//!
//! Schedules come either from a CSV file (`schedule,threshold,rate`) or from
//! a TOML configuration that can also name a default schedule and boundary
//! policy. Both end up as a [`ScheduleSet`].

mod config;
mod error;
mod incomes;
mod loader;
mod schedule_set;

use std::path::Path;

pub use config::ScheduleConfig;
pub use error::ScheduleLoaderError;
pub use incomes::{IncomeRecord, TaxResultRecord, evaluate_incomes, parse_incomes, write_results};
pub use loader::{DEFAULT_SCHEDULE_NAME, ScheduleLoader, ScheduleRecord};
pub use schedule_set::ScheduleSet;

/// Loads a schedule file, picking the format from its extension.
///
/// `.toml` files are read as a [`ScheduleConfig`]; anything else is parsed
/// as schedule CSV.
pub fn load_schedule_file(path: &Path) -> Result<ScheduleSet, ScheduleLoaderError> {
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        ScheduleConfig::load(path)?.into_schedule_set()
    } else {
        ScheduleLoader::load_file(path)
    }
}
