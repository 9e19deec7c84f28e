use std::collections::BTreeMap;

use rate_core::{BoundaryPolicy, RateSchedule};
use rust_decimal::Decimal;

use crate::ScheduleLoaderError;

/// Named rate schedules loaded from one file.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleSet {
    schedules: BTreeMap<String, RateSchedule<Decimal>>,
    default_schedule: Option<String>,
    boundary_policy: Option<BoundaryPolicy>,
}

impl ScheduleSet {
    pub(crate) fn new(
        schedules: BTreeMap<String, RateSchedule<Decimal>>,
        default_schedule: Option<String>,
        boundary_policy: Option<BoundaryPolicy>,
    ) -> Result<Self, ScheduleLoaderError> {
        if schedules.is_empty() {
            return Err(ScheduleLoaderError::NoSchedules);
        }
        if let Some(name) = &default_schedule {
            if !schedules.contains_key(name) {
                return Err(ScheduleLoaderError::UnknownDefaultSchedule(name.clone()));
            }
        }

        Ok(Self {
            schedules,
            default_schedule,
            boundary_policy,
        })
    }

    /// Schedule names in alphabetical order.
    pub fn names(&self) -> Vec<&str> {
        self.schedules.keys().map(String::as_str).collect()
    }

    pub fn get(
        &self,
        name: &str,
    ) -> Option<&RateSchedule<Decimal>> {
        self.schedules.get(name)
    }

    pub fn default_schedule(&self) -> Option<&str> {
        self.default_schedule.as_deref()
    }

    /// Boundary policy requested by the source file, if it set one.
    pub fn boundary_policy(&self) -> Option<BoundaryPolicy> {
        self.boundary_policy
    }

    /// Picks the schedule to use.
    ///
    /// An explicit `name` wins. Without one, the configured default is used,
    /// and failing that the only schedule in the set.
    ///
    /// # Errors
    ///
    /// * [`ScheduleLoaderError::ScheduleNotFound`] if `name` is not defined.
    /// * [`ScheduleLoaderError::AmbiguousSchedule`] if no name was given, no
    ///   default is configured and the set holds more than one schedule.
    pub fn select(
        &self,
        name: Option<&str>,
    ) -> Result<&RateSchedule<Decimal>, ScheduleLoaderError> {
        let wanted = match name.or(self.default_schedule()) {
            Some(wanted) => wanted,
            None if self.schedules.len() == 1 => {
                return self
                    .schedules
                    .values()
                    .next()
                    .ok_or(ScheduleLoaderError::NoSchedules);
            }
            None => return Err(ScheduleLoaderError::AmbiguousSchedule(self.available())),
        };

        self.get(wanted)
            .ok_or_else(|| ScheduleLoaderError::ScheduleNotFound {
                name: wanted.to_string(),
                available: self.available(),
            })
    }

    fn available(&self) -> String {
        self.names().join(", ")
    }
}
