use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rate_core::{BoundaryPolicy, RatePoint, RateSchedule};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{ScheduleLoaderError, ScheduleSet};

/// TOML schedule configuration.
///
/// ```toml
/// default_schedule = "progressive"
/// boundary_policy = "compatible"
///
/// [[schedules.progressive]]
/// threshold = 0
/// rate = 0
///
/// [[schedules.progressive]]
/// threshold = 100000
/// rate = "0.30"
///
/// [[schedules.flat]]
/// threshold = 0
/// rate = 0.13
/// ```
///
/// Thresholds and rates accept TOML numbers or decimal strings; strings
/// keep every digit exactly as written.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleConfig {
    /// Schedule used when none is named explicitly.
    #[serde(default)]
    pub default_schedule: Option<String>,

    /// `"compatible"` or `"exact"`, case-insensitive.
    #[serde(default)]
    pub boundary_policy: Option<String>,

    pub schedules: BTreeMap<String, Vec<RatePoint<Decimal>>>,
}

impl ScheduleConfig {
    pub fn load(path: &Path) -> Result<Self, ScheduleLoaderError> {
        let content = fs::read_to_string(path).map_err(|source| ScheduleLoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ScheduleLoaderError> {
        Ok(toml::from_str(content)?)
    }

    /// Validates the configuration and converts it into a [`ScheduleSet`].
    ///
    /// # Errors
    ///
    /// * [`ScheduleLoaderError::EmptySchedule`] if a schedule lists no points.
    /// * [`ScheduleLoaderError::DuplicateThreshold`] if a schedule repeats a
    ///   threshold.
    /// * [`ScheduleLoaderError::UnknownDefaultSchedule`] if
    ///   `default_schedule` names an undefined schedule.
    /// * [`ScheduleLoaderError::InvalidBoundaryPolicy`] if `boundary_policy`
    ///   is not a known policy.
    pub fn into_schedule_set(self) -> Result<ScheduleSet, ScheduleLoaderError> {
        let boundary_policy = self
            .boundary_policy
            .as_deref()
            .map(str::parse::<BoundaryPolicy>)
            .transpose()?;

        let mut schedules = BTreeMap::new();
        for (name, points) in self.schedules {
            if points.is_empty() {
                return Err(ScheduleLoaderError::EmptySchedule(name));
            }

            let mut schedule = RateSchedule::new();
            for point in points {
                if schedule.insert(point.threshold, point.rate).is_some() {
                    return Err(ScheduleLoaderError::DuplicateThreshold {
                        schedule: name,
                        threshold: point.threshold,
                    });
                }
            }
            schedules.insert(name, schedule);
        }

        ScheduleSet::new(schedules, self.default_schedule, boundary_policy)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const TEST_TOML: &str = r#"
default_schedule = "progressive"
boundary_policy = "Exact"

[[schedules.progressive]]
threshold = 100000
rate = "0.30"

[[schedules.progressive]]
threshold = 0
rate = 0

[[schedules.flat]]
threshold = "0"
rate = "0.13"
"#;

    #[test]
    fn test_parse_config() {
        let config = ScheduleConfig::from_toml_str(TEST_TOML).expect("Failed to parse config");

        assert_eq!(config.default_schedule.as_deref(), Some("progressive"));
        assert_eq!(config.schedules.len(), 2);
        assert_eq!(
            config.schedules["flat"],
            vec![RatePoint::new(dec!(0), dec!(0.13))]
        );
    }

    #[test]
    fn test_into_schedule_set() {
        let set = ScheduleConfig::from_toml_str(TEST_TOML)
            .and_then(ScheduleConfig::into_schedule_set)
            .expect("Failed to build schedules");

        assert_eq!(set.default_schedule(), Some("progressive"));
        assert_eq!(set.boundary_policy(), Some(BoundaryPolicy::Exact));
        assert_eq!(
            set.select(None).unwrap().thresholds(),
            vec![dec!(0), dec!(100000)]
        );
    }

    #[test]
    fn test_boundary_policy_optional() {
        let toml = "[[schedules.flat]]\nthreshold = 0\nrate = \"0.13\"\n";

        let set = ScheduleConfig::from_toml_str(toml)
            .and_then(ScheduleConfig::into_schedule_set)
            .expect("Failed to build schedules");

        assert_eq!(set.boundary_policy(), None);
        assert_eq!(set.default_schedule(), None);
    }

    #[test]
    fn test_invalid_boundary_policy() {
        let toml = "boundary_policy = \"nearest\"\n[[schedules.flat]]\nthreshold = 0\nrate = 0\n";

        let err = ScheduleConfig::from_toml_str(toml)
            .and_then(ScheduleConfig::into_schedule_set)
            .unwrap_err();

        assert!(matches!(err, ScheduleLoaderError::InvalidBoundaryPolicy(_)));
    }

    #[test]
    fn test_empty_schedule_rejected() {
        let toml = "[schedules]\nflat = []\n";

        let err = ScheduleConfig::from_toml_str(toml)
            .and_then(ScheduleConfig::into_schedule_set)
            .unwrap_err();

        assert_eq!(err.to_string(), "Schedule 'flat' has no thresholds");
    }

    #[test]
    fn test_duplicate_threshold_rejected() {
        let toml = r#"
[[schedules.flat]]
threshold = 0
rate = "0.13"

[[schedules.flat]]
threshold = 0
rate = "0.14"
"#;

        let err = ScheduleConfig::from_toml_str(toml)
            .and_then(ScheduleConfig::into_schedule_set)
            .unwrap_err();

        assert!(matches!(
            err,
            ScheduleLoaderError::DuplicateThreshold { ref schedule, .. } if schedule == "flat"
        ));
    }

    #[test]
    fn test_unknown_default_rejected() {
        let toml = "default_schedule = \"nordic\"\n[[schedules.flat]]\nthreshold = 0\nrate = 0\n";

        let err = ScheduleConfig::from_toml_str(toml)
            .and_then(ScheduleConfig::into_schedule_set)
            .unwrap_err();

        assert!(matches!(err, ScheduleLoaderError::UnknownDefaultSchedule(_)));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let toml = "default = \"flat\"\n[[schedules.flat]]\nthreshold = 0\nrate = 0\n";

        let err = ScheduleConfig::from_toml_str(toml).unwrap_err();

        assert!(matches!(err, ScheduleLoaderError::ConfigParse(_)));
    }
}
