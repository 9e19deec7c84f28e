//! Effective-rate interpolation over a sparse rate schedule.
//!
//! Taxation here works with *effective* rates rather than marginal ones: the
//! schedule maps a handful of income thresholds to the average rate paid on
//! the whole income at that level, and incomes in between get a rate
//! linearly interpolated from the two nearest thresholds.
//!
//! # Resolution rules
//!
//! | Income position | Rate used |
//! |-----------------|-----------|
//! | Strictly between thresholds `low` and `high` | `rate(low) + (income - low) / (high - low) * (rate(high) - rate(low))` |
//! | Above the highest threshold | rate of the highest threshold |
//! | Exactly on a threshold | rate of the **highest** threshold ([`BoundaryPolicy::Compatible`]) or of that threshold ([`BoundaryPolicy::Exact`]) |
//! | Below the lowest threshold | rate of the **highest** threshold ([`BoundaryPolicy::Compatible`]) or of the lowest threshold ([`BoundaryPolicy::Exact`]) |
//!
//! A schedule without a `0` threshold is treated as having a `0 -> 0` floor.
//! The floor is added to a private copy; the caller's schedule is never
//! modified.
//!
//! # Example
//!
//! A flat 13% tax:
//!
//! ```
//! use rust_decimal_macros::dec;
//! use rate_core::{RateSchedule, compute};
//!
//! let schedule = RateSchedule::flat(dec!(0.13));
//!
//! let result = compute(dec!(10000), &schedule).unwrap();
//!
//! assert_eq!(result.effective_rate, dec!(0.13));
//! assert_eq!(result.tax_owed, dec!(1300));
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use crate::calculations::Amount;
use crate::models::{EffectiveTax, RatePoint, RateSchedule, RateSource};

/// Errors that can occur while interpolating an effective rate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidScheduleError {
    /// The schedule held no threshold at all.
    #[error("rate schedule must contain at least one threshold")]
    Empty,

    /// The rate or tax for `income` does not fit the amount type.
    #[error("arithmetic overflow computing the tax on income {income}")]
    Overflow { income: String },
}

/// What to do with an income that no bracket strictly encloses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryPolicy {
    /// Always fall back to the rate of the highest threshold.
    ///
    /// This means an income sitting exactly on a lower threshold, or below
    /// the lowest one, is taxed at the top rate.
    #[default]
    Compatible,

    /// Use the threshold's own rate for incomes exactly on a threshold and the
    /// lowest threshold's rate for incomes below it. Incomes above the top
    /// threshold still get the top rate.
    Exact,
}

impl BoundaryPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compatible => "compatible",
            Self::Exact => "exact",
        }
    }
}

impl fmt::Display for BoundaryPolicy {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known [`BoundaryPolicy`].
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown boundary policy '{0}' (expected 'compatible' or 'exact')")]
pub struct ParseBoundaryPolicyError(String);

impl FromStr for BoundaryPolicy {
    type Err = ParseBoundaryPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compatible" => Ok(Self::Compatible),
            "exact" => Ok(Self::Exact),
            _ => Err(ParseBoundaryPolicyError(s.to_string())),
        }
    }
}

/// Computes the effective rate and tax owed for `income`.
///
/// Shorthand for [`EffectiveRateInterpolator::new`] followed by
/// [`EffectiveRateInterpolator::calculate`], using
/// [`BoundaryPolicy::Compatible`].
///
/// # Errors
///
/// Returns [`InvalidScheduleError::Empty`] if the schedule has no threshold
/// after the floor is applied, or [`InvalidScheduleError::Overflow`] if the
/// result does not fit `T`.
pub fn compute<T: Amount>(
    income: T,
    schedule: &RateSchedule<T>,
) -> Result<EffectiveTax<T>, InvalidScheduleError> {
    EffectiveRateInterpolator::new(schedule).calculate(income)
}

/// Calculator turning a [`RateSchedule`] into effective rates.
///
/// The interpolator only borrows the schedule and keeps no state between
/// calls, so one schedule can back any number of calculations, including
/// from several threads at once.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use rate_core::{BoundaryPolicy, EffectiveRateInterpolator, RateSchedule, RateSource};
///
/// let schedule: RateSchedule<_> = [
///     (dec!(0), dec!(0.00)),
///     (dec!(50), dec!(0.10)),
///     (dec!(100), dec!(0.20)),
/// ]
/// .into_iter()
/// .collect();
///
/// let interpolator = EffectiveRateInterpolator::new(&schedule);
/// let result = interpolator.calculate(dec!(75)).unwrap();
/// assert_eq!(result.effective_rate, dec!(0.15));
/// assert_eq!(
///     result.source,
///     RateSource::Interpolated { lower: dec!(50), upper: dec!(100) }
/// );
///
/// // On a threshold the default policy falls back to the top rate...
/// assert_eq!(interpolator.calculate(dec!(50)).unwrap().effective_rate, dec!(0.20));
///
/// // ...while the exact policy uses the threshold's own rate.
/// let exact = interpolator.with_policy(BoundaryPolicy::Exact);
/// assert_eq!(exact.calculate(dec!(50)).unwrap().effective_rate, dec!(0.10));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct EffectiveRateInterpolator<'a, T> {
    schedule: &'a RateSchedule<T>,
    policy: BoundaryPolicy,
}

impl<'a, T: Amount> EffectiveRateInterpolator<'a, T> {
    /// Creates an interpolator over `schedule` using
    /// [`BoundaryPolicy::Compatible`].
    pub fn new(schedule: &'a RateSchedule<T>) -> Self {
        Self {
            schedule,
            policy: BoundaryPolicy::default(),
        }
    }

    /// Returns a copy of this interpolator using `policy`.
    pub fn with_policy(
        self,
        policy: BoundaryPolicy,
    ) -> Self {
        Self { policy, ..self }
    }

    /// The policy applied to incomes no bracket strictly encloses.
    pub fn policy(&self) -> BoundaryPolicy {
        self.policy
    }

    /// Calculates the effective rate and tax owed for `income`.
    ///
    /// # Errors
    ///
    /// * [`InvalidScheduleError::Empty`] if the schedule has no threshold
    ///   after the floor is applied.
    /// * [`InvalidScheduleError::Overflow`] if the interpolated rate or the
    ///   tax owed is out of range for `T`.
    pub fn calculate(
        &self,
        income: T,
    ) -> Result<EffectiveTax<T>, InvalidScheduleError> {
        let schedule = self.schedule.with_floor();
        resolve(schedule.points(), income, self.policy)
    }
}

/// Resolves `income` against points sorted by ascending threshold.
fn resolve<T: Amount>(
    points: &[RatePoint<T>],
    income: T,
    policy: BoundaryPolicy,
) -> Result<EffectiveTax<T>, InvalidScheduleError> {
    for pair in points.windows(2) {
        let (low, high) = (pair[0], pair[1]);
        trace!(%income, low = %low.threshold, high = %high.threshold, "checking bracket");

        if low.threshold < income && income < high.threshold {
            let effective_rate = interpolate(low, high, income).ok_or_else(|| overflow(income))?;
            debug!(
                %income,
                lower = %low.threshold,
                upper = %high.threshold,
                %effective_rate,
                "interpolated effective rate"
            );

            return Ok(EffectiveTax {
                effective_rate,
                tax_owed: tax_owed(income, effective_rate)?,
                source: RateSource::Interpolated {
                    lower: low.threshold,
                    upper: high.threshold,
                },
            });
        }
    }

    if let Some(point) = exact_boundary(points, income, policy) {
        debug!(%income, threshold = %point.threshold, rate = %point.rate, "using threshold rate");
        return Ok(EffectiveTax {
            effective_rate: point.rate,
            tax_owed: tax_owed(income, point.rate)?,
            source: RateSource::ExactThreshold(point.threshold),
        });
    }

    let top = points.last().ok_or(InvalidScheduleError::Empty)?;
    debug!(%income, threshold = %top.threshold, rate = %top.rate, "falling back to top threshold rate");

    Ok(EffectiveTax {
        effective_rate: top.rate,
        tax_owed: tax_owed(income, top.rate)?,
        source: RateSource::TopThreshold(top.threshold),
    })
}

/// Linear interpolation of the rate between two points, `None` on overflow.
fn interpolate<T: Amount>(
    low: RatePoint<T>,
    high: RatePoint<T>,
    income: T,
) -> Option<T> {
    let span = high.threshold.checked_sub(low.threshold)?;
    let fraction = income.checked_sub(low.threshold)?.checked_div(span)?;
    let delta = high.rate.checked_sub(low.rate)?;
    low.rate.checked_add(fraction.checked_mul(delta)?)
}

fn tax_owed<T: Amount>(
    income: T,
    rate: T,
) -> Result<T, InvalidScheduleError> {
    income.checked_mul(rate).ok_or_else(|| overflow(income))
}

fn overflow<T: Amount>(income: T) -> InvalidScheduleError {
    InvalidScheduleError::Overflow {
        income: income.to_string(),
    }
}

/// Under [`BoundaryPolicy::Exact`], finds the point whose own rate applies to
/// an income that no bracket strictly encloses.
fn exact_boundary<T: Amount>(
    points: &[RatePoint<T>],
    income: T,
    policy: BoundaryPolicy,
) -> Option<RatePoint<T>> {
    match policy {
        BoundaryPolicy::Compatible => None,
        BoundaryPolicy::Exact => {
            let lowest = points.first()?;
            if income < lowest.threshold {
                return Some(*lowest);
            }
            points.iter().find(|p| p.threshold == income).copied()
        }
    }
}
