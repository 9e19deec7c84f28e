use serde::{Deserialize, Serialize};

use crate::calculations::Amount;

/// A single `(threshold, effective rate)` pair of a [`RateSchedule`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatePoint<T> {
    /// Income level at which `rate` is defined.
    pub threshold: T,
    /// Effective (average) rate applied to the whole income at `threshold`.
    pub rate: T,
}

impl<T> RatePoint<T> {
    pub fn new(
        threshold: T,
        rate: T,
    ) -> Self {
        Self { threshold, rate }
    }
}

/// Sparse mapping from income threshold to effective tax rate.
///
/// Points are always held in ascending threshold order no matter how they
/// were inserted, and each threshold appears at most once. Inserting an
/// existing threshold replaces its rate.
///
/// A schedule does not need an entry at `0`: interpolation treats a missing
/// zero threshold as a floor rate of `0` (see [`RateSchedule::with_floor`]).
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use rate_core::RateSchedule;
///
/// let schedule: RateSchedule<_> = [(dec!(100), dec!(0.20)), (dec!(50), dec!(0.10))]
///     .into_iter()
///     .collect();
///
/// assert_eq!(schedule.thresholds(), vec![dec!(50), dec!(100)]);
/// assert!(!schedule.has_floor());
/// assert_eq!(schedule.with_floor().rate_at(dec!(0)), Some(dec!(0)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RateSchedule<T> {
    points: Vec<RatePoint<T>>,
}

impl<T: Amount> Default for RateSchedule<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Amount> RateSchedule<T> {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Creates a single-threshold schedule applying `rate` to every income.
    pub fn flat(rate: T) -> Self {
        Self {
            points: vec![RatePoint::new(T::ZERO, rate)],
        }
    }

    /// Sets the rate for `threshold`, returning the rate it replaced.
    pub fn insert(
        &mut self,
        threshold: T,
        rate: T,
    ) -> Option<T> {
        if let Some(existing) = self.points.iter_mut().find(|p| p.threshold == threshold) {
            return Some(std::mem::replace(&mut existing.rate, rate));
        }

        let idx = self
            .points
            .partition_point(|p| p.threshold.order(&threshold).is_lt());
        self.points.insert(idx, RatePoint::new(threshold, rate));
        None
    }

    /// Returns the rate defined exactly at `threshold`, if any.
    pub fn rate_at(
        &self,
        threshold: T,
    ) -> Option<T> {
        self.points
            .iter()
            .find(|p| p.threshold == threshold)
            .map(|p| p.rate)
    }

    /// Points in ascending threshold order.
    pub fn points(&self) -> &[RatePoint<T>] {
        &self.points
    }

    pub fn thresholds(&self) -> Vec<T> {
        self.points.iter().map(|p| p.threshold).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the schedule defines a rate at threshold `0`.
    pub fn has_floor(&self) -> bool {
        self.rate_at(T::ZERO).is_some()
    }

    /// Returns an owned copy of the schedule with a `0 -> 0` floor entry
    /// added when no zero threshold is present.
    ///
    /// `self` is left untouched.
    pub fn with_floor(&self) -> Self {
        let mut schedule = self.clone();
        if !schedule.has_floor() {
            schedule.insert(T::ZERO, T::ZERO);
        }
        schedule
    }
}

impl<T: Amount> FromIterator<(T, T)> for RateSchedule<T> {
    fn from_iter<I: IntoIterator<Item = (T, T)>>(iter: I) -> Self {
        let mut schedule = Self::new();
        for (threshold, rate) in iter {
            schedule.insert(threshold, rate);
        }
        schedule
    }
}

impl<T: Amount> FromIterator<RatePoint<T>> for RateSchedule<T> {
    fn from_iter<I: IntoIterator<Item = RatePoint<T>>>(iter: I) -> Self {
        iter.into_iter().map(|p| (p.threshold, p.rate)).collect()
    }
}
