//! Numeric types that can flow through the rate interpolation.
//!
//! Money in this workspace is normally a [`Decimal`], which keeps
//! interpolated rates and tax amounts exact. `f64` is supported as well for
//! simulation code that works with plain reals; NaN and infinities pass
//! through the arithmetic unchecked.

use std::cmp::Ordering;
use std::fmt::{Debug, Display};
use std::ops::{Add, Div, Mul, Sub};

use rust_decimal::Decimal;

/// A real-valued quantity usable as an income, threshold or rate.
pub trait Amount:
    Copy
    + PartialOrd
    + Debug
    + Display
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
{
    /// The additive identity, used for the implicit floor threshold and rate.
    const ZERO: Self;

    /// Total order used to sort thresholds.
    ///
    /// Unlike [`PartialOrd`] this never fails, so a schedule can always be
    /// put in ascending order even when it holds NaN.
    fn order(&self, other: &Self) -> Ordering;

    /// `self + other`, or `None` if the result is out of range.
    fn checked_add(self, other: Self) -> Option<Self>;

    fn checked_sub(self, other: Self) -> Option<Self>;

    fn checked_mul(self, other: Self) -> Option<Self>;

    /// `self / other`, or `None` on overflow or division by zero.
    fn checked_div(self, other: Self) -> Option<Self>;
}

impl Amount for Decimal {
    const ZERO: Self = Decimal::ZERO;

    fn order(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn checked_add(self, other: Self) -> Option<Self> {
        Decimal::checked_add(self, other)
    }

    fn checked_sub(self, other: Self) -> Option<Self> {
        Decimal::checked_sub(self, other)
    }

    fn checked_mul(self, other: Self) -> Option<Self> {
        Decimal::checked_mul(self, other)
    }

    fn checked_div(self, other: Self) -> Option<Self> {
        Decimal::checked_div(self, other)
    }
}

impl Amount for f64 {
    const ZERO: Self = 0.0;

    fn order(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }

    // IEEE arithmetic saturates to infinity or NaN instead of failing.

    fn checked_add(self, other: Self) -> Option<Self> {
        Some(self + other)
    }

    fn checked_sub(self, other: Self) -> Option<Self> {
        Some(self - other)
    }

    fn checked_mul(self, other: Self) -> Option<Self> {
        Some(self * other)
    }

    fn checked_div(self, other: Self) -> Option<Self> {
        Some(self / other)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn decimal_order_matches_cmp() {
        assert_eq!(dec!(1.5).order(&dec!(2)), Ordering::Less);
        assert_eq!(dec!(2.00).order(&dec!(2)), Ordering::Equal);
    }

    #[test]
    fn decimal_checked_mul_reports_overflow() {
        assert_eq!(Amount::checked_mul(Decimal::MAX, dec!(2)), None);
        assert_eq!(Amount::checked_mul(dec!(1.5), dec!(2)), Some(dec!(3.0)));
    }

    #[test]
    fn decimal_checked_div_by_zero_is_none() {
        assert_eq!(Amount::checked_div(dec!(1), Decimal::ZERO), None);
    }

    #[test]
    fn f64_checked_ops_never_fail() {
        assert_eq!(Amount::checked_mul(f64::MAX, 2.0), Some(f64::INFINITY));
        assert!(matches!(Amount::checked_div(0.0_f64, 0.0), Some(v) if v.is_nan()));
    }

    #[test]
    fn f64_order_places_nan_last() {
        let mut values = vec![f64::NAN, 3.0, -1.0];
        values.sort_by(|a, b| a.order(b));

        assert_eq!(values[0], -1.0);
        assert_eq!(values[1], 3.0);
        assert!(values[2].is_nan());
    }
}
