use serde::{Deserialize, Serialize};

/// How the effective rate of an [`EffectiveTax`] was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RateSource<T> {
    /// Linearly interpolated between two consecutive thresholds that strictly
    /// enclose the income.
    Interpolated { lower: T, upper: T },

    /// No bracket enclosed the income; the rate of the highest threshold was
    /// used.
    TopThreshold(T),

    /// The income sat exactly on, or below, a threshold and that threshold's
    /// own rate was used. Only produced under
    /// [`BoundaryPolicy::Exact`](crate::calculations::BoundaryPolicy::Exact).
    ExactThreshold(T),
}

/// Effective rate and tax owed for one income.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectiveTax<T> {
    /// Average rate applied to the whole income.
    pub effective_rate: T,

    /// `income * effective_rate`.
    pub tax_owed: T,

    pub source: RateSource<T>,
}

impl<T> EffectiveTax<T> {
    /// The `(effective_rate, tax_owed)` pair.
    pub fn into_pair(self) -> (T, T) {
        (self.effective_rate, self.tax_owed)
    }
}
