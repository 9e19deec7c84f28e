//! Effective-rate tax calculations.
//!
//! This module provides the numeric abstraction shared by every calculation
//! and the interpolator that turns a sparse rate schedule into an effective
//! rate and tax amount for a given income.

pub mod amount;
pub mod interpolation;

pub use amount::Amount;
pub use interpolation::{
    BoundaryPolicy, EffectiveRateInterpolator, InvalidScheduleError, ParseBoundaryPolicyError,
    compute,
};
