pub mod calculations;
pub mod models;

pub use calculations::{
    Amount, BoundaryPolicy, EffectiveRateInterpolator, InvalidScheduleError,
    ParseBoundaryPolicyError, compute,
};
pub use models::*;
