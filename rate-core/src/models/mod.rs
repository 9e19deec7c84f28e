mod effective_tax;
mod rate_schedule;

pub use effective_tax::{EffectiveTax, RateSource};
pub use rate_schedule::{RatePoint, RateSchedule};
