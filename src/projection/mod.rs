//! Projection engine: one pure calculator per instrument
//!
//! Every calculator takes a flat parameter record with rates given as
//! whole-number percentages and returns a year-by-year [`Projection`] plus
//! instrument-specific totals. Finite but out-of-range input yields an empty
//! projection; non-finite input or overflow is a [`CalcError`].

mod series;
mod validate;
mod accumulation;
mod present_value;
mod withdrawal;
mod retirement;

pub use series::{Projection, YearPoint};
pub use accumulation::{EpfInput, EpfResult, PpfInput, PpfResult, SipInput, SipResult};
pub use present_value::{discount_factor, growth_factor, pv_growing_annuity_due, HlvInput, HlvResult};
pub use withdrawal::{SwpInput, SwpResult};
pub use retirement::{RetirementInput, RetirementPlan};
pub use validate::MAX_YEARS;

use crate::error::CalcError;

/// Common contract for every instrument
pub trait Calculator {
    type Output;

    /// Short instrument name used in logs
    const NAME: &'static str;

    /// Run the projection. Deterministic and free of side effects.
    fn project(&self) -> Result<Self::Output, CalcError>;
}
