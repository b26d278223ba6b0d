//! Input screening shared by the calculators

use log::warn;

use crate::error::CalcError;

/// Reject any parameter that is NaN or infinite
pub(crate) fn check_finite(fields: &[(&'static str, f64)]) -> Result<(), CalcError> {
    for &(field, value) in fields {
        if !value.is_finite() {
            return Err(CalcError::NonFiniteInput { field, value });
        }
    }
    Ok(())
}

/// Returns true when every parameter is non-negative.
///
/// Out-of-range input is not an error: the caller returns an empty projection.
pub(crate) fn in_range(instrument: &str, fields: &[(&'static str, f64)]) -> bool {
    match fields.iter().find(|(_, value)| *value < 0.0) {
        Some((field, value)) => {
            warn!("{}: `{}` is negative ({}), returning an empty projection", instrument, field, value);
            false
        }
        None => true,
    }
}

/// Longest duration, in years, any calculator will project
pub const MAX_YEARS: u32 = 100;

/// Returns true when `years` is within [`MAX_YEARS`].
///
/// Longer durations are treated like negative input: the caller returns an
/// empty projection.
pub(crate) fn duration_in_range(instrument: &str, field: &str, years: u32) -> bool {
    if years > MAX_YEARS {
        warn!(
            "{}: `{}` of {} years exceeds the {}-year limit, returning an empty projection",
            instrument, field, years, MAX_YEARS
        );
        return false;
    }
    true
}

/// Convert a whole-number percentage (8.15) to a fraction (0.0815)
pub(crate) fn pct(rate_pct: f64) -> f64 {
    rate_pct / 100.0
}
