//! Error types for projections

use thiserror::Error;

/// Rejection raised by a calculator instead of returning NaN or infinite figures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error("parameter `{field}` is not a finite number ({value})")]
    NonFiniteInput { field: &'static str, value: f64 },

    #[error("projection overflowed to a non-finite value at period {period}")]
    NonFiniteResult { period: u32 },
}
