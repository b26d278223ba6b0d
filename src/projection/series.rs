//! Year-by-year output structures shared by every calculator

use serde::{Deserialize, Serialize};

use crate::error::CalcError;

/// One point on a projection timeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearPoint {
    /// Period number (1-indexed, no gaps)
    pub period: u32,

    /// Corpus (or, for HLV, projected income) at the end of the period
    pub balance: f64,

    /// Figure charted next to the balance: interest earned, present value,
    /// or cumulative withdrawals depending on the instrument
    pub delta: f64,
}

/// Complete projection with summary totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    /// Total principal or contributions put in
    pub total_contributed: f64,

    /// Total interest or return earned
    pub total_return: f64,

    /// Balance of the last point, 0 when the series is empty
    pub final_value: f64,

    /// Points in ascending period order
    pub series: Vec<YearPoint>,
}

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the next point, rejecting overflowed figures
    pub fn add_point(&mut self, balance: f64, delta: f64) -> Result<(), CalcError> {
        let period = self.series.len() as u32 + 1;
        if !balance.is_finite() || !delta.is_finite() {
            return Err(CalcError::NonFiniteResult { period });
        }

        self.series.push(YearPoint { period, balance, delta });
        self.final_value = balance;
        Ok(())
    }

    /// Record the summary totals once the timeline is complete
    pub fn set_totals(&mut self, contributed: f64, returned: f64) -> Result<(), CalcError> {
        if !contributed.is_finite() || !returned.is_finite() {
            return Err(CalcError::NonFiniteResult {
                period: self.periods(),
            });
        }

        self.total_contributed = contributed;
        self.total_return = returned;
        Ok(())
    }

    /// Number of periods emitted
    pub fn periods(&self) -> u32 {
        self.series.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn last(&self) -> Option<&YearPoint> {
        self.series.last()
    }
}
