//! Systematic Withdrawal Plan (SWP): a lump sum drawn down monthly

use log::debug;
use serde::{Deserialize, Serialize};

use super::series::Projection;
use super::validate::{check_finite, duration_in_range, in_range};
use super::Calculator;
use crate::error::CalcError;

/// Systematic Withdrawal Plan parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwpInput {
    pub initial_investment: f64,

    /// Fixed amount withdrawn at the end of every month
    pub monthly_withdrawal: f64,

    /// Expected annual return (% p.a.)
    pub rate_pct: f64,

    /// Duration in years
    pub years: u32,
}

impl Default for SwpInput {
    fn default() -> Self {
        Self {
            initial_investment: 2_000_000.0,
            monthly_withdrawal: 10_000.0,
            rate_pct: 8.0,
            years: 20,
        }
    }
}

/// SWP result.
///
/// Each point's delta is the cumulative withdrawal capped at the initial
/// investment; `total_withdrawn` is the uncapped figure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwpResult {
    pub projection: Projection,
    pub total_withdrawn: f64,
}

impl SwpResult {
    /// Whether the corpus ran out before the requested duration
    pub fn depleted(&self) -> bool {
        self.projection.last().map_or(false, |p| p.balance <= 0.0)
    }
}

impl Calculator for SwpInput {
    type Output = SwpResult;
    const NAME: &'static str = "swp";

    fn project(&self) -> Result<SwpResult, CalcError> {
        let fields = [
            ("initial_investment", self.initial_investment),
            ("monthly_withdrawal", self.monthly_withdrawal),
            ("rate_pct", self.rate_pct),
        ];
        check_finite(&fields)?;
        if !in_range(Self::NAME, &fields) || !duration_in_range(Self::NAME, "years", self.years) || self.years == 0
        {
            return Ok(SwpResult::default());
        }

        let monthly_rate = self.rate_pct / 12.0 / 100.0;
        let mut projection = Projection::new();
        let mut balance = self.initial_investment;
        let mut total_withdrawn = 0.0;

        for _year in 1..=self.years {
            for _month in 1..=12 {
                balance = balance * (1.0 + monthly_rate) - self.monthly_withdrawal;
                total_withdrawn += self.monthly_withdrawal;
                // Partial year: clamp and skip the remaining months
                if balance <= 0.0 {
                    balance = 0.0;
                    break;
                }
            }

            projection.add_point(balance, self.initial_investment.min(total_withdrawn))?;

            if balance <= 0.0 {
                break;
            }
        }

        projection.set_totals(
            self.initial_investment,
            balance + total_withdrawn - self.initial_investment,
        )?;
        debug!(
            "swp: {} of {} years, final {:.2}, withdrawn {:.2}",
            projection.periods(),
            self.years,
            balance,
            total_withdrawn
        );

        Ok(SwpResult {
            projection,
            total_withdrawn,
        })
    }
}
