//! Present value calculations and the Human Life Value (HLV) calculator
//!
//! HLV projects a growing income stream to retirement and discounts each year
//! back to today. Periods are independent: no balance is carried forward.

use log::debug;
use serde::{Deserialize, Serialize};

use super::series::Projection;
use super::validate::{check_finite, duration_in_range, in_range, pct};
use super::Calculator;
use crate::error::CalcError;

/// Factor by which an amount grows over `periods` at `rate` per period
pub fn growth_factor(rate: f64, periods: u32) -> f64 {
    match i32::try_from(periods) {
        Ok(n) => (1.0 + rate).powi(n),
        Err(_) => (1.0 + rate).powf(periods as f64),
    }
}

/// Discount factor to today from `periods` in the future
pub fn discount_factor(rate: f64, periods: u32) -> f64 {
    1.0 / growth_factor(rate, periods)
}

/// PV of a payment stream that starts at `payment` immediately and grows by
/// `growth` each period, discounted at `discount`
pub fn pv_growing_annuity_due(payment: f64, growth: f64, discount: f64, periods: u32) -> f64 {
    (0..periods)
        .map(|t| payment * growth_factor(growth, t) / growth_factor(discount, t))
        .sum()
}

/// Human Life Value parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HlvInput {
    pub current_age: u32,
    pub retirement_age: u32,

    /// Current annual income
    pub annual_income: f64,

    /// Expected yearly increase in income (% p.a.)
    pub growth_pct: f64,

    /// Rate used to bring future income back to today (% p.a.)
    pub discount_pct: f64,
}

impl Default for HlvInput {
    fn default() -> Self {
        Self {
            current_age: 30,
            retirement_age: 60,
            annual_income: 800_000.0,
            growth_pct: 5.0,
            discount_pct: 6.0,
        }
    }
}

impl HlvInput {
    /// Working years left; zero when already at or past retirement
    pub fn years(&self) -> u32 {
        self.retirement_age.saturating_sub(self.current_age)
    }
}

/// HLV result: each point's balance is that year's projected income and its
/// delta the present value of that income
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HlvResult {
    pub projection: Projection,

    /// Sum of discounted incomes
    pub total_hlv: f64,

    /// Sum of undiscounted projected incomes
    pub total_income: f64,
}

impl Calculator for HlvInput {
    type Output = HlvResult;
    const NAME: &'static str = "hlv";

    fn project(&self) -> Result<HlvResult, CalcError> {
        let fields = [
            ("annual_income", self.annual_income),
            ("growth_pct", self.growth_pct),
            ("discount_pct", self.discount_pct),
        ];
        check_finite(&fields)?;
        if !in_range(Self::NAME, &fields) || !duration_in_range(Self::NAME, "working years", self.years()) {
            return Ok(HlvResult::default());
        }

        let growth = pct(self.growth_pct);
        let discount = pct(self.discount_pct);

        let mut projection = Projection::new();
        let mut total_hlv = 0.0;
        let mut total_income = 0.0;

        for year in 1..=self.years() {
            let income = self.annual_income * growth_factor(growth, year);
            let pv = income / growth_factor(discount, year);

            total_hlv += pv;
            total_income += income;
            projection.add_point(income, pv)?;
        }

        if !projection.is_empty() {
            projection.set_totals(total_income, total_hlv)?;
        }
        debug!("hlv: {} years, HLV {:.2}", projection.periods(), total_hlv);

        Ok(HlvResult {
            projection,
            total_hlv,
            total_income,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::MAX_YEARS;
    use approx::assert_relative_eq;

    #[test]
    fn test_discount_factors() {
        let v = discount_factor(0.06, 12);
        let expected: f64 = (1.0_f64 / 1.06).powi(12);
        assert!((v - expected).abs() < 1e-12);
        assert_eq!(growth_factor(0.06, 0), 1.0);

        // Exponents past i32::MAX keep their sign
        assert_eq!(growth_factor(0.05, 1 << 31), f64::INFINITY);
        assert_eq!(discount_factor(0.05, u32::MAX), 0.0);
        assert_eq!(growth_factor(0.0, u32::MAX), 1.0);
    }

    #[test]
    fn test_duration_limit() {
        let input = HlvInput {
            current_age: 0,
            retirement_age: MAX_YEARS,
            ..HlvInput::default()
        };
        assert_eq!(input.project().unwrap().projection.periods(), MAX_YEARS);

        let input = HlvInput {
            current_age: 0,
            retirement_age: MAX_YEARS + 1,
            ..HlvInput::default()
        };
        assert_eq!(input.project().unwrap(), HlvResult::default());
    }

    #[test]
    fn test_pv_growing_annuity_due() {
        // No growth: ordinary annuity-due, 100 for 3 years at 10%
        let pv = pv_growing_annuity_due(100.0, 0.0, 0.10, 3);
        assert_relative_eq!(pv, 100.0 + 100.0 / 1.1 + 100.0 / 1.21, max_relative = 1e-12);

        // Growth equal to discount: each payment is worth the first one
        let pv = pv_growing_annuity_due(100.0, 0.05, 0.05, 10);
        assert_relative_eq!(pv, 1000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_growth_equal_to_discount_cancels() {
        let input = HlvInput {
            growth_pct: 7.5,
            discount_pct: 7.5,
            ..HlvInput::default()
        };
        let result = input.project().unwrap();

        assert_eq!(result.projection.periods(), 30);
        for point in &result.projection.series {
            assert_relative_eq!(point.delta, 800_000.0, max_relative = 1e-12);
        }
        assert_relative_eq!(result.total_hlv, 800_000.0 * 30.0, max_relative = 1e-12);
    }

    #[test]
    fn test_defaults() {
        let result = HlvInput::default().project().unwrap();
        let series = &result.projection.series;

        assert_eq!(series.first().map(|p| p.period), Some(1));
        assert_relative_eq!(series[0].balance, 840_000.0, max_relative = 1e-12);
        assert_relative_eq!(series[0].delta, 840_000.0 / 1.06, max_relative = 1e-12);

        // Discount above growth shrinks each year's PV
        assert!(series.windows(2).all(|w| w[1].delta < w[0].delta));
        assert!(result.total_hlv < result.total_income);
        assert_eq!(result.projection.final_value, series[29].balance);
    }

    #[test]
    fn test_retired_is_empty() {
        let input = HlvInput {
            current_age: 60,
            retirement_age: 55,
            ..HlvInput::default()
        };
        let result = input.project().unwrap();
        assert_eq!(result, HlvResult::default());
    }

    #[test]
    fn test_non_finite_rejected() {
        let input = HlvInput {
            annual_income: f64::INFINITY,
            ..HlvInput::default()
        };
        assert!(input.project().is_err());
    }
}
