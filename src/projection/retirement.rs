//! Retirement corpus planning
//!
//! Works out how large a corpus is needed to fund inflation-adjusted expenses
//! from retirement to life expectancy, how much of it existing savings cover,
//! and the monthly SIP that closes the gap.

use log::debug;
use serde::{Deserialize, Serialize};

use super::present_value::{growth_factor, pv_growing_annuity_due};
use super::series::Projection;
use super::validate::{check_finite, duration_in_range, in_range, pct};
use super::Calculator;
use crate::error::CalcError;

/// Retirement planning parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetirementInput {
    pub current_age: u32,
    pub retirement_age: u32,
    pub life_expectancy: u32,

    /// Monthly expenses in today's money
    pub monthly_expenses: f64,

    /// Expected inflation (% p.a.)
    pub inflation_pct: f64,

    /// Return on savings until retirement (% p.a.)
    pub pre_retirement_return_pct: f64,

    /// Return on the corpus during retirement (% p.a.)
    pub post_retirement_return_pct: f64,

    /// Savings already set aside for retirement
    pub current_savings: f64,
}

impl Default for RetirementInput {
    fn default() -> Self {
        Self {
            current_age: 30,
            retirement_age: 60,
            life_expectancy: 85,
            monthly_expenses: 50_000.0,
            inflation_pct: 6.0,
            pre_retirement_return_pct: 12.0,
            post_retirement_return_pct: 8.0,
            current_savings: 0.0,
        }
    }
}

impl RetirementInput {
    pub fn years_to_retirement(&self) -> u32 {
        self.retirement_age.saturating_sub(self.current_age)
    }

    pub fn years_in_retirement(&self) -> u32 {
        self.life_expectancy.saturating_sub(self.retirement_age)
    }

    fn fields(&self) -> [(&'static str, f64); 5] {
        [
            ("monthly_expenses", self.monthly_expenses),
            ("inflation_pct", self.inflation_pct),
            ("pre_retirement_return_pct", self.pre_retirement_return_pct),
            ("post_retirement_return_pct", self.post_retirement_return_pct),
            ("current_savings", self.current_savings),
        ]
    }
}

/// Retirement plan: savings trajectory plus the corpus arithmetic behind it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetirementPlan {
    /// Year-by-year savings (existing savings plus the required SIP);
    /// delta is the growth earned in the year
    pub projection: Projection,
    pub years_to_retirement: u32,
    pub years_in_retirement: u32,
    pub monthly_expense_at_retirement: f64,
    pub corpus_required: f64,
    pub savings_at_retirement: f64,
    pub shortfall: f64,
    pub monthly_sip_required: f64,
}

impl Calculator for RetirementInput {
    type Output = RetirementPlan;
    const NAME: &'static str = "retirement";

    fn project(&self) -> Result<RetirementPlan, CalcError> {
        check_finite(&self.fields())?;
        let n = self.years_to_retirement();
        let retirement_years = self.years_in_retirement();
        if !in_range(Self::NAME, &self.fields())
            || !duration_in_range(Self::NAME, "years to retirement", n)
            || !duration_in_range(Self::NAME, "years in retirement", retirement_years)
            || n == 0
        {
            return Ok(RetirementPlan::default());
        }

        let inflation = pct(self.inflation_pct);
        let pre = pct(self.pre_retirement_return_pct);
        let post = pct(self.post_retirement_return_pct);

        let monthly_expense_at_retirement = self.monthly_expenses * growth_factor(inflation, n);
        let corpus_required = pv_growing_annuity_due(
            monthly_expense_at_retirement * 12.0,
            inflation,
            post,
            retirement_years,
        );
        let savings_at_retirement = self.current_savings * growth_factor(pre, n);
        let shortfall = (corpus_required - savings_at_retirement).max(0.0);

        let monthly_rate = pre / 12.0;
        // n is at most MAX_YEARS here
        let months = n * 12;
        let monthly_sip_required = shortfall / sip_future_value_factor(monthly_rate, months);

        let projection = self.savings_trajectory(pre, monthly_sip_required)?;
        debug!(
            "retirement: corpus {:.2} needed in {} years, SIP {:.2}/month",
            corpus_required, n, monthly_sip_required
        );

        let plan = RetirementPlan {
            projection,
            years_to_retirement: n,
            years_in_retirement: retirement_years,
            monthly_expense_at_retirement,
            corpus_required,
            savings_at_retirement,
            shortfall,
            monthly_sip_required,
        };

        let figures = [
            plan.monthly_expense_at_retirement,
            plan.corpus_required,
            plan.savings_at_retirement,
            plan.monthly_sip_required,
        ];
        if figures.iter().any(|v| !v.is_finite()) {
            return Err(CalcError::NonFiniteResult { period: n });
        }
        Ok(plan)
    }
}

impl RetirementInput {
    /// Existing savings compound annually while the SIP compounds monthly
    fn savings_trajectory(&self, pre: f64, monthly_sip: f64) -> Result<Projection, CalcError> {
        let monthly_rate = pre / 12.0;
        let mut projection = Projection::new();
        let mut savings = self.current_savings;
        let mut sip_value = 0.0;
        let mut opening = savings;

        for _year in 1..=self.years_to_retirement() {
            savings *= 1.0 + pre;
            for _month in 1..=12 {
                sip_value = (sip_value + monthly_sip) * (1.0 + monthly_rate);
            }

            let balance = savings + sip_value;
            projection.add_point(balance, balance - opening - monthly_sip * 12.0)?;
            opening = balance;
        }

        let contributed = self.current_savings + monthly_sip * 12.0 * projection.periods() as f64;
        projection.set_totals(contributed, projection.final_value - contributed)?;
        Ok(projection)
    }
}

/// Future value of 1 invested at the start of each month for `months` months
fn sip_future_value_factor(monthly_rate: f64, months: u32) -> f64 {
    if monthly_rate.abs() < 1e-12 {
        return months as f64;
    }
    (growth_factor(monthly_rate, months) - 1.0) / monthly_rate * (1.0 + monthly_rate)
}
