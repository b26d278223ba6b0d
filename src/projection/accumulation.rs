//! Accumulating instruments: EPF, PPF (annual compounding) and SIP (monthly)

use log::debug;
use serde::{Deserialize, Serialize};

use super::series::Projection;
use super::validate::{check_finite, duration_in_range, in_range, pct};
use super::Calculator;
use crate::error::CalcError;

/// Employees' Provident Fund parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpfInput {
    /// Basic monthly salary
    pub basic_salary: f64,

    /// Employee contribution (% of basic salary)
    pub employee_pct: f64,

    /// Employer contribution (% of basic salary)
    pub employer_pct: f64,

    /// Annual interest rate (% p.a.)
    pub rate_pct: f64,

    /// Duration in years
    pub years: u32,
}

impl Default for EpfInput {
    fn default() -> Self {
        Self {
            basic_salary: 25_000.0,
            employee_pct: 12.0,
            employer_pct: 12.0,
            rate_pct: 8.15,
            years: 20,
        }
    }
}

impl EpfInput {
    /// Combined employee + employer contribution for one year
    pub fn annual_contribution(&self) -> f64 {
        let monthly_employee = (self.basic_salary * self.employee_pct) / 100.0;
        let monthly_employer = (self.basic_salary * self.employer_pct) / 100.0;
        (monthly_employee + monthly_employer) * 12.0
    }

    fn fields(&self) -> [(&'static str, f64); 4] {
        [
            ("basic_salary", self.basic_salary),
            ("employee_pct", self.employee_pct),
            ("employer_pct", self.employer_pct),
            ("rate_pct", self.rate_pct),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpfResult {
    pub projection: Projection,
    pub maturity_amount: f64,
    pub interest_earned: f64,
}

impl Calculator for EpfInput {
    type Output = EpfResult;
    const NAME: &'static str = "epf";

    fn project(&self) -> Result<EpfResult, CalcError> {
        check_finite(&self.fields())?;
        if !in_range(Self::NAME, &self.fields()) || !duration_in_range(Self::NAME, "years", self.years) {
            return Ok(EpfResult::default());
        }

        let projection = accumulate_annual(self.annual_contribution(), pct(self.rate_pct), self.years)?;
        debug!(
            "epf: {} years, contributed {:.2}, maturity {:.2}",
            projection.periods(),
            projection.total_contributed,
            projection.final_value
        );

        Ok(EpfResult {
            maturity_amount: projection.final_value,
            interest_earned: projection.total_return,
            projection,
        })
    }
}

/// Public Provident Fund parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PpfInput {
    /// Amount deposited at the start of each year
    pub annual_investment: f64,

    /// Annual interest rate (% p.a.)
    pub rate_pct: f64,

    /// Duration in years
    pub years: u32,
}

impl Default for PpfInput {
    fn default() -> Self {
        Self {
            annual_investment: 150_000.0,
            rate_pct: 7.1,
            years: 15,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PpfResult {
    pub projection: Projection,
    pub total_investment: f64,
    pub maturity_amount: f64,
}

impl Calculator for PpfInput {
    type Output = PpfResult;
    const NAME: &'static str = "ppf";

    fn project(&self) -> Result<PpfResult, CalcError> {
        let fields = [("annual_investment", self.annual_investment), ("rate_pct", self.rate_pct)];
        check_finite(&fields)?;
        if !in_range(Self::NAME, &fields) || !duration_in_range(Self::NAME, "years", self.years) {
            return Ok(PpfResult::default());
        }

        let projection = accumulate_annual(self.annual_investment, pct(self.rate_pct), self.years)?;
        debug!("ppf: {} years, maturity {:.2}", projection.periods(), projection.final_value);

        Ok(PpfResult {
            total_investment: self.annual_investment * self.years as f64,
            maturity_amount: projection.final_value,
            projection,
        })
    }
}

/// Systematic Investment Plan parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SipInput {
    /// Amount invested at the start of every month
    pub monthly_investment: f64,

    /// Expected annual return (% p.a.)
    pub rate_pct: f64,

    /// Duration in years
    pub years: u32,
}

impl Default for SipInput {
    fn default() -> Self {
        Self {
            monthly_investment: 5_000.0,
            rate_pct: 12.0,
            years: 10,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SipResult {
    pub projection: Projection,
    pub invested: f64,
    pub estimated_returns: f64,
    pub maturity_amount: f64,
}

impl Calculator for SipInput {
    type Output = SipResult;
    const NAME: &'static str = "sip";

    fn project(&self) -> Result<SipResult, CalcError> {
        let fields = [("monthly_investment", self.monthly_investment), ("rate_pct", self.rate_pct)];
        check_finite(&fields)?;
        if !in_range(Self::NAME, &fields) || !duration_in_range(Self::NAME, "years", self.years) {
            return Ok(SipResult::default());
        }

        let monthly_rate = self.rate_pct / 12.0 / 100.0;
        let projection = accumulate_monthly(self.monthly_investment, monthly_rate, self.years)?;
        debug!("sip: {} years, maturity {:.2}", projection.periods(), projection.final_value);

        Ok(SipResult {
            invested: projection.total_contributed,
            estimated_returns: projection.total_return,
            maturity_amount: projection.final_value,
            projection,
        })
    }
}

/// Deposit at the start of each year, then credit one year of interest on the
/// running balance.
pub(crate) fn accumulate_annual(contribution: f64, rate: f64, years: u32) -> Result<Projection, CalcError> {
    let mut projection = Projection::new();
    let mut balance = 0.0;
    let mut contributed = 0.0;

    for _year in 1..=years {
        balance += contribution;
        let interest = balance * rate;
        balance += interest;
        contributed += contribution;

        projection.add_point(balance, interest)?;
    }

    if !projection.is_empty() {
        projection.set_totals(contributed, balance - contributed)?;
    }
    Ok(projection)
}

/// Monthly deposits compounded monthly (annuity-due), one point per year
pub(crate) fn accumulate_monthly(contribution: f64, monthly_rate: f64, years: u32) -> Result<Projection, CalcError> {
    let mut projection = Projection::new();
    let mut balance = 0.0;
    let mut contributed = 0.0;

    for _year in 1..=years {
        let opening = balance;
        for _month in 1..=12 {
            balance = (balance + contribution) * (1.0 + monthly_rate);
        }
        contributed += contribution * 12.0;

        // Growth for the year, net of that year's deposits
        projection.add_point(balance, balance - opening - contribution * 12.0)?;
    }

    if !projection.is_empty() {
        projection.set_totals(contributed, balance - contributed)?;
    }
    Ok(projection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::MAX_YEARS;
    use approx::assert_relative_eq;

    #[test]
    fn test_epf_reference_scenario() {
        let input = EpfInput::default();
        let result = input.project().unwrap();

        assert_eq!(result.projection.total_contributed, 1_440_000.0);
        assert_eq!(result.projection.periods(), 20);

        // Independent rendition of the same loop, same order of operations
        let annual = (25_000.0 * 12.0 / 100.0 + 25_000.0 * 12.0 / 100.0) * 12.0;
        let mut balance = 0.0_f64;
        for _ in 0..20 {
            balance += annual;
            let interest = balance * (8.15 / 100.0);
            balance += interest;
        }
        assert_eq!(result.maturity_amount.to_bits(), balance.to_bits());
        assert_eq!(result.interest_earned, balance - 1_440_000.0);
    }

    #[test]
    fn test_final_equals_contributed_plus_interest() {
        for years in [1, 2, 7, 15, 35] {
            let input = EpfInput { years, ..EpfInput::default() };
            let p = input.project().unwrap().projection;
            assert_relative_eq!(p.final_value, p.total_contributed + p.total_return, max_relative = 1e-12);

            let input = PpfInput { years, ..PpfInput::default() };
            let p = input.project().unwrap().projection;
            assert_relative_eq!(p.final_value, p.total_contributed + p.total_return, max_relative = 1e-12);

            let input = SipInput { years, ..SipInput::default() };
            let p = input.project().unwrap().projection;
            assert_relative_eq!(p.final_value, p.total_contributed + p.total_return, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_ppf_defaults() {
        let result = PpfInput::default().project().unwrap();

        assert_eq!(result.total_investment, 2_250_000.0);
        assert!((result.maturity_amount - 4_068_209.22).abs() < 0.01);

        let first = result.projection.series[0];
        assert_eq!(first.period, 1);
        assert_relative_eq!(first.delta, 150_000.0 * 0.071, max_relative = 1e-12);
    }

    #[test]
    fn test_sip_defaults() {
        let result = SipInput::default().project().unwrap();

        assert_eq!(result.invested, 600_000.0);
        assert!((result.maturity_amount - 1_161_695.38).abs() < 0.01);
        assert_eq!(result.projection.periods(), 10);
    }

    #[test]
    fn test_zero_rate_is_flat() {
        let input = PpfInput { rate_pct: 0.0, years: 5, ..PpfInput::default() };
        let result = input.project().unwrap();

        assert_eq!(result.maturity_amount, 750_000.0);
        assert_eq!(result.projection.total_return, 0.0);
        assert!(result.projection.series.iter().all(|p| p.delta == 0.0));
    }

    #[test]
    fn test_zero_duration_is_empty() {
        let result = EpfInput { years: 0, ..EpfInput::default() }.project().unwrap();
        assert!(result.projection.is_empty());
        assert_eq!(result.maturity_amount, 0.0);
        assert_eq!(result.projection.total_contributed, 0.0);

        let result = SipInput { years: 0, ..SipInput::default() }.project().unwrap();
        assert_eq!(result, SipResult::default());
    }

    #[test]
    fn test_negative_input_is_empty() {
        let result = PpfInput { annual_investment: -1.0, ..PpfInput::default() }.project().unwrap();
        assert_eq!(result, PpfResult::default());
    }

    #[test]
    fn test_duration_limit() {
        let at_limit = EpfInput { years: MAX_YEARS, ..EpfInput::default() }.project().unwrap();
        assert_eq!(at_limit.projection.periods(), MAX_YEARS);

        let over = EpfInput { years: MAX_YEARS + 1, ..EpfInput::default() }.project().unwrap();
        assert_eq!(over, EpfResult::default());

        let at_limit = PpfInput { years: MAX_YEARS, ..PpfInput::default() }.project().unwrap();
        assert_eq!(at_limit.projection.periods(), MAX_YEARS);
        assert_eq!(at_limit.total_investment, 150_000.0 * MAX_YEARS as f64);

        // Zero rate never overflows, so only the limit stops a huge series
        let over = PpfInput { annual_investment: 0.0, rate_pct: 0.0, years: u32::MAX }.project().unwrap();
        assert_eq!(over, PpfResult::default());

        let at_limit = SipInput { years: MAX_YEARS, ..SipInput::default() }.project().unwrap();
        assert_eq!(at_limit.projection.periods(), MAX_YEARS);

        let over = SipInput { years: MAX_YEARS + 1, ..SipInput::default() }.project().unwrap();
        assert_eq!(over, SipResult::default());
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let err = EpfInput { rate_pct: f64::NAN, ..EpfInput::default() }.project().unwrap_err();
        assert!(matches!(err, CalcError::NonFiniteInput { field: "rate_pct", .. }));
    }

    #[test]
    fn test_overflow_rejected() {
        let input = PpfInput { annual_investment: 1e300, rate_pct: 1e6, years: 40 };
        assert!(matches!(input.project(), Err(CalcError::NonFiniteResult { .. })));
    }
}
