//! Dispatch and batch evaluation of calculator requests
//!
//! Requests arrive as JSON tagged by `"instrument"`; missing fields fall back
//! to the calculator defaults.
//!
//! # Example
//! ```ignore
//! let requests: Vec<CalculatorRequest> = serde_json::from_str(r#"[
//!     {"instrument": "ppf", "years": 15},
//!     {"instrument": "swp", "monthly_withdrawal": 25000}
//! ]"#)?;
//! let results = run_batch(&requests);
//! ```

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::CalcError;
use crate::projection::{
    Calculator, EpfInput, EpfResult, HlvInput, HlvResult, PpfInput, PpfResult, Projection,
    RetirementInput, RetirementPlan, SipInput, SipResult, SwpInput, SwpResult,
};

/// One calculator invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "instrument", rename_all = "snake_case")]
pub enum CalculatorRequest {
    Epf(EpfInput),
    Ppf(PpfInput),
    Sip(SipInput),
    Swp(SwpInput),
    Hlv(HlvInput),
    Retirement(RetirementInput),
}

/// Output matching a [`CalculatorRequest`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "instrument", rename_all = "snake_case")]
pub enum CalculatorResponse {
    Epf(EpfResult),
    Ppf(PpfResult),
    Sip(SipResult),
    Swp(SwpResult),
    Hlv(HlvResult),
    Retirement(RetirementPlan),
}

impl CalculatorRequest {
    pub fn instrument(&self) -> &'static str {
        match self {
            CalculatorRequest::Epf(_) => EpfInput::NAME,
            CalculatorRequest::Ppf(_) => PpfInput::NAME,
            CalculatorRequest::Sip(_) => SipInput::NAME,
            CalculatorRequest::Swp(_) => SwpInput::NAME,
            CalculatorRequest::Hlv(_) => HlvInput::NAME,
            CalculatorRequest::Retirement(_) => RetirementInput::NAME,
        }
    }

    pub fn run(&self) -> Result<CalculatorResponse, CalcError> {
        Ok(match self {
            CalculatorRequest::Epf(input) => CalculatorResponse::Epf(input.project()?),
            CalculatorRequest::Ppf(input) => CalculatorResponse::Ppf(input.project()?),
            CalculatorRequest::Sip(input) => CalculatorResponse::Sip(input.project()?),
            CalculatorRequest::Swp(input) => CalculatorResponse::Swp(input.project()?),
            CalculatorRequest::Hlv(input) => CalculatorResponse::Hlv(input.project()?),
            CalculatorRequest::Retirement(input) => CalculatorResponse::Retirement(input.project()?),
        })
    }

    /// Copy of this request with its headline rate replaced.
    ///
    /// The headline rate is the return/interest rate, except for HLV where it
    /// is the discount rate.
    pub fn with_rate_pct(&self, rate_pct: f64) -> Self {
        let mut request = self.clone();
        match &mut request {
            CalculatorRequest::Epf(input) => input.rate_pct = rate_pct,
            CalculatorRequest::Ppf(input) => input.rate_pct = rate_pct,
            CalculatorRequest::Sip(input) => input.rate_pct = rate_pct,
            CalculatorRequest::Swp(input) => input.rate_pct = rate_pct,
            CalculatorRequest::Hlv(input) => input.discount_pct = rate_pct,
            CalculatorRequest::Retirement(input) => input.pre_retirement_return_pct = rate_pct,
        }
        request
    }
}

impl CalculatorResponse {
    /// The shared year-by-year projection
    pub fn projection(&self) -> &Projection {
        match self {
            CalculatorResponse::Epf(r) => &r.projection,
            CalculatorResponse::Ppf(r) => &r.projection,
            CalculatorResponse::Sip(r) => &r.projection,
            CalculatorResponse::Swp(r) => &r.projection,
            CalculatorResponse::Hlv(r) => &r.projection,
            CalculatorResponse::Retirement(r) => &r.projection,
        }
    }
}

/// Per-request outcome of a batch, serialized as the response or `{"error": ...}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BatchOutcome {
    Ok(CalculatorResponse),
    Err { error: String },
}

impl From<Result<CalculatorResponse, CalcError>> for BatchOutcome {
    fn from(result: Result<CalculatorResponse, CalcError>) -> Self {
        match result {
            Ok(response) => BatchOutcome::Ok(response),
            Err(e) => BatchOutcome::Err { error: e.to_string() },
        }
    }
}

/// Run many requests in parallel; results keep the input order
pub fn run_batch(requests: &[CalculatorRequest]) -> Vec<Result<CalculatorResponse, CalcError>> {
    requests.par_iter().map(CalculatorRequest::run).collect()
}

/// Run one request at each of `rates_pct`
pub fn rate_sweep(request: &CalculatorRequest, rates_pct: &[f64]) -> Vec<(f64, Result<CalculatorResponse, CalcError>)> {
    rates_pct
        .par_iter()
        .map(|&rate| (rate, request.with_rate_pct(rate).run()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults_from_json() {
        let request: CalculatorRequest = serde_json::from_str(r#"{"instrument": "epf"}"#).unwrap();
        assert_eq!(request, CalculatorRequest::Epf(EpfInput::default()));

        let request: CalculatorRequest =
            serde_json::from_str(r#"{"instrument": "swp", "monthly_withdrawal": 25000}"#).unwrap();
        match request {
            CalculatorRequest::Swp(input) => {
                assert_eq!(input.monthly_withdrawal, 25_000.0);
                assert_eq!(input.initial_investment, 2_000_000.0);
            }
            other => panic!("unexpected request {:?}", other),
        }
    }

    #[test]
    fn test_unknown_instrument_rejected() {
        assert!(serde_json::from_str::<CalculatorRequest>(r#"{"instrument": "nps"}"#).is_err());
    }

    #[test]
    fn test_batch_preserves_order() {
        let requests = vec![
            CalculatorRequest::Ppf(PpfInput::default()),
            CalculatorRequest::Epf(EpfInput { rate_pct: f64::NAN, ..EpfInput::default() }),
            CalculatorRequest::Hlv(HlvInput::default()),
            CalculatorRequest::Retirement(RetirementInput::default()),
        ];

        let results = run_batch(&requests);
        assert_eq!(results.len(), 4);
        assert!(matches!(results[0], Ok(CalculatorResponse::Ppf(_))));
        assert!(results[1].is_err());
        assert!(matches!(results[2], Ok(CalculatorResponse::Hlv(_))));
        assert!(matches!(results[3], Ok(CalculatorResponse::Retirement(_))));
    }

    #[test]
    fn test_rate_sweep() {
        let request = CalculatorRequest::Ppf(PpfInput::default());
        let results = rate_sweep(&request, &[6.0, 7.0, 8.0]);

        let finals: Vec<f64> = results
            .iter()
            .map(|(_, r)| r.as_ref().unwrap().projection().final_value)
            .collect();
        assert_eq!(results[1].0, 7.0);
        // Higher rate, higher maturity
        assert!(finals.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_batch_outcome_serialization() {
        let ok: BatchOutcome = CalculatorRequest::Sip(SipInput { years: 1, ..SipInput::default() }).run().into();
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["instrument"], "sip");
        assert_eq!(json["projection"]["series"][0]["period"], 1);

        let err: BatchOutcome = CalculatorRequest::Sip(SipInput { rate_pct: f64::INFINITY, ..SipInput::default() })
            .run()
            .into();
        let json = serde_json::to_value(&err).unwrap();
        assert!(json["error"].as_str().unwrap().contains("rate_pct"));
    }
}
