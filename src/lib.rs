//! Retirement Planner - calculators and access control for a financial-planning site
//!
//! This library provides:
//! - Year-by-year projections for EPF, PPF, SIP, SWP, HLV and retirement corpus planning
//! - Parallel batch and rate-sweep evaluation of calculator requests
//! - Role-based route gating with session-cookie identity resolution
//! - Article and affiliate-link records with document/blob store collaborators

pub mod error;
pub mod projection;
pub mod access;
pub mod content;
pub mod config;
pub mod scenario;

// Re-export commonly used types
pub use error::CalcError;
pub use projection::{Calculator, Projection, YearPoint};
pub use access::{AccessGate, AccessPolicy, Decision, Principal, Role};
pub use config::AppConfig;
pub use scenario::{CalculatorRequest, CalculatorResponse};
